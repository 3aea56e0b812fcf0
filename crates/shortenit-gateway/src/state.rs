use std::sync::Arc;
use std::time::Duration;

use shortenit_core::{Deadline, Resolver};

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn Resolver>,
    request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            request_timeout: None,
        }
    }

    /// Bounds every resolution by `timeout`. `None` or zero disables the bound.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    /// A fresh deadline for one request.
    pub fn deadline(&self) -> Deadline {
        self.request_timeout
            .map_or_else(Deadline::none, Deadline::after)
    }
}
