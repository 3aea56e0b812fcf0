use crate::error::DependencyError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A caller-supplied bound on how long a resolution may wait on its
/// dependencies.
///
/// Every cache, counter and store call the resolver makes is run through
/// [`Deadline::bound`]. A future that does not finish in time is dropped,
/// which cancels the in-flight call from this process's point of view; a
/// remote side effect that already happened (a counter increment) stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No bound: calls may take as long as the backend does.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// A tighter deadline for a best-effort call made on the way to a
    /// required one.
    ///
    /// The result is at most `budget` from now and at most half of the time
    /// left before `self`, so a stalled best-effort call leaves the rest of
    /// the budget to the calls after it.
    pub fn slice(&self, budget: Duration) -> Self {
        let now = Instant::now();
        let capped = now + budget;
        match self.0 {
            None => Self::at(capped),
            Some(at) => Self::at(capped.min(now + at.saturating_duration_since(now) / 2)),
        }
    }

    /// Runs `fut` to completion or until the deadline passes.
    ///
    /// `operation` names the call in the resulting
    /// [`DependencyError::DeadlineExceeded`].
    pub async fn bound<F>(
        &self,
        operation: &'static str,
        fut: F,
    ) -> Result<F::Output, DependencyError>
    where
        F: Future,
    {
        match self.0 {
            None => Ok(fut.await),
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| DependencyError::DeadlineExceeded { operation }),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_runs_to_completion() {
        let deadline = Deadline::none();
        assert!(!deadline.is_expired());

        let value = deadline.bound("noop", async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn slice_keeps_half_of_the_remaining_time() {
        let now = Instant::now();

        let unbounded = Deadline::none().slice(Duration::from_millis(250));
        assert_eq!(unbounded.instant(), Some(now + Duration::from_millis(250)));

        let roomy = Deadline::after(Duration::from_secs(3)).slice(Duration::from_millis(250));
        assert_eq!(roomy.instant(), Some(now + Duration::from_millis(250)));

        let tight = Deadline::after(Duration::from_millis(100)).slice(Duration::from_millis(250));
        assert_eq!(tight.instant(), Some(now + Duration::from_millis(50)));

        let expired = Deadline::at(now).slice(Duration::from_millis(250));
        assert_eq!(expired.instant(), Some(now));
    }

    #[tokio::test]
    async fn slow_future_exceeds_deadline() {
        let deadline = Deadline::after(Duration::from_millis(10));

        let err = deadline
            .bound("sleep", tokio::time::sleep(Duration::from_secs(5)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DependencyError::DeadlineExceeded { operation: "sleep" }
        ));
        assert!(deadline.is_expired());
    }
}
