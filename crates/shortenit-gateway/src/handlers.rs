mod health;
mod root;
mod url;

pub use health::health_handler;
pub use root::root_handler;
pub use url::{backward_handler, forward_handler};
