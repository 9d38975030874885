pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::{HookBinding, Module};
pub use types::{new_id, now_rfc3339, today};
