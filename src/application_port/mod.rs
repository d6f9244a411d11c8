mod auth_service;
mod scenario;

pub use auth_service::*;
pub use scenario::*;
