mod auth_service_impl;
mod bank_scenarios;
mod suite_runner;

pub use auth_service_impl::*;
pub use bank_scenarios::*;
pub use suite_runner::*;
