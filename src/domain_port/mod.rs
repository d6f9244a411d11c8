// database

mod auth_code_repo;
mod card_repo;
mod data_access;
mod test_data_cleaner;
mod user_repo;

pub use auth_code_repo::*;
pub use card_repo::*;
pub use data_access::*;
pub use test_data_cleaner::*;
pub use user_repo::*;

// service under test

mod bank_api;

pub use bank_api::*;
