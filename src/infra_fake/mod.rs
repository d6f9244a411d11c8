//! In-memory stand-in for the MySQL adapters, for exercising the harness
//! without a database.

mod test_data_fake;

pub use test_data_fake::*;
