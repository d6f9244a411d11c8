//! Named SQL statements loaded once from a comment-delimited text file.

mod catalog;
mod query_name;

pub use catalog::*;
pub use query_name::*;
