mod auth_code_repo_mysql;
mod card_repo_mysql;
mod test_data_cleaner_mysql;
mod user_repo_mysql;

pub use auth_code_repo_mysql::*;
pub use card_repo_mysql::*;
pub use test_data_cleaner_mysql::*;
pub use user_repo_mysql::*;

mod util;

pub use util::connect_pool;
