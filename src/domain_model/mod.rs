mod auth_code;
mod card;
mod session;
mod user;

pub use auth_code::*;
pub use card::*;
pub use session::*;
pub use user::*;
