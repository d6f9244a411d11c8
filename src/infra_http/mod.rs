mod bank_api_http;
mod http_client;

pub use bank_api_http::*;
pub use http_client::*;
