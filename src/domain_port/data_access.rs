#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("database connection failed: {0}")]
    Connect(String),
    #[error("query {query:?} failed: {message}")]
    Query { query: String, message: String },
    #[error("cannot map row of {query:?}: {message}")]
    Decode { query: String, message: String },
}
