use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach Razorpay: {0}")]
    RestRequestError(String),
    #[error("Razorpay did not respond in time")]
    Timeout,
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Invalid order amount: {0}")]
    InvalidAmount(String),
}

impl From<reqwest::Error> for RazorpayApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RazorpayApiError::Timeout
        } else {
            RazorpayApiError::RestRequestError(e.to_string())
        }
    }
}
