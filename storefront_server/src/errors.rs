use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use storefront_engine::{CartApiError, CheckoutApiError, OrderQueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Visitor cookie not found")]
    MissingVisitorId,
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("The payment gateway could not process the request. {0}")]
    GatewayError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::MissingVisitorId => StatusCode::BAD_REQUEST,
            Self::PaymentVerificationFailed => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::ValidationError(s) => Self::ValidationError(s),
            CartApiError::CartNotFound | CartApiError::ItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartApiError::StorageError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CheckoutApiError> for ServerError {
    fn from(e: CheckoutApiError) -> Self {
        match e {
            CheckoutApiError::ValidationError(s) => Self::ValidationError(s),
            CheckoutApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            CheckoutApiError::PaymentVerificationFailed => Self::PaymentVerificationFailed,
            CheckoutApiError::OrderNotPending { .. } => Self::ValidationError(e.to_string()),
            CheckoutApiError::GatewayError(e) => Self::GatewayError(e.to_string()),
            CheckoutApiError::StorageError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderQueryError> for ServerError {
    fn from(e: OrderQueryError) -> Self {
        match e {
            OrderQueryError::ValidationError(s) => Self::ValidationError(s),
            OrderQueryError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderQueryError::StorageError(e) => Self::BackendError(e.to_string()),
        }
    }
}
