use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use fair_payment_engine::{
    traits::{GatewayError, PaymentGatewayError},
    PaymentFlowError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request query: {0}")]
    InvalidRequestQuery(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with existing data. {0}")]
    Conflict(String),
    #[error("The payment gateway could not complete the request. {0}")]
    GatewayUnavailable(String),
    #[error("The webhook signature is missing or invalid.")]
    InvalidSignature,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestQuery(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentFlowError> for ServerError {
    fn from(e: PaymentFlowError) -> Self {
        match e {
            PaymentFlowError::MetadataIncomplete |
            PaymentFlowError::InvalidAmount(_) |
            PaymentFlowError::OwnerMismatch { .. } => Self::InvalidRequestBody(e.to_string()),
            PaymentFlowError::Gateway(GatewayError::InvalidAmount(_)) => Self::InvalidRequestBody(e.to_string()),
            PaymentFlowError::OwnerNotFound(_) | PaymentFlowError::ReferenceNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            PaymentFlowError::DuplicateReference(_) => Self::Conflict(e.to_string()),
            PaymentFlowError::VerificationFailed { .. } | PaymentFlowError::Gateway(_) => {
                Self::GatewayUnavailable(e.to_string())
            },
            PaymentFlowError::Database(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        Self::from(PaymentFlowError::from(e))
    }
}
