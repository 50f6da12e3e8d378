use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway rejected the request. {0}")]
    Rejected(String),
    #[error("The gateway response is missing the '{0}' field")]
    MissingField(&'static str),
}

impl GatewayApiError {
    /// True if the error happened before we got a meaningful answer from the gateway (connection failures, timeouts,
    /// 5xx responses). These are worth retrying; a 4xx or a malformed body generally is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RestResponseError(_) => true,
            Self::QueryError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
