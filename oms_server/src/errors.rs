use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use oms_engine::{
    intake::{IntakeError, ObjectStoreError},
    OrderFlowError,
    StoreError,
    WebhookApiError,
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
    #[error("Could not read request header: {0}")]
    InvalidRequestHeader(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("The order is invalid. {0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestHeader(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
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

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateOrder(_) => Self::Conflict(e.to_string()),
            StoreError::QueryError(_) => Self::InvalidRequestBody(e.to_string()),
            StoreError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::Validation(e) => Self::ValidationError(e.to_string()),
            OrderFlowError::Store(e) => e.into(),
            OrderFlowError::Publish { .. } => Self::BackendError(e.to_string()),
        }
    }
}

impl From<IntakeError> for ServerError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::MalformedPath(_) |
            IntakeError::ObjectNotFound(_) |
            IntakeError::LocalFileError { .. } |
            IntakeError::ObjectStoreError(ObjectStoreError::InvalidKey(_)) => Self::InvalidRequestBody(e.to_string()),
            IntakeError::ObjectStoreError(_) | IntakeError::EnqueueFailed(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<WebhookApiError> for ServerError {
    fn from(e: WebhookApiError) -> Self {
        match e {
            WebhookApiError::InvalidUrl(_) => Self::InvalidRequestBody(e.to_string()),
            WebhookApiError::MissingTenantId => Self::InvalidRequestHeader(e.to_string()),
            WebhookApiError::Store(e) => e.into(),
        }
    }
}
