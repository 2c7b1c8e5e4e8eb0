use crate::auth::header::AuthenticationError;
use crate::config::RegexType;
use crate::error::ErrorKind;
use crate::model::enums::{MimeType, Region, ResourceProperty, ResourceType};
use crate::string::SmallString;
use crate::vote::VoteError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::QueryResult;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub enum ApiError {
    #[error("{0} already exists")]
    AlreadyExists(ResourceProperty),
    #[error("File of type {0} did not match request with content-type '{1}'")]
    ContentTypeMismatch(MimeType, SmallString),
    #[error("This action requires an X-Device-Id header")]
    DeviceRequired,
    #[error("A review with this title and detail already exists")]
    DuplicateContent,
    #[error("'{0}' does not match on {1} regex")]
    ExpressionFailsRegex(SmallString, RegexType),
    FailedAuthentication(#[from] AuthenticationError),
    FailedConnection(#[from] diesel::r2d2::PoolError),
    FailedQuery(#[from] diesel::result::Error),
    FromStr(#[from] Box<dyn std::error::Error + Send + Sync>),
    HeaderDeserialization(#[from] axum::http::header::ToStrError),
    #[error("File exceeds the size limit of {limit} bytes")]
    FileTooLarge { limit: usize },
    #[error("Insufficient privileges")]
    InsufficientPrivileges,
    Image(#[from] image::ImageError),
    JsonRejection(#[from] axum::extract::rejection::JsonRejection),
    JsonSerialization(#[from] serde_json::Error),
    MalformedDeviceId(#[from] uuid::Error),
    #[error("Form is missing content-type")]
    MissingContentType,
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Missing metadata form")]
    MissingMetadata,
    Multipart(#[from] axum::extract::multipart::MultipartError),
    MultipartRejection(#[from] axum::extract::multipart::MultipartRejection),
    #[error("{0} not found")]
    NotFound(ResourceType),
    #[error("This action requires you to be logged in")]
    NotLoggedIn,
    Password(#[from] argon2::password_hash::Error),
    #[error("Passwords do not match")]
    PasswordsDoNotMatch,
    PathRejection(#[from] axum::extract::rejection::PathRejection),
    QueryRejection(#[from] axum::extract::rejection::QueryRejection),
    #[error("New reviews cannot be tagged with the {} region", .0.label())]
    RegionNotCreatable(Region),
    StdIo(#[from] std::io::Error),
    #[error("A review can have at most {limit} images")]
    TooManyImages { limit: usize },
    UnsupportedExtension(#[from] crate::model::enums::ParseExtensionError),
    UrlParse(#[from] url::ParseError),
    Vote(#[from] VoteError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        use serde_json::error::Category;
        type QueryError = diesel::result::Error;

        let query_error_status_code = |err: &QueryError| match err {
            QueryError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            Self::JsonRejection(err) => err.status(),
            Self::Multipart(err) => err.status(),
            Self::MultipartRejection(err) => err.status(),
            Self::PathRejection(err) => err.status(),
            Self::QueryRejection(err) => err.status(),
            Self::ContentTypeMismatch(..)
            | Self::DeviceRequired
            | Self::ExpressionFailsRegex(..)
            | Self::FileTooLarge { .. }
            | Self::FromStr(_)
            | Self::HeaderDeserialization(_)
            | Self::Image(_)
            | Self::MalformedDeviceId(_)
            | Self::MissingContentType
            | Self::MissingField(_)
            | Self::MissingMetadata
            | Self::PasswordsDoNotMatch
            | Self::RegionNotCreatable(_)
            | Self::TooManyImages { .. } => StatusCode::BAD_REQUEST,
            Self::NotLoggedIn | Self::Password(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPrivileges => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) | Self::DuplicateContent => StatusCode::CONFLICT,
            Self::UnsupportedExtension(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::StdIo(_) | Self::UrlParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FailedConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::FailedAuthentication(err) => match err {
                AuthenticationError::FailedConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
                AuthenticationError::FailedQuery(err) => query_error_status_code(err),
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::JsonSerialization(err) => match err.classify() {
                Category::Io | Category::Eof => StatusCode::INTERNAL_SERVER_ERROR,
                Category::Syntax | Category::Data => StatusCode::BAD_REQUEST,
            },
            Self::FailedQuery(err) => query_error_status_code(err),
            Self::Vote(err) => match err {
                VoteError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
                VoteError::Persist(err) => query_error_status_code(err),
            },
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "Already Exists",
            Self::ContentTypeMismatch(..) => "Content Type Mismatch",
            Self::DeviceRequired => "Device Required",
            Self::DuplicateContent => "Duplicate Content",
            Self::ExpressionFailsRegex(..) => "Expression Fails Regex",
            Self::FailedAuthentication(_) => "Failed Authentication",
            Self::FailedConnection(_) => "Failed Connection",
            Self::FailedQuery(_) => "Failed Query",
            Self::FileTooLarge { .. } => "File Too Large",
            Self::FromStr(_) => "FromStr Error",
            Self::HeaderDeserialization(_) => "Header Deserialization",
            Self::InsufficientPrivileges => "Insufficient Privileges",
            Self::Image(_) => "Image Error",
            Self::JsonRejection(_) => "JSON Rejection",
            Self::JsonSerialization(_) => "JSON Serialization Error",
            Self::MalformedDeviceId(_) => "Malformed Device Id",
            Self::MissingContentType => "Missing Content Type",
            Self::MissingField(_) => "Missing Field",
            Self::MissingMetadata => "Missing Metadata",
            Self::Multipart(_) => "Multipart/Form-Data Error",
            Self::MultipartRejection(_) => "Multipart Rejection",
            Self::NotFound(_) => "Resource Not Found",
            Self::NotLoggedIn => "Not Logged In",
            Self::Password(_) => "Password Error",
            Self::PasswordsDoNotMatch => "Passwords Do Not Match",
            Self::PathRejection(_) => "Path Rejection",
            Self::QueryRejection(_) => "Query Rejection",
            Self::RegionNotCreatable(_) => "Region Not Creatable",
            Self::StdIo(_) => "IO Error",
            Self::TooManyImages { .. } => "Too Many Images",
            Self::UnsupportedExtension(_) => "Unsupported Extension",
            Self::UrlParse(_) => "URL Parse Error",
            Self::Vote(_) => "Vote Error",
        }
    }

    fn response(&self) -> ErrorResponse {
        ErrorResponse {
            name: self.kind(),
            title: self.category(),
            description: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.response())).into_response()
    }
}

/// Translates a unique-constraint violation into a friendlier error than
/// "Failed Query".
pub fn map_unique_violation<T>(result: QueryResult<T>, error: ApiError) -> ApiResult<T> {
    use diesel::result::DatabaseErrorKind;
    use diesel::result::Error as DieselError;

    match result {
        Ok(value) => Ok(value),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(error),
        Err(err) => Err(err.into()),
    }
}

pub fn map_foreign_key_violation<T>(result: QueryResult<T>, resource: ResourceType) -> ApiResult<T> {
    use diesel::result::DatabaseErrorKind;
    use diesel::result::Error as DieselError;

    match result {
        Ok(value) => Ok(value),
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Err(ApiError::NotFound(resource)),
        Err(err) => Err(err.into()),
    }
}

/// Represents a response if an error occured.
#[derive(Serialize)]
struct ErrorResponse {
    title: &'static str,
    name: &'static str,
    description: String,
}
