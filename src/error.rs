/// Gives every error a stable machine-readable name for API responses.
pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

impl ErrorKind for argon2::password_hash::errors::B64Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEncoding => "InvalidEncoding",
            Self::InvalidLength => "InvalidLength",
        }
    }
}

impl ErrorKind for argon2::password_hash::errors::InvalidValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::InvalidChar(_) => "InvalidChar",
            Self::InvalidFormat => "InvalidFormat",
            Self::Malformed => "MalformedValue",
            Self::TooLong => "ValueTooLong",
            Self::TooShort => "ValueTooShort",
            _ => "UnknownArgonInvalidValue",
        }
    }
}

impl ErrorKind for argon2::password_hash::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::Algorithm => "UnsupportedAlgorithm",
            Self::B64Encoding(err) => err.kind(),
            Self::Crypto => "CryptoError",
            Self::OutputSize { .. } => "UnexpectedOutputSize",
            Self::ParamNameDuplicated => "ParamNameDuplicated",
            Self::ParamNameInvalid => "ParamNameInvalid",
            Self::ParamValueInvalid(err) => err.kind(),
            Self::ParamsMaxExceeded => "ParamsMaxExceeded",
            Self::Password => "InvalidPassword",
            Self::PhcStringField => "InvalidPhcStringField",
            Self::PhcStringTrailingData => "PhcStringTrailingData",
            Self::SaltInvalid(err) => err.kind(),
            Self::Version => "InvalidVersion",
            _ => "UnknownArgonError",
        }
    }
}

impl ErrorKind for diesel::result::DatabaseErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::CheckViolation => "CheckViolation",
            Self::ClosedConnection => "ClosedConnection",
            Self::ForeignKeyViolation => "ForeignKeyViolation",
            Self::NotNullViolation => "NotNullViolation",
            Self::ReadOnlyTransaction => "ReadOnlyTransaction",
            Self::SerializationFailure => "SerializationFailure",
            Self::UnableToSendCommand => "UnableToSendCommand",
            Self::UniqueViolation => "UniqueViolation",
            _ => "UnknownDatabaseError",
        }
    }
}

impl ErrorKind for diesel::result::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyInTransaction => "AlreadyInTransaction",
            Self::BrokenTransactionManager => "BrokenTransactionManager",
            Self::DatabaseError(err, _) => err.kind(),
            Self::DeserializationError(_) => "DeserializationError",
            Self::InvalidCString(_) => "InvalidCString",
            Self::NotFound => "NotFound",
            Self::NotInTransaction => "NotInTransaction",
            Self::QueryBuilderError(_) => "QueryBuilderError",
            Self::RollbackErrorOnCommit { rollback_error, .. } => rollback_error.kind(),
            Self::RollbackTransaction => "RollbackTransaction",
            Self::SerializationError(_) => "SerializationError",
            _ => "UnknownQueryError",
        }
    }
}

impl ErrorKind for diesel::r2d2::PoolError {
    fn kind(&self) -> &'static str {
        "FailedConnection"
    }
}

impl ErrorKind for base64::DecodeError {
    fn kind(&self) -> &'static str {
        match self {
            Self::InvalidByte(..) => "InvalidByte",
            Self::InvalidLastSymbol(..) => "InvalidLastSymbol",
            Self::InvalidLength(_) => "InvalidLength",
            Self::InvalidPadding => "InvalidPadding",
        }
    }
}

impl ErrorKind for crate::auth::header::AuthenticationError {
    fn kind(&self) -> &'static str {
        match self {
            Self::FailedConnection(err) => err.kind(),
            Self::FailedQuery(err) => err.kind(),
            Self::InvalidAuthType => "InvalidAuthType",
            Self::InvalidEncoding(err) => err.kind(),
            Self::MalformedCredentials => "MalformedCredentials",
            Self::UsernamePasswordMismatch => "UsernamePasswordMismatch",
            Self::Utf8Conversion(_) => "Utf8ConversionError",
        }
    }
}

impl ErrorKind for image::error::LimitErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::DimensionError => "DimensionLimitsExceeded",
            Self::InsufficientMemory => "OutOfMemory",
            Self::Unsupported { .. } => "UnsupportedImageDimensions",
            _ => "UnknownImageLimitError",
        }
    }
}

impl ErrorKind for image::error::ParameterErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::DimensionMismatch => "DimensionMismatch",
            Self::FailedAlready => "FailedAlready",
            Self::Generic(_) => "GenericError",
            Self::NoMoreData => "NoMoreData",
            _ => "UnknownImageParameterError",
        }
    }
}

impl ErrorKind for image::error::UnsupportedErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::Color(_) => "UnsupportedColor",
            Self::Format(_) => "UnsupportedFormat",
            Self::GenericFeature(_) => "UnsupportedFeature",
            _ => "UnknownImageUnsupportedError",
        }
    }
}

impl ErrorKind for image::ImageError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Decoding(_) => "FailedDecoding",
            Self::Encoding(_) => "FailedEncoding",
            Self::IoError(_) => "IOError",
            Self::Limits(err) => err.kind().kind(),
            Self::Parameter(err) => err.kind().kind(),
            Self::Unsupported(err) => err.kind().kind(),
        }
    }
}

impl ErrorKind for serde_json::Error {
    fn kind(&self) -> &'static str {
        use serde_json::error::Category;
        match self.classify() {
            Category::Io => "JsonIoError",
            Category::Syntax => "JsonInvalidSyntax",
            Category::Data => "JsonInvalidData",
            Category::Eof => "JsonUnexpectedEOF",
        }
    }
}

impl ErrorKind for crate::vote::LedgerError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "LedgerIOError",
            Self::Json(err) => err.kind(),
        }
    }
}

impl ErrorKind for crate::vote::VoteError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.kind(),
            Self::Persist(err) => err.kind(),
        }
    }
}

impl ErrorKind for crate::api::ApiError {
    fn kind(&self) -> &'static str {
        use crate::api::ApiError;
        match self {
            ApiError::AlreadyExists(_) => "AlreadyExists",
            ApiError::ContentTypeMismatch(..) => "ContentTypeMismatch",
            ApiError::DeviceRequired => "DeviceRequired",
            ApiError::DuplicateContent => "DuplicateContent",
            ApiError::ExpressionFailsRegex(..) => "ExpressionFailsRegex",
            ApiError::FailedAuthentication(err) => err.kind(),
            ApiError::FailedConnection(err) => err.kind(),
            ApiError::FailedQuery(err) => err.kind(),
            ApiError::FileTooLarge { .. } => "FileTooLarge",
            ApiError::FromStr(_) => "FromStrError",
            ApiError::HeaderDeserialization(_) => "HeaderDeserialization",
            ApiError::InsufficientPrivileges => "InsufficientPrivileges",
            ApiError::Image(err) => err.kind(),
            ApiError::JsonRejection(_) => "JsonRejection",
            ApiError::JsonSerialization(err) => err.kind(),
            ApiError::MalformedDeviceId(_) => "MalformedDeviceId",
            ApiError::MissingContentType => "MissingContentType",
            ApiError::MissingField(_) => "MissingField",
            ApiError::MissingMetadata => "MissingMetadata",
            ApiError::Multipart(_) => "MultipartError",
            ApiError::MultipartRejection(_) => "MultipartRejection",
            ApiError::NotFound(_) => "NotFound",
            ApiError::NotLoggedIn => "NotLoggedIn",
            ApiError::Password(err) => err.kind(),
            ApiError::PasswordsDoNotMatch => "PasswordsDoNotMatch",
            ApiError::PathRejection(_) => "PathRejection",
            ApiError::QueryRejection(_) => "QueryRejection",
            ApiError::RegionNotCreatable(_) => "RegionNotCreatable",
            ApiError::StdIo(_) => "IOError",
            ApiError::TooManyImages { .. } => "TooManyImages",
            ApiError::UnsupportedExtension(_) => "UnsupportedExtension",
            ApiError::UrlParse(_) => "UrlParseError",
            ApiError::Vote(err) => err.kind(),
        }
    }
}
