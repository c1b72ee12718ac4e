use serde::ser::SerializeStruct;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    General(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Error shape that crosses every service boundary. Backend-specific errors
/// are mapped into one of these variants inside the adapter; nothing else
/// leaks past it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("{0}")]
    Unknown(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotImplemented(_) => "not_implemented",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl Serialize for ServiceError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ServiceError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_codes() {
        assert_eq!(ServiceError::NotFound("book b1".into()).code(), "not_found");
        assert_eq!(
            ServiceError::InvalidCredentials.code(),
            "invalid_credentials"
        );
        assert_eq!(
            ServiceError::NotImplemented("reels".into()).code(),
            "not_implemented"
        );
        assert_eq!(ServiceError::Unknown("boom".into()).code(), "unknown");
    }

    #[test]
    fn test_service_error_serializes_to_code_and_message() {
        let json = serde_json::to_value(ServiceError::NotFound("bhajan bh9".into())).unwrap();
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["message"], "not found: bhajan bh9");
    }
}
