use thiserror::Error;

/// Every failure a reservation or catalog operation can surface.
///
/// Variants map one-to-one onto the kinds reported to API clients
/// (see [`DomainError::kind`]).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Authorization missing: {0}")]
    AuthMissing(String),

    #[error("Authorization invalid: {0}")]
    AuthInvalid(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Dependency failure: {0}")]
    Dependency(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Stable machine-readable kind used in the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::AuthMissing(_) => "auth_missing",
            Self::AuthInvalid(_) => "auth_invalid",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Dependency(_) => "dependency",
        }
    }

    /// Client-facing message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::AuthMissing(m)
            | Self::AuthInvalid(m)
            | Self::Forbidden(m)
            | Self::Conflict(m)
            | Self::Dependency(m) => m.clone(),
            Self::NotFound { entity, .. } => format!("{} not found", entity),
        }
    }

    /// Whether this error is likely transient (store or identity provider
    /// unreachable) and the operation may succeed if retried after backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Dependency(format!("Database error: {}", e))
    }
}

/// Startup / wiring failures that never reach an API client.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
