use feedcast_common::ErrorKind;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("required setting missing: {category}.{key}")]
    ConfigMissing { category: String, key: String },

    #[error("setting {category}.{key} has an invalid value for its type: {value}")]
    ConfigMalformed {
        category: String,
        key: String,
        value: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl feedcast_common::error::Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::ConfigMissing { .. } => ErrorKind::ConfigMissing,
            StoreError::ConfigMalformed { .. } => ErrorKind::ConfigMissing,
            StoreError::Database(sqlx::Error::Database(e))
                if e.constraint().is_some() =>
            {
                ErrorKind::StateConflict
            }
            StoreError::Database(_) => ErrorKind::Transient,
            StoreError::Migration(_) => ErrorKind::ConfigMissing,
            StoreError::Other(_) => ErrorKind::IntegrityViolation,
        }
    }
}
