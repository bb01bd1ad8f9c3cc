use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to reach the database: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("Write rejected by constraint {}: {source}", .constraint.as_deref().unwrap_or("<unnamed>"))]
    ConstraintViolation {
        constraint: Option<String>,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to decode a row into the expected shape: {0}")]
    Scan(#[source] sqlx::Error),

    #[error("Database migration {script} failed: {source}")]
    Migration {
        script: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Embedded migration {script} is not valid UTF-8")]
    MigrationAsset { script: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::Connectivity(err),

            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => DbError::Scan(err),

            sqlx::Error::Database(db_err) if is_constraint_kind(db_err.kind()) => {
                DbError::ConstraintViolation {
                    constraint: db_err.constraint().map(str::to_owned),
                    source: err,
                }
            }

            _ => DbError::Query(err),
        }
    }
}

fn is_constraint_kind(kind: sqlx::error::ErrorKind) -> bool {
    matches!(
        kind,
        sqlx::error::ErrorKind::UniqueViolation
            | sqlx::error::ErrorKind::ForeignKeyViolation
            | sqlx::error::ErrorKind::NotNullViolation
            | sqlx::error::ErrorKind::CheckViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn transport_failures_are_connectivity() {
        let io_err = sqlx::Error::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(matches!(DbError::from(io_err), DbError::Connectivity(_)));
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::Connectivity(_)));
        assert!(matches!(DbError::from(sqlx::Error::PoolClosed), DbError::Connectivity(_)));
    }

    #[test]
    fn decode_failures_are_scan_errors() {
        let missing = sqlx::Error::ColumnNotFound("saved_at".to_string());
        assert!(matches!(DbError::from(missing), DbError::Scan(_)));

        let bad_column = sqlx::Error::ColumnDecode {
            index: "\"payload\"".to_string(),
            source: "unexpected null".into(),
        };
        assert!(matches!(DbError::from(bad_column), DbError::Scan(_)));
    }

    #[test]
    fn everything_else_is_a_query_error() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::Query(_)));
    }

    #[test]
    fn migration_error_names_the_script() {
        let err = DbError::Migration {
            script: "0003_create_alert_triggers.sql".to_string(),
            source: sqlx::Error::Protocol("syntax error".to_string()),
        };
        assert!(err.to_string().contains("0003_create_alert_triggers.sql"));
    }
}
