//! Error taxonomy for the probes.
//!
//! Nothing here is recovered from: every variant propagates to the Lambda
//! runtime as an invocation fault. Classification only exists so the fault
//! names what actually went wrong (unreachable host, conflicting schema,
//! duplicate email, malformed command).

use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Host unreachable, authentication failure or missing configuration.
    #[error("connection error: {0}")]
    Connection(String),

    /// An existing relation conflicts with the expected structure.
    #[error("schema conflict: {0}")]
    Schema(String),

    /// A store-enforced constraint rejected the sample write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The client or server rejected a command at the protocol level.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Maps a `tokio_postgres` error onto the taxonomy.
///
/// Errors without a database-side SQLSTATE (socket errors, TLS failures)
/// are connection errors. SQLSTATE class 23 is a constraint violation,
/// class 42 a schema conflict, classes 08 and 28 (including invalid
/// password on startup) connection failures; anything else is treated as a
/// protocol-level rejection.
pub fn classify_postgres(err: tokio_postgres::Error) -> ProbeError {
    let Some(db) = err.as_db_error() else {
        return ProbeError::Connection(err.to_string());
    };

    let message = db.message().to_string();
    if db.code() == &SqlState::UNIQUE_VIOLATION {
        return ProbeError::ConstraintViolation(message);
    }
    match db.code().code().get(..2) {
        Some("23") => ProbeError::ConstraintViolation(message),
        Some("42") => ProbeError::Schema(message),
        Some("08") | Some("28") => ProbeError::Connection(message),
        _ => ProbeError::Protocol(message),
    }
}

/// Maps a `redis` error onto the taxonomy.
pub fn classify_redis(err: redis::RedisError) -> ProbeError {
    use redis::ErrorKind;

    match err.kind() {
        ErrorKind::IoError
        | ErrorKind::AuthenticationFailed
        | ErrorKind::InvalidClientConfig
        | ErrorKind::MasterDown => ProbeError::Connection(err.to_string()),
        _ => ProbeError::Protocol(err.to_string()),
    }
}
