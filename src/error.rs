//! Crate-wide error taxonomy.

/// Result type for tour planning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning delivery tours.
///
/// Recovery policy follows the failure site: oracle and cache errors are
/// recovered locally (great-circle fallback, uncached run) and only surface
/// as warnings; input and configuration errors abort before solving;
/// [`Error::NoSolution`] aborts a single cluster solve, which the caller
/// turns into unassigned orders.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A single order carried invalid data (non-positive weight, bad
    /// coordinates, malformed time or date).
    #[error("invalid order {order_id}: {message}")]
    InvalidOrder { order_id: String, message: String },

    /// Order ingestion failed; one line per offending row.
    #[error("order ingestion failed:\n{}", .0.join("\n"))]
    Ingestion(Vec<String>),

    /// Invalid configuration (unknown hub, bad capacity, unknown mode).
    #[error("configuration error: {0}")]
    Config(String),

    /// The distance oracle could not be reached or answered garbage.
    #[error("distance oracle error: {0}")]
    Oracle(String),

    /// The solver produced no incumbent within its budget.
    #[error("no solution found: {0}")]
    NoSolution(String),

    /// Matrix cache read/write failure.
    #[error("matrix cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("report error: {0}")]
    Report(String),
}
