use thiserror::Error;

/// Terminal failure kinds for the scatter/gather pipeline. None of
/// these are retried at this layer; a failed shard or a divergent
/// merge aborts the whole run.
#[derive(Error, Debug)]
pub enum ScatterError {
    /// Bad shard count/size or a malformed ranges file
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Shard key sets must be set-equal across all shards
    #[error("shard {shard}: key set diverges (expected {expected} keys, matched {matched})")]
    SchemaMismatch {
        shard: usize,
        expected: usize,
        matched: usize,
    },

    /// Two shards claim the same sample column
    #[error("shard {shard}: sample column '{sample}' already covered by an earlier shard")]
    DuplicateColumn { shard: usize, sample: Box<str> },

    /// A shard output file is absent or unreadable
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A row with missing fields or a non-numeric score
    #[error("{file}: line {line}: {reason}")]
    MalformedRecord {
        file: Box<str>,
        line: usize,
        reason: String,
    },
}
