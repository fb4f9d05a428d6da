use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the stock ledger crates.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The ledger file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger header lacks one or more required columns.
    #[error("Missing required columns in {path}: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// A CSV record could not be decoded.
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },

    /// No ledger files were found under the given directory.
    #[error("No ledger files found in {0}")]
    NoLedgerFiles(PathBuf),

    /// Aggregation could not complete.
    #[error("Failed to build inventory: {0}")]
    Build(String),

    /// No ledger has been loaded yet.
    #[error("Inventory engine not ready: no ledger loaded")]
    NotReady,

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    /// `true` for failures that happen while reading the source table.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. }
                | Self::MissingColumns { .. }
                | Self::MalformedRecord { .. }
                | Self::NoLedgerFiles(_)
        )
    }

    /// `true` when retrying the same operation may succeed (the file was
    /// mid-write or briefly locked). Structural problems never are.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FileRead { .. } | Self::Io(_))
    }
}

/// Convenience alias used throughout the stock ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;
