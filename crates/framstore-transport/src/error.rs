use std::path::PathBuf;

/// Errors that can occur while running a bus transaction.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open or size the backing image of a device.
    #[error("failed to open device image {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while the frame was asserted.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A transaction was issued with no outbound bytes.
    #[error("empty transaction (no command byte)")]
    EmptyTransaction,

    /// The bus reported a fault (timeout, arbitration loss, and the like).
    #[error("bus fault: {0}")]
    Fault(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
