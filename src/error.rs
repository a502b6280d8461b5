use std::io;
use thiserror::Error;

/// Error type for filekv operations.
#[derive(Error, Debug)]
pub enum KvError {
    /// IO error from socket or file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the connection before sending a request.
    #[error("Connection closed before a request was read")]
    ConnectionClosed,

    /// Error reply relayed from the server.
    #[error("{0}")]
    StringError(String),

    /// The server sent a reply that is not part of the protocol.
    #[error("Unexpected response: {0:?}")]
    UnexpectedResponse(String),
}

/// Result type alias for filekv operations.
pub type Result<T> = std::result::Result<T, KvError>;
