//! Collection of own error-related types

use serde_json;
use std::{fmt, io};

/// Own error type
///
/// Enum of every failure kind the crate's components can raise. Per the
/// error-handling design, only [Error::NoWmDetected] and a backend's connect
/// failure are ever surfaced to the user as exit code 1; every other variant
/// is caught inside a hook or backend and collapsed to `absent`/no-op before
/// it would reach `main`.
#[derive(Debug)]
pub enum Error {
    /// An [io::Error] variant
    Io(io::Error),
    /// A [serde_json::Error]
    Json(serde_json::Error),
    /// No window-manager environment variable hint found by the selector
    NoWmDetected,
    /// Could not open the chosen backend's IPC socket
    ConnectFailed(String),
    /// A resolved socket path exceeded `sockaddr_un`'s capacity
    SocketPathTooLong,
    /// No socket path could be derived from the environment
    NoSocketPath,
    /// `write` on an open transport failed or timed out
    WriteFailed,
    /// `read` on an open transport failed or timed out
    ReadFailed,
    /// A reply could not be parsed in the expected wire format
    ParseFailed,
    /// A msgpack reply did not match the expected framing
    InvalidMsgpackFormat,
    /// A reply violated the expected IPC protocol (bad type, missing field)
    ProtocolError,
    /// Neovim returned a non-nil RPC error field
    NvimError(String),
    /// Free-form message, used where no dedicated variant fits
    Str(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => e.fmt(f),
            Error::Json(e) => e.fmt(f),
            Error::NoWmDetected => write!(f, "no window manager detected"),
            Error::ConnectFailed(s) => write!(f, "connect failed: {s}"),
            Error::SocketPathTooLong => write!(f, "socket path too long"),
            Error::NoSocketPath => write!(f, "no socket path available"),
            Error::WriteFailed => write!(f, "write failed"),
            Error::ReadFailed => write!(f, "read failed"),
            Error::ParseFailed => write!(f, "parse failed"),
            Error::InvalidMsgpackFormat => write!(f, "invalid msgpack format"),
            Error::ProtocolError => write!(f, "protocol error"),
            Error::NvimError(s) => write!(f, "neovim error: {s}"),
            Error::Str(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(io) => io,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Self::Str(String::from(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Own result type
///
/// This is result based on [Error]
pub type Result<T> = std::result::Result<T, Error>;

/// Three-valued answer to "can focus move in this direction from here".
///
/// Never conflate [Answer::Unknown] with [Answer::No]: both bubble the
/// keystroke up to the next layer, but they are logged differently under
/// `NVG_DEBUG=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unknown,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }
}
