//! Everything that can interrupt the terminal monitor.

use std::{error::Error, fmt::Display, sync::mpsc};

/// Failures while drawing the monitor or talking to its worker thread.
#[derive(Debug)]
pub enum GuiError {
    FmtError(std::fmt::Error),
    IOError(std::io::Error),
    MPSCSendError,
    MPSCRecvError(mpsc::RecvError),
    MPSCTryRecvError(mpsc::TryRecvError),
    JoinError,
    /// The registry had nothing to choose from.
    NothingToSelect,
}

impl Display for GuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuiError::FmtError(e) => write!(f, "formatting failed: {}", e),
            GuiError::IOError(e) => write!(f, "terminal io failed: {}", e),
            GuiError::MPSCSendError => write!(f, "worker channel closed while sending"),
            GuiError::MPSCRecvError(e) => write!(f, "worker channel closed: {}", e),
            GuiError::MPSCTryRecvError(e) => write!(f, "worker channel: {}", e),
            GuiError::JoinError => write!(f, "worker thread panicked"),
            GuiError::NothingToSelect => write!(f, "no locations to choose from"),
        }
    }
}

impl Error for GuiError {}

impl From<std::fmt::Error> for GuiError {
    fn from(value: std::fmt::Error) -> Self {
        Self::FmtError(value)
    }
}

impl From<std::io::Error> for GuiError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl<T> From<mpsc::SendError<T>> for GuiError {
    fn from(_: mpsc::SendError<T>) -> Self {
        Self::MPSCSendError
    }
}

impl<T> From<mpsc::TrySendError<T>> for GuiError {
    fn from(_: mpsc::TrySendError<T>) -> Self {
        Self::MPSCSendError
    }
}

impl From<mpsc::RecvError> for GuiError {
    fn from(value: mpsc::RecvError) -> Self {
        Self::MPSCRecvError(value)
    }
}

impl From<mpsc::TryRecvError> for GuiError {
    fn from(value: mpsc::TryRecvError) -> Self {
        Self::MPSCTryRecvError(value)
    }
}
