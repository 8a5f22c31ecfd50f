//! Typed error taxonomy for the server. Each variant corresponds to one of the error
//! classes in the design: protocol violations are logged and usually survived,
//! connection failures run the cleanup path, instance failures terminate only that
//! instance. Nothing here is a string-typed catch-all.

use std::fmt;

/// A condition observed while decoding or routing one message from a connected client.
/// Most variants are logged and the connection continues; only `LineTooLong` is fatal.
#[derive(Debug)]
pub enum ProtocolError {
    Malformed(shared::message::CodecError),
    LineTooLong(usize),
    AlreadyJoined,
    NoMapsAvailable,
    InputOnNoPlayer,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "malformed message: {e}"),
            ProtocolError::LineTooLong(n) => write!(f, "line too long: {n} bytes"),
            ProtocolError::AlreadyJoined => write!(f, "client already joined an instance"),
            ProtocolError::NoMapsAvailable => write!(f, "no maps available"),
            ProtocolError::InputOnNoPlayer => write!(f, "input received from client with no player"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// A connection-scoped failure: read/write error or peer EOF. Always terminal for that
/// one connection; never propagates to other connections or to the owning instance
/// beyond the single `player_left` notification the cleanup path sends.
#[derive(Debug)]
pub enum ConnectionError {
    Io(std::io::Error),
    Protocol(ProtocolError),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Io(e) => write!(f, "connection io error: {e}"),
            ConnectionError::Protocol(e) => write!(f, "connection protocol error: {e}"),
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectionError::Io(e) => Some(e),
            ConnectionError::Protocol(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConnectionError {
    fn from(e: std::io::Error) -> Self {
        ConnectionError::Io(e)
    }
}

impl From<ProtocolError> for ConnectionError {
    fn from(e: ProtocolError) -> Self {
        ConnectionError::Protocol(e)
    }
}
