//thiserror-based error types
use shared_protocol::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcsError {
    #[error("IO: {0}")] Io(#[from] std::io::Error),
    #[error("Config: {0}")] Config(#[from] config::ConfigError),
    #[error("Transport: {0}")] Transport(#[from] TransportError),
}
