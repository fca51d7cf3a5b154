use shared_protocol::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroundError {
    #[error("IO: {0}")] Io(#[from] std::io::Error),
    #[error("Config: {0}")] Config(#[from] config::ConfigError),
    #[error("Transport: {0}")] Transport(#[from] TransportError),
    #[error("JSON: {0}")] Json(#[from] serde_json::Error),
}
