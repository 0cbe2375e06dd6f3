use thiserror::Error;

pub type Result<T> = std::result::Result<T, QlockError>;

#[derive(Debug, Error)]
pub enum QlockError {
    #[error("message encode error: {0}")]
    Encode(#[source] rmp_serde::encode::Error),
    #[error("message decode error: {0}")]
    Decode(#[source] rmp_serde::decode::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("request timed out for sequence {seq}")]
    RequestTimeout { seq: u32 },
    #[error("unexpected response for sequence {seq}")]
    UnexpectedResponse { seq: u32 },
    #[error("cluster has no nodes")]
    EmptyCluster,
}
