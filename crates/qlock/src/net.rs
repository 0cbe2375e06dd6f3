use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{Mutex, mpsc, oneshot},
    time,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message as WsMessage};
use tracing::debug;

use crate::{
    errors::{QlockError, Result},
    locker::{Dial, PeerLocker},
    wire::{Call, Request, Response, Seq},
};

pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsDialer {
    rpc_path: String,
}

impl WsDialer {
    pub fn new(rpc_path: impl Into<String>) -> Self {
        Self {
            rpc_path: rpc_path.into(),
        }
    }
}

#[async_trait]
impl Dial for WsDialer {
    async fn dial(&self, endpoint: &str) -> Result<Arc<dyn PeerLocker>> {
        let url = format!("ws://{}{}", endpoint, self.rpc_path);
        let (stream, _) = tokio_tungstenite::connect_async(&url)
            .await
            .map_err(QlockError::WebSocket)?;
        Ok(Arc::new(WsLocker::start(stream)))
    }
}

pub struct WsLocker {
    outgoing: mpsc::Sender<Request>,
    pending: Arc<Mutex<HashMap<Seq, oneshot::Sender<bool>>>>,
    next_seq: AtomicU32,
}

impl WsLocker {
    pub fn start(stream: WsStream) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::channel(64);
        let pending = Arc::new(Mutex::new(HashMap::new()));

        let session_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            if let Err(err) = session(stream, outgoing_rx, &session_pending).await {
                debug!(error = %err, "peer session ended");
            }
            session_pending.lock().await.clear();
        });

        Self {
            outgoing: outgoing_tx,
            pending,
            next_seq: AtomicU32::new(1),
        }
    }

    async fn call(&self, call: Call) -> Result<bool> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(seq, tx);

        if self.outgoing.send(Request { seq, call }).await.is_err() {
            self.pending.lock().await.remove(&seq);
            return Err(QlockError::ConnectionClosed);
        }

        match time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(granted)) => Ok(granted),
            Ok(Err(_)) => Err(QlockError::ConnectionClosed),
            Err(_) => {
                self.pending.lock().await.remove(&seq);
                Err(QlockError::RequestTimeout { seq })
            }
        }
    }
}

#[async_trait]
impl PeerLocker for WsLocker {
    async fn lock(&self, name: &str) -> Result<bool> {
        self.call(Call::Lock {
            name: name.to_owned(),
        })
        .await
    }

    async fn unlock(&self, name: &str) -> Result<bool> {
        self.call(Call::Unlock {
            name: name.to_owned(),
        })
        .await
    }
}

async fn session(
    stream: WsStream,
    mut outgoing: mpsc::Receiver<Request>,
    pending: &Mutex<HashMap<Seq, oneshot::Sender<bool>>>,
) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = stream.split();

    loop {
        tokio::select! {
            maybe_out = outgoing.recv() => {
                let Some(request) = maybe_out else {
                    return Err(QlockError::ConnectionClosed);
                };
                ws_tx
                    .send(WsMessage::Binary(request.encode()?.into()))
                    .await
                    .map_err(QlockError::WebSocket)?;
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(WsMessage::Binary(bytes))) => {
                        let response = Response::decode(&bytes)?;
                        match pending.lock().await.remove(&response.seq) {
                            Some(waiter) => {
                                let _ = waiter.send(response.granted);
                            }
                            None => {
                                return Err(QlockError::UnexpectedResponse {
                                    seq: response.seq,
                                });
                            }
                        }
                    }
                    Some(Ok(WsMessage::Ping(payload))) => {
                        ws_tx
                            .send(WsMessage::Pong(payload))
                            .await
                            .map_err(QlockError::WebSocket)?;
                    }
                    Some(Ok(WsMessage::Close(_))) => return Err(QlockError::ConnectionClosed),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(QlockError::WebSocket(err)),
                    None => return Err(QlockError::ConnectionClosed),
                }
            }
        }
    }
}
