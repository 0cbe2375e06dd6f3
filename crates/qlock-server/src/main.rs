use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use futures::{SinkExt, StreamExt};
use qlock::{
    LocalLocker, PeerLocker,
    wire::{Call, Request, Response},
};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{
    Message as WsMessage,
    handshake::server::{ErrorResponse, Request as HsRequest, Response as HsResponse},
    http::StatusCode,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qlock-server", about = "Peer lock server for qlock clusters")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "9320")]
    port: u16,

    #[arg(long, default_value = "/qlock")]
    rpc_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive("qlock=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);
    let locker = Arc::new(LocalLocker::new());
    let rpc_path: Arc<str> = cli.rpc_path.into();

    let listener = TcpListener::bind(&addr).await?;
    info!("qlock peer server listening on {addr}");

    loop {
        let (stream, remote) = listener.accept().await?;
        let locker = Arc::clone(&locker);
        let rpc_path = Arc::clone(&rpc_path);
        tokio::spawn(async move {
            if let Err(err) = serve_connection(stream, remote, &rpc_path, locker).await {
                debug!(%remote, error = %err, "connection ended");
            }
        });
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote: SocketAddr,
    rpc_path: &str,
    locker: Arc<LocalLocker>,
) -> Result<(), Box<dyn std::error::Error>> {
    let check_path = |request: &HsRequest, response: HsResponse| {
        if request.uri().path() == rpc_path {
            Ok(response)
        } else {
            let mut refused = ErrorResponse::new(Some("unknown rpc path".to_string()));
            *refused.status_mut() = StatusCode::NOT_FOUND;
            Err(refused)
        }
    };

    let ws = tokio_tungstenite::accept_hdr_async(stream, check_path).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    debug!(%remote, "peer connected");

    while let Some(message) = ws_rx.next().await {
        match message? {
            WsMessage::Binary(bytes) => {
                let request = Request::decode(&bytes)?;
                let granted = match &request.call {
                    Call::Lock { name } => locker.lock(name).await?,
                    Call::Unlock { name } => locker.unlock(name).await?,
                };
                let response = Response {
                    seq: request.seq,
                    granted,
                };
                ws_tx
                    .send(WsMessage::Binary(response.encode()?.into()))
                    .await?;
            }
            WsMessage::Ping(payload) => ws_tx.send(WsMessage::Pong(payload)).await?,
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}
