pub mod backoff;
pub mod config;
pub mod dmutex;
pub mod errors;
pub mod local;
pub mod locker;
pub mod net;
pub mod pool;
pub mod quorum;
pub mod wire;

pub use backoff::Backoff;
pub use config::Cluster;
pub use dmutex::DMutex;
pub use errors::{QlockError, Result};
pub use local::LocalLocker;
pub use locker::{Dial, PeerLocker};
pub use net::{WsDialer, WsLocker};
pub use pool::PeerPool;
pub use quorum::ACQUIRE_TIMEOUT;
