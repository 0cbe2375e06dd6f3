use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;

#[async_trait]
pub trait PeerLocker: Send + Sync {
    async fn lock(&self, name: &str) -> Result<bool>;
    async fn unlock(&self, name: &str) -> Result<bool>;
}

#[async_trait]
pub trait Dial: Send + Sync {
    async fn dial(&self, endpoint: &str) -> Result<Arc<dyn PeerLocker>>;
}
