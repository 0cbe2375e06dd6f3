use std::sync::{Arc, RwLock};

use tokio::time;
use tracing::debug;

use crate::{
    backoff::Backoff,
    config::Cluster,
    locker::Dial,
    net::WsDialer,
    pool::PeerPool,
    quorum::{acquire_once, quorum_met, send_release},
};

pub struct DMutex {
    name: String,
    cluster: Arc<Cluster>,
    pool: PeerPool,
    grants: RwLock<Vec<bool>>,
    gate: tokio::sync::Mutex<()>,
}

impl DMutex {
    pub fn new(cluster: Arc<Cluster>, name: impl Into<String>) -> Self {
        let dialer = Arc::new(WsDialer::new(cluster.rpc_path()));
        Self::with_dialer(cluster, name, dialer)
    }

    pub fn with_dialer(
        cluster: Arc<Cluster>,
        name: impl Into<String>,
        dialer: Arc<dyn Dial>,
    ) -> Self {
        let n = cluster.n();
        Self {
            name: name.into(),
            cluster,
            pool: PeerPool::new(n, dialer),
            grants: RwLock::new(vec![false; n]),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn lock(&self) {
        let _gate = self.gate.lock().await;

        let mut backoff = Backoff::new();
        let mut attempts = 0u64;

        loop {
            attempts += 1;
            self.pool.connect_lazy(&self.cluster).await;
            let lockers = self.pool.snapshot();

            let outcome = acquire_once(&lockers, self.cluster.quorum(), &self.name).await;
            if outcome.succeeded {
                if attempts > 1 {
                    debug!(name = %self.name, attempts, "lock acquired after retries");
                }
                *self.write_grants() = outcome.granted;
                return;
            }

            time::sleep(backoff.step()).await;
        }
    }

    pub fn unlock(&self) {
        let mut grants = self.write_grants();
        if !quorum_met(&grants, self.cluster.quorum()) {
            panic!("qlock: unlock of unlocked distributed mutex");
        }

        let lockers = self.pool.snapshot();
        for (index, locked) in grants.iter_mut().enumerate() {
            if *locked {
                if let Some(locker) = &lockers[index] {
                    send_release(Arc::clone(locker), self.name.clone());
                }
                *locked = false;
            }
        }
    }

    pub fn is_held(&self) -> bool {
        quorum_met(&self.read_grants(), self.cluster.quorum())
    }

    pub fn holds_grant_from(&self, endpoint: &str) -> bool {
        let grants = self.read_grants();
        self.cluster
            .nodes()
            .iter()
            .position(|node| node == endpoint)
            .is_some_and(|index| grants[index])
    }

    fn read_grants(&self) -> Vec<bool> {
        match self.grants.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_grants(&self) -> std::sync::RwLockWriteGuard<'_, Vec<bool>> {
        match self.grants.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
