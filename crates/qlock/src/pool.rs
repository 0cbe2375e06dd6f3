use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{
    config::Cluster,
    locker::{Dial, PeerLocker},
};

pub struct PeerPool {
    dialer: Arc<dyn Dial>,
    slots: Mutex<Vec<Option<Arc<dyn PeerLocker>>>>,
}

impl PeerPool {
    pub fn new(n: usize, dialer: Arc<dyn Dial>) -> Self {
        Self {
            dialer,
            slots: Mutex::new(vec![None; n]),
        }
    }

    pub async fn connect_lazy(&self, cluster: &Cluster) {
        let missing: Vec<(usize, String)> = self
            .slots_mut()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .filter_map(|(index, _)| {
                cluster
                    .endpoint(index)
                    .map(|endpoint| (index, endpoint.to_owned()))
            })
            .collect();

        for (index, endpoint) in missing {
            match self.dialer.dial(&endpoint).await {
                Ok(locker) => self.slots_mut()[index] = Some(locker),
                Err(err) => debug!(%endpoint, error = %err, "peer dial failed"),
            }
        }
    }

    pub fn snapshot(&self) -> Vec<Option<Arc<dyn PeerLocker>>> {
        self.slots_mut().clone()
    }

    fn slots_mut(&self) -> std::sync::MutexGuard<'_, Vec<Option<Arc<dyn PeerLocker>>>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
