use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, time};
use tracing::warn;

use crate::locker::PeerLocker;

pub const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy)]
struct Granted {
    index: usize,
    locked: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct AcquireOutcome {
    pub granted: Vec<bool>,
    pub succeeded: bool,
}

pub(crate) async fn acquire_once(
    lockers: &[Option<Arc<dyn PeerLocker>>],
    quorum: usize,
    name: &str,
) -> AcquireOutcome {
    let n = lockers.len();
    let (tx, mut rx) = mpsc::channel::<Granted>(n.max(1));

    for (index, slot) in lockers.iter().enumerate() {
        match slot {
            Some(locker) => {
                let locker = Arc::clone(locker);
                let name = name.to_owned();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let locked = matches!(locker.lock(&name).await, Ok(true));
                    let _ = tx.send(Granted { index, locked }).await;
                });
            }
            None => {
                let _ = tx.try_send(Granted {
                    index,
                    locked: false,
                });
            }
        }
    }
    drop(tx);

    let mut granted = vec![false; n];
    let mut received = 0usize;
    let mut lost = false;

    let timer = time::sleep(ACQUIRE_TIMEOUT);
    tokio::pin!(timer);

    while received < n {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(reply) = maybe else { break };
                received += 1;
                if reply.locked {
                    granted[reply.index] = true;
                } else {
                    lost = true;
                    break;
                }
            }
            _ = &mut timer => break,
        }
    }

    let succeeded = !lost && quorum_met(&granted, quorum);
    if !succeeded {
        release_all(lockers, &mut granted, name);
    }

    if received < n {
        let lockers = lockers.to_vec();
        let name = name.to_owned();
        tokio::spawn(async move {
            while let Some(late) = rx.recv().await {
                if late.locked
                    && let Some(locker) = &lockers[late.index]
                {
                    send_release(Arc::clone(locker), name.clone());
                }
            }
        });
    }

    AcquireOutcome { granted, succeeded }
}

pub(crate) fn quorum_met(granted: &[bool], quorum: usize) -> bool {
    granted.iter().filter(|locked| **locked).count() >= quorum
}

fn release_all(lockers: &[Option<Arc<dyn PeerLocker>>], granted: &mut [bool], name: &str) {
    for (index, locked) in granted.iter_mut().enumerate() {
        if *locked {
            if let Some(locker) = &lockers[index] {
                send_release(Arc::clone(locker), name.to_owned());
            }
            *locked = false;
        }
    }
}

pub(crate) fn send_release(locker: Arc<dyn PeerLocker>, name: String) {
    tokio::spawn(async move {
        if let Err(err) = locker.unlock(&name).await {
            warn!(%name, error = %err, "peer unlock failed");
        }
    });
}
