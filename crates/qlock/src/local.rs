use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;

use crate::{errors::Result, locker::PeerLocker};

#[derive(Debug, Default)]
pub struct LocalLocker {
    held: Mutex<HashSet<String>>,
}

impl LocalLocker {
    pub fn new() -> Self {
        Self::default()
    }

    fn held_mut(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        match self.held.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl PeerLocker for LocalLocker {
    async fn lock(&self, name: &str) -> Result<bool> {
        Ok(self.held_mut().insert(name.to_owned()))
    }

    async fn unlock(&self, name: &str) -> Result<bool> {
        Ok(self.held_mut().remove(name))
    }
}

#[cfg(test)]
mod tests {
    use super::LocalLocker;
    use crate::locker::PeerLocker;

    #[tokio::test]
    async fn contention_is_refused_not_queued() {
        let locker = LocalLocker::new();
        assert!(locker.lock("resource").await.unwrap());
        assert!(!locker.lock("resource").await.unwrap());
        assert!(locker.lock("other").await.unwrap());
    }

    #[tokio::test]
    async fn unlock_frees_the_name() {
        let locker = LocalLocker::new();
        assert!(locker.lock("resource").await.unwrap());
        assert!(locker.unlock("resource").await.unwrap());
        assert!(locker.lock("resource").await.unwrap());
    }

    #[tokio::test]
    async fn unlock_of_unheld_name_is_a_noop() {
        let locker = LocalLocker::new();
        assert!(!locker.unlock("resource").await.unwrap());
    }
}
