use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::models::{Screenplay, ScreenplayId};
use crate::store::{ScreenplayStore, StoreError, StoreResult};

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    screenplays: RwLock<HashMap<ScreenplayId, Screenplay>>,
    last_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScreenplayStore for MemoryStore {
    async fn load(&self, id: ScreenplayId) -> StoreResult<Screenplay> {
        self.screenplays
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, screenplay: &Screenplay) -> StoreResult<()> {
        self.screenplays
            .write()
            .await
            .insert(screenplay.id, screenplay.clone());
        Ok(())
    }

    async fn next_id(&self) -> StoreResult<u64> {
        Ok(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn ids(&self) -> StoreResult<Vec<ScreenplayId>> {
        let mut ids: Vec<_> = self.screenplays.read().await.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
