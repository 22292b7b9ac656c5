use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use crate::models::{Screenplay, ScreenplayId};
use crate::store::{ScreenplayStore, StoreError, StoreResult};

/// 文件内容
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    screenplays: Vec<Screenplay>,
}

/// 单个 JSON 文件保存全部剧本，每次写入都整体落盘
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    screenplays: RwLock<BTreeMap<ScreenplayId, Screenplay>>,
    last_id: AtomicU64,
}

impl JsonFileStore {
    /// 打开存储文件，文件不存在时从空存储开始
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => StoreFile::default(),
            Ok(bytes) => serde_json::from_slice::<StoreFile>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(e.into()),
        };

        // id 计数从已有实体的最大 id 继续
        let last_id = file
            .screenplays
            .iter()
            .map(Screenplay::max_entity_id)
            .max()
            .unwrap_or(0);
        log::debug!(
            "打开存储 {}: {} 个剧本, 最大 id {}",
            path.display(),
            file.screenplays.len(),
            last_id
        );

        let screenplays = file.screenplays.into_iter().map(|s| (s.id, s)).collect();
        Ok(JsonFileStore {
            path,
            screenplays: RwLock::new(screenplays),
            last_id: AtomicU64::new(last_id),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, screenplays: &BTreeMap<ScreenplayId, Screenplay>) -> StoreResult<()> {
        let file = StoreFile {
            screenplays: screenplays.values().cloned().collect(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        // 先写临时文件再改名
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ScreenplayStore for JsonFileStore {
    async fn load(&self, id: ScreenplayId) -> StoreResult<Screenplay> {
        self.screenplays
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, screenplay: &Screenplay) -> StoreResult<()> {
        let mut screenplays = self.screenplays.write().await;
        // 落盘成功后才替换内存中的数据
        let mut next = screenplays.clone();
        next.insert(screenplay.id, screenplay.clone());
        self.flush(&next).await?;
        *screenplays = next;
        Ok(())
    }

    async fn next_id(&self) -> StoreResult<u64> {
        Ok(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn ids(&self) -> StoreResult<Vec<ScreenplayId>> {
        Ok(self.screenplays.read().await.keys().copied().collect())
    }
}
