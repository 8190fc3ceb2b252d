use crate::config::AppConfig;
use crate::models::ResultSet;
use crate::report;
use crate::service::{ExternalClassifier, ExtractionEngine};
use chrono::Utc;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 共享状态: 引擎、外部分类服务、结果存储
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<ExtractionEngine>,
    pub classifier: Arc<dyn ExternalClassifier>,
    pub store: Arc<ResultStore>,
}

impl AppState {
    pub fn new(config: AppConfig, classifier: Arc<dyn ExternalClassifier>) -> Self {
        let engine = ExtractionEngine::new(config.extraction.clone());
        let store = ResultStore::new(&config.upload.dir);
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            classifier,
            store: Arc::new(store),
        }
    }
}

/// 分析结果: 内存缓存 + 上传目录下的 resultados_{id}.json
pub struct ResultStore {
    dir: PathBuf,
    cache: DashMap<String, ResultSet>,
    seq: AtomicU64,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}{:04}", Utc::now().format("%Y%m%d%H%M%S%3f"), seq % 10_000)
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("resultados_{}.json", id))
    }

    /// 写盘失败只记日志, 缓存中的结果仍可下载
    pub async fn save(&self, id: &str, results: &ResultSet) {
        self.cache.insert(id.to_string(), results.clone());
        let bytes = match report::to_json(results.records()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to serialize results {}: {}", id, e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(self.path_for(id), bytes).await {
            tracing::warn!("Failed to persist results {}: {}", id, e);
        }
    }

    /// 先查缓存, 再读磁盘文件
    pub async fn load(&self, id: &str) -> Option<ResultSet> {
        if !is_valid_id(id) {
            return None;
        }
        let cached = self.cache.get(id).map(|hit| hit.value().clone());
        if cached.is_some() {
            return cached;
        }
        let bytes = tokio::fs::read(self.path_for(id)).await.ok()?;
        match serde_json::from_slice::<ResultSet>(&bytes) {
            Ok(results) => {
                self.cache.insert(id.to_string(), results.clone());
                Some(results)
            }
            Err(e) => {
                tracing::warn!("Stored results {} unreadable: {}", id, e);
                None
            }
        }
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_and_reloads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        let id = store.next_id();
        store.save(&id, &ResultSet::new()).await;
        assert!(dir.path().join(format!("resultados_{}.json", id)).exists());

        let fresh = ResultStore::new(dir.path());
        assert_eq!(fresh.load(&id).await, Some(ResultSet::new()));
    }

    #[tokio::test]
    async fn rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        assert_eq!(store.load("../etc/passwd").await, None);
        assert_eq!(store.load("").await, None);
    }

    #[test]
    fn ids_are_unique() {
        let store = ResultStore::new("uploads");
        assert_ne!(store.next_id(), store.next_id());
    }
}
