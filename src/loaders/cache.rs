use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use super::asset::SceneAsset;
use super::gltf::GltfLoader;
use crate::traits::AssetLoader;

pub type LoadResult = Result<Arc<SceneAsset>, AssetLoadError>;

type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Boxed load failure, shared by every handle on the same load
pub type LoadCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A model file that could not be loaded.
/// Cloneable so every handle sharing the load sees the same failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to load asset {path:?}: {cause:#}")]
pub struct AssetLoadError {
    path: PathBuf,
    #[source]
    cause: LoadCause,
}

impl AssetLoadError {
    pub fn new(path: impl Into<PathBuf>, cause: anyhow::Error) -> Self {
        let cause: Box<dyn std::error::Error + Send + Sync + 'static> = cause.into();
        Self {
            path: path.into(),
            cause: Arc::from(cause),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Load status as observed from the frame callback
#[derive(Debug, Clone)]
pub enum LoadState {
    Pending,
    Ready(Arc<SceneAsset>),
    Failed(AssetLoadError),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }
}

/// A reference to a (possibly still running) load of one model file
#[derive(Clone)]
pub struct AssetHandle {
    path: PathBuf,
    load: SharedLoad,
}

impl AssetHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check, safe to call once per frame
    pub fn poll(&self) -> LoadState {
        match self.load.clone().now_or_never() {
            None => LoadState::Pending,
            Some(Ok(asset)) => LoadState::Ready(asset),
            Some(Err(err)) => LoadState::Failed(err),
        }
    }

    /// Resolve the load. Never call this from the frame callback.
    pub async fn wait(&self) -> LoadResult {
        self.load.clone().await
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("path", &self.path)
            .field("state", &self.poll())
            .finish()
    }
}

/// Process-wide model cache keyed by resource path.
///
/// The first request for a path starts a background load; every later
/// request shares it. Successful loads stay cached for the life of the
/// cache. A failed load is dropped once a later request observes it, so a
/// fresh mount may try the file again.
pub struct AssetCache {
    loader: Arc<dyn AssetLoader>,
    entries: Mutex<HashMap<PathBuf, SharedLoad>>,
}

static GLOBAL_CACHE: OnceLock<AssetCache> = OnceLock::new();

impl AssetCache {
    pub fn new(loader: impl AssetLoader) -> Self {
        Self {
            loader: Arc::new(loader),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The shared glTF cache used by the application
    pub fn global() -> &'static AssetCache {
        GLOBAL_CACHE.get_or_init(|| AssetCache::new(GltfLoader))
    }

    /// Get a handle on the load for `path`, starting it if needed
    pub fn request(&self, path: impl AsRef<Path>) -> AssetHandle {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries();

        if let Some(load) = entries.get(&path) {
            if !matches!(load.peek(), Some(Err(_))) {
                return AssetHandle {
                    path,
                    load: load.clone(),
                };
            }
            log::info!("Retrying previously failed asset {:?}", path);
        }

        let load = self.spawn_load(path.clone());
        entries.insert(path.clone(), load.clone());
        AssetHandle { path, load }
    }

    /// Start loading `path` without waiting on it
    pub fn preload(&self, path: impl AsRef<Path>) {
        let handle = self.request(path);
        log::debug!("Preloading {:?}", handle.path());
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries().contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, SharedLoad>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_load(&self, path: PathBuf) -> SharedLoad {
        let (sender, receiver) = oneshot::channel();
        let loader = Arc::clone(&self.loader);
        let thread_path = path.clone();

        let spawned = std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                let result = loader
                    .load(&thread_path)
                    .map(Arc::new)
                    .map_err(|e| AssetLoadError::new(&thread_path, e));
                // The receiver is gone only if every handle was dropped
                let _ = sender.send(result);
            });

        if let Err(e) = spawned {
            let err = AssetLoadError::new(
                &path,
                anyhow::Error::new(e).context("Failed to start loader thread"),
            );
            return future::ready(Err(err)).boxed().shared();
        }

        receiver
            .map(move |received| match received {
                Ok(result) => result,
                Err(oneshot::Canceled) => Err(AssetLoadError::new(
                    &path,
                    anyhow::anyhow!("loader thread exited before finishing"),
                )),
            })
            .boxed()
            .shared()
    }
}
