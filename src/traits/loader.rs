use std::path::Path;

use crate::loaders::SceneAsset;

/// Decodes a packaged model file into a `SceneAsset`.
/// Runs on a background thread, never inside the frame callback.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, path: &Path) -> anyhow::Result<SceneAsset>;
}
