#![allow(dead_code)]

use glam::Vec3;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use xylo_viewer::loaders::{MeshData, SceneAsset};
use xylo_viewer::traits::AssetLoader;
use xylo_viewer::types::MeshVertex;

pub fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn triangle_asset(path: &Path) -> anyhow::Result<SceneAsset> {
    let color = [1.0; 4];
    SceneAsset::new(
        path,
        vec![MeshData {
            name: Some("triangle".to_string()),
            vertices: vec![
                MeshVertex::new(Vec3::ZERO, Vec3::Z, color),
                MeshVertex::new(Vec3::X, Vec3::Z, color),
                MeshVertex::new(Vec3::Y, Vec3::Z, color),
            ],
            indices: vec![0, 1, 2],
        }],
    )
}

/// Loader that blocks until the test opens the gate.
/// Paths containing "missing" fail once released.
pub struct GatedLoader {
    gate: Mutex<Receiver<()>>,
    pub calls: Arc<AtomicUsize>,
}

impl GatedLoader {
    pub fn new() -> (Self, Sender<()>, Arc<AtomicUsize>) {
        let (sender, receiver) = mpsc::channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = Self {
            gate: Mutex::new(receiver),
            calls: calls.clone(),
        };
        (loader, sender, calls)
    }
}

impl AssetLoader for GatedLoader {
    fn load(&self, path: &Path) -> anyhow::Result<SceneAsset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .gate
            .lock()
            .map_err(|_| anyhow::anyhow!("gate poisoned"))?;
        gate.recv_timeout(Duration::from_secs(10))?;
        if path.to_string_lossy().contains("missing") {
            anyhow::bail!("no such file: {:?}", path);
        }
        triangle_asset(path)
    }
}

/// Loader that resolves immediately
pub struct InstantLoader;

impl AssetLoader for InstantLoader {
    fn load(&self, path: &Path) -> anyhow::Result<SceneAsset> {
        if path.to_string_lossy().contains("missing") {
            anyhow::bail!("no such file: {:?}", path);
        }
        triangle_asset(path)
    }
}
