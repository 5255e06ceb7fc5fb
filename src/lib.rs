pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod frame;
pub mod loaders;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod traits;
pub mod types;

pub use config::ViewerConfig;
pub use loaders::{AssetCache, SceneAsset};
pub use scene::{ModelViewer, ParticleField, ViewportHost};
