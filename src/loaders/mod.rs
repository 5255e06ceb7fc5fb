pub mod asset;
pub mod cache;
pub mod gltf;

pub use self::asset::{MeshData, SceneAsset};
pub use self::cache::{AssetCache, AssetHandle, AssetLoadError, LoadCause, LoadResult, LoadState};
pub use self::gltf::{load_gltf_asset, GltfLoader};
