pub mod model_viewer;
pub mod particles;
pub mod viewport;

pub use model_viewer::{ModelPose, ModelViewer, ViewerPhase, ViewerTransition};
pub use particles::ParticleField;
pub use viewport::{FrameSnapshot, Overlay, ViewportEvent, ViewportHost};
