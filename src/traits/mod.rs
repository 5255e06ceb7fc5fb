pub mod camera;
pub mod loader;

pub use camera::*;
pub use loader::*;
