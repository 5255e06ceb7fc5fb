pub mod clock;
pub mod input_adapter;
pub mod orbit;
pub mod timer;

pub use clock::Clock;
pub use input_adapter::WinitInputAdapter;
pub use orbit::{ControlState, DragMode, OrbitControls, OrbitInput, PointerButton};
pub use timer::{FixedHz, FpsCounter};
