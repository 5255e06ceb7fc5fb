mod aabb;
mod angle;
mod color;

pub use aabb::AABB;
pub use angle::{wrap_angle, TAU};
pub use color::Rgb;
