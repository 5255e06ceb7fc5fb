use glam::{Mat4, Vec3};

/// Camera abstraction consumed by the renderer
pub trait CameraController {
    /// World-to-view transform
    fn view_matrix(&self) -> Mat4;

    /// View-to-clip transform (depth in [0, 1])
    fn projection_matrix(&self) -> Mat4;

    /// Camera position in world space
    fn position(&self) -> Vec3;

    fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera right and up vectors in world space, for billboards
    fn billboard_axes(&self) -> (Vec3, Vec3) {
        let view = self.view_matrix();
        let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);
        (right, up)
    }
}
