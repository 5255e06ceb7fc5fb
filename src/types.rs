use glam::{Mat4, Vec3};

/// Per-frame scene uniform: camera, lights and fog
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub fog_near: f32,
    pub fog_color: [f32; 3],
    pub fog_far: f32,
    pub ambient: [f32; 3],
    pub _pad0: f32,
    pub light_position: [f32; 3],
    pub _pad1: f32,
    pub light_color: [f32; 3],
    pub _pad2: f32,
    pub camera_right: [f32; 3],
    pub _pad3: f32,
    pub camera_up: [f32; 3],
    pub _pad4: f32,
}

/// Per-object uniform: transform plus material parameters
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x = point size in world units
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn mesh(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [1.0; 4],
            params: [0.0; 4],
        }
    }

    pub fn points(model: Mat4, color: [f32; 3], size: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], 1.0],
            params: [size, 0.0, 0.0, 0.0],
        }
    }
}

/// Model vertex in asset space, base colour baked in
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl MeshVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One particle, drawn as an instanced camera-facing quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    pub center: [f32; 3],
}

impl PointInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<Vec3> for PointInstance {
    fn from(center: Vec3) -> Self {
        Self {
            center: center.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        // std140-style: every vec3 is padded to 16 bytes
        assert_eq!(std::mem::size_of::<SceneUniform>(), 64 + 6 * 16);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64 + 16 + 16);
    }

    #[test]
    fn vertex_strides() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 40);
        assert_eq!(std::mem::size_of::<PointInstance>(), 12);
    }

    #[test]
    fn point_uniform_carries_size() {
        let uniform = ObjectUniform::points(Mat4::IDENTITY, [0.5, 1.0, 0.5], 0.05);
        assert_eq!(uniform.params[0], 0.05);
        assert_eq!(uniform.color[3], 1.0);
    }
}
