use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

use super::asset::{MeshData, SceneAsset};
use crate::traits::AssetLoader;
use crate::types::MeshVertex;

/// Loads `.gltf` / `.glb` files with the `gltf` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl AssetLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<SceneAsset> {
        load_gltf_asset(path)
    }
}

/// Loads a glTF file and flattens its default scene into meshes
pub fn load_gltf_asset(path: impl AsRef<Path>) -> Result<SceneAsset> {
    let path = path.as_ref();
    log::debug!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        ::gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF {:?}: {} scenes, {} nodes, {} meshes, {} materials",
        path,
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count()
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .with_context(|| format!("glTF file has no scenes: {:?}", path))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        process_node(&node, &buffers, &Mat4::IDENTITY, &mut meshes)?;
    }

    let asset = SceneAsset::new(path, meshes)?;
    log::info!(
        "Loaded {:?}: {} meshes, {} triangles",
        path,
        asset.meshes().len(),
        asset.triangle_count()
    );
    Ok(asset)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &::gltf::Node,
    buffers: &[::gltf::buffer::Data],
    parent_transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, meshes)?;
    }

    Ok(())
}

/// Processes a glTF mesh, one `MeshData` per triangle primitive
fn process_mesh(
    mesh: &::gltf::Mesh,
    buffers: &[::gltf::buffer::Data],
    transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != ::gltf::mesh::Mode::Triangles {
            log::debug!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .with_context(|| format!("Mesh {:?} primitive has no positions", mesh.name()))?
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect(),
            None => compute_vertex_normals(&positions, &indices),
        };

        // glTF colour factors are already linear
        let color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        let vertices = positions
            .iter()
            .zip(normals.iter().chain(std::iter::repeat(&Vec3::Y)))
            .map(|(&position, &normal)| MeshVertex::new(position, normal, color))
            .collect();

        meshes.push(MeshData {
            name: mesh.name().map(str::to_string),
            vertices,
            indices,
        });
    }

    Ok(())
}

/// Smooth normals from area-weighted face normals
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y
            } else {
                n
            }
        })
        .collect()
}
