use anyhow::{ensure, Result};
use glam::Vec3;
use std::path::{Path, PathBuf};

use crate::math::AABB;
use crate::types::MeshVertex;

/// Triangle mesh flattened into asset space
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: Option<String>,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<AABB> {
        let positions: Vec<Vec3> = self
            .vertices
            .iter()
            .map(|vertex| Vec3::from_array(vertex.position))
            .collect();
        AABB::from_points(&positions)
    }
}

/// A loaded 3D model: meshes with baked node transforms and materials
#[derive(Debug, Clone)]
pub struct SceneAsset {
    source: PathBuf,
    meshes: Vec<MeshData>,
    bounds: AABB,
}

impl SceneAsset {
    /// Build an asset, rejecting files that carry no drawable triangles
    pub fn new(source: impl Into<PathBuf>, meshes: Vec<MeshData>) -> Result<Self> {
        let source = source.into();
        let meshes: Vec<MeshData> = meshes
            .into_iter()
            .filter(|mesh| mesh.triangle_count() > 0)
            .collect();
        ensure!(!meshes.is_empty(), "{:?} contains no triangle geometry", source);

        for mesh in &meshes {
            let vertex_count = mesh.vertices.len() as u32;
            ensure!(
                mesh.indices.iter().all(|&index| index < vertex_count),
                "mesh {:?} in {:?} indexes past its vertex buffer",
                mesh.name,
                source
            );
        }

        let bounds = meshes
            .iter()
            .filter_map(MeshData::bounds)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| anyhow::anyhow!("{:?} has no vertices", source))?;

        Ok(Self {
            source,
            meshes,
            bounds,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}
