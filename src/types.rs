//! Output mesh contract handed to the renderer-adapter layer.

use crate::material::{Lighting, RenderSide};

/// Render parameters of one base-material group, value-extracted from the
/// materials that share it.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDescriptor {
  pub side: RenderSide,
  pub lighting: Lighting,
  pub opacity: f32,
  pub transparent: bool,
  pub wireframe: bool,
}

/// Contiguous index range drawn with one base material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawGroup {
  /// First index into [`Mesh::indices`].
  pub start: u32,
  /// Number of indices in the group.
  pub count: u32,
  /// Index into [`Mesh::materials`].
  pub material_index: u32,
}

/// A named auxiliary per-vertex attribute stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexChannel {
  pub name: String,
  /// Components per vertex.
  pub width: usize,
  /// `width` floats per packed vertex.
  pub values: Vec<f32>,
}

/// Final indexed triangle mesh.
///
/// Attribute arrays are flat and parallel: 3 floats per vertex for positions,
/// normals and colors, 2 for UVs. Indices reference packed (deduplicated)
/// vertices; draw groups partition the index buffer per base material.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
  pub materials: Vec<MaterialDescriptor>,
  pub groups: Vec<DrawGroup>,
  pub indices: Vec<u32>,
  pub positions: Vec<f32>,
  pub normals: Vec<f32>,
  pub colors: Vec<f32>,
  pub uvs: Vec<f32>,
  /// Optional named auxiliary channels, parallel to the packed vertices.
  pub channels: Vec<VertexChannel>,
}

impl Mesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of packed vertices.
  pub fn vertex_count(&self) -> usize {
    self.positions.len() / 3
  }

  /// Number of triangles.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }
}
