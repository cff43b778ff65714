//! voxel_mesher - Palette-indexed voxel grids to indexed triangle meshes.
//!
//! The crate turns a voxel grid plus an ordered material list into an indexed
//! triangle mesh with positions, normals, vertex colors, UVs and per-material
//! draw groups. Beyond plain face extraction, the pipeline supports:
//!
//! - **Shape projection & relaxation**: spheres/cylinders and per-material
//!   iterative smoothing with damping
//! - **Noise warp & scatter**: organic surface displacement
//! - **Lighting & ambient occlusion**: baked into vertex colors, AO raycast
//!   against an octree of the mesh itself
//! - **Quad simplification**: greedy merging of contiguous coplanar faces
//!
//! # Example
//!
//! ```ignore
//! use voxel_mesher::{Buffers, Material, MeshGenerator, Model, VoxelGrid};
//!
//! let mut grid = VoxelGrid::new([8, 8, 8]);
//! grid.set_palette(1, voxel_mesher::pack_color(0, 200, 120, 40));
//! grid.set(4, 4, 4, 1);
//!
//! let model = Model::new(vec![Material::new()]);
//! let mut buffers = Buffers::new(64 * 1024);
//! let mut generator = MeshGenerator::new();
//! let mesh = generator.generate(&grid, &model, &mut buffers)?;
//!
//! println!("{} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
//! # Ok::<(), voxel_mesher::MeshError>(())
//! ```

pub mod buffers;
pub mod error;
pub mod material;
pub mod model;
pub mod noise;
pub mod octree;
pub mod pipeline;
pub mod planar;
pub mod types;
pub mod voxels;

// Re-export the items a typical caller needs
pub use buffers::Buffers;
pub use error::MeshError;
pub use material::{
  AoSettings, DataChannel, Deform, Lighting, MapSettings, Material, RenderSide, Warp,
};
pub use model::{Light, Model, ResizeMode, Shape};
pub use pipeline::MeshGenerator;
pub use planar::Planar;
pub use types::{DrawGroup, MaterialDescriptor, Mesh, VertexChannel};
pub use voxels::{material_of, pack_color, rgb_of, VoxelGrid, VoxelSource};
