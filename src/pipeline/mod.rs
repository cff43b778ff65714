//! The mesh generation pipeline.
//!
//! A generation call runs the stages below in fixed order, every stage
//! mutating the caller's [`Buffers`] in place; no stage owns private copies:
//!
//! ```text
//! builder ─► linker ─► deformer ─► normals ─► transform ─► lights ─► ao
//!    ─► colors ─► uvs ─► simplify ─► align ─► pack ─► Mesh
//! ```
//!
//! The pipeline is single-threaded and synchronous: it runs to completion or
//! fails with a capacity error. Independent generation calls may run on
//! separate threads, each with its own [`MeshGenerator`] and [`Buffers`];
//! nothing is shared between instances.

pub mod align;
pub mod ao;
pub mod builder;
pub mod colors;
pub mod deformer;
pub mod lights;
pub mod linker;
pub mod normals;
pub mod pack;
pub mod simplify;
pub mod transform;
pub mod uvs;

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::buffers::Buffers;
use crate::error::MeshError;
use crate::model::Model;
use crate::types::Mesh;
use crate::voxels::VoxelSource;

/// Per-generation context computed by the builder and read by later stages.
#[derive(Clone, Copy, Debug)]
pub struct GenContext {
  /// Grid extent per axis.
  pub grid_size: [u32; 3],
  /// Minimum occupied cell per axis (inclusive).
  pub bounds_min: [i32; 3],
  /// Maximum occupied cell per axis (inclusive).
  pub bounds_max: [i32; 3],
  /// True when the grid held no voxels at all.
  pub empty: bool,
}

impl GenContext {
  /// Vertex-space coordinate of the negative boundary plane on `axis`.
  #[inline]
  pub fn plane_min(&self, axis: usize) -> f32 {
    self.bounds_min[axis] as f32
  }

  /// Vertex-space coordinate of the positive boundary plane on `axis`.
  #[inline]
  pub fn plane_max(&self, axis: usize) -> f32 {
    (self.bounds_max[axis] + 1) as f32
  }
}

/// Orchestrates the pipeline and owns all cross-stage scratch state.
///
/// The vertex dedup map and the AO memo are pipeline-scoped: they are cleared
/// at the entry of every generation call and never shared across concurrent
/// calls (each call site owns its generator).
pub struct MeshGenerator {
  vertex_map: HashMap<(i32, i32, i32), u32>,
  ao_memo: HashMap<[u32; 6], f32>,
  rng: SmallRng,
}

impl MeshGenerator {
  pub fn new() -> Self {
    Self {
      vertex_map: HashMap::new(),
      ao_memo: HashMap::new(),
      rng: SmallRng::from_os_rng(),
    }
  }

  /// Generator with a fixed scatter seed, for reproducible jitter.
  pub fn with_seed(seed: u64) -> Self {
    Self {
      vertex_map: HashMap::new(),
      ao_memo: HashMap::new(),
      rng: SmallRng::seed_from_u64(seed),
    }
  }

  /// Run the full pipeline over `grid` with `model`'s settings.
  ///
  /// `buffers` must not be in use by another in-flight call; it is cleared
  /// here and filled by the stages. Fails only on buffer capacity exhaustion.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "pipeline::generate")
  )]
  pub fn generate(
    &mut self,
    grid: &dyn VoxelSource,
    model: &Model,
    buffers: &mut Buffers,
  ) -> Result<Mesh, MeshError> {
    buffers.clear();
    self.vertex_map.clear();
    self.ao_memo.clear();

    let ctx = {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("build_faces").entered();
      builder::build(grid, model, buffers, &mut self.vertex_map)?
    };
    if ctx.empty {
      return Ok(Mesh::new());
    }

    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("link_vertices").entered();
      linker::link(buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("deform").entered();
      deformer::deform(model, &ctx, buffers, &mut self.rng);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("normals").entered();
      normals::calculate(model, &ctx, buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("transform").entered();
      transform::apply(model, &ctx, buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("lights").entered();
      lights::calculate(model, buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("ambient_occlusion").entered();
      ao::calculate(model, buffers, &mut self.ao_memo);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("combine_colors").entered();
      colors::combine(model, buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("assign_uvs").entered();
      uvs::assign(model, &ctx, buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("simplify").entered();
      simplify::simplify(model, buffers);
    }
    {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("align_faces").entered();
      align::align(model, buffers);
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("pack").entered();
    Ok(pack::pack(model, buffers))
  }
}

impl Default for MeshGenerator {
  fn default() -> Self {
    Self::new()
  }
}
