//! Fixed-capacity struct-of-arrays storage shared by every pipeline stage.
//!
//! One [`Buffers`] instance is allocated by the caller and reused across
//! generation calls: [`Buffers::clear`] resets counters and flag bitsets
//! without deallocating. Three index spaces exist:
//!
//! - `vertex index`: deduplicated vertices (`0..vert_count`)
//! - `face index`: quads (`0..face_count`)
//! - `face-vertex index`: `face_index * 4 + corner` for per-corner data
//!
//! Every face has exactly 4 corners and exactly one material. Exceeding the
//! construction-time capacity is a fatal [`MeshError`], never a truncation.

use glam::{Vec2, Vec3};

use crate::error::MeshError;

/// Maximum adjacency links per vertex.
pub const MAX_LINKS: usize = 6;

/// Fixed-width bitset with one bit per arena slot.
#[derive(Clone, Debug)]
pub struct BitSet {
  words: Vec<u64>,
}

impl BitSet {
  pub fn new(bits: usize) -> Self {
    Self {
      words: vec![0; bits.div_ceil(64)],
    }
  }

  #[inline]
  pub fn get(&self, i: usize) -> bool {
    self.words[i / 64] & (1 << (i % 64)) != 0
  }

  #[inline]
  pub fn set(&mut self, i: usize) {
    self.words[i / 64] |= 1 << (i % 64);
  }

  #[inline]
  pub fn unset(&mut self, i: usize) {
    self.words[i / 64] &= !(1 << (i % 64));
  }

  #[inline]
  pub fn assign(&mut self, i: usize, value: bool) {
    if value {
      self.set(i);
    } else {
      self.unset(i);
    }
  }

  /// Zero every bit, keeping the allocation.
  pub fn clear(&mut self) {
    self.words.fill(0);
  }
}

/// Reusable generation arena.
pub struct Buffers {
  max_verts: usize,
  max_faces: usize,
  /// Vertices emitted so far this generation.
  pub vert_count: usize,
  /// Faces emitted so far this generation.
  pub face_count: usize,

  // --- per vertex ---------------------------------------------------------
  pub positions: Vec<Vec3>,
  /// Iso-distance shell value from shape projection (equidistance test).
  pub rings: Vec<f32>,
  /// Accumulated (then normalized) smooth normal.
  pub smooth_normals: Vec<Vec3>,
  /// Accumulated (then normalized) smooth-unless-constrained normal.
  pub both_normals: Vec<Vec3>,
  pub deform_count: Vec<u32>,
  pub deform_strength: Vec<f32>,
  pub deform_damping: Vec<f32>,
  pub has_deform: BitSet,
  pub warp_amplitude: Vec<f32>,
  pub warp_frequency: Vec<f32>,
  pub has_warp: BitSet,
  pub scatter: Vec<f32>,
  pub has_scatter: BitSet,
  pub links: Vec<[u32; MAX_LINKS]>,
  pub link_counts: Vec<u8>,
  /// Running color sum for fade averaging.
  pub color_sums: Vec<Vec3>,
  pub color_counts: Vec<u8>,
  /// Per-axis flatten flags (movement pinned on that axis).
  pub vert_flatten: [BitSet; 3],
  /// Per-axis clamp flags.
  pub vert_clamp: [BitSet; 3],

  // --- per face ------------------------------------------------------------
  pub face_materials: Vec<u16>,
  /// Face direction id (0..6: -x,+x,-y,+y,-z,+z).
  pub face_dirs: Vec<u8>,
  /// Owning voxel cell of the face.
  pub face_cells: Vec<[u16; 3]>,
  pub face_flattened: BitSet,
  pub face_clamped: BitSet,
  pub face_smooth: BitSet,
  pub face_equidistant: BitSet,
  pub face_culled: BitSet,

  // --- per face-vertex (face * 4 + corner) ----------------------------------
  pub face_vert_indices: Vec<u32>,
  /// Raw flat normal per corner.
  pub face_vert_normals: Vec<Vec3>,
  pub face_vert_smooth_normals: Vec<Vec3>,
  pub face_vert_both_normals: Vec<Vec3>,
  /// Normal selected by the material's lighting mode.
  pub face_vert_final_normals: Vec<Vec3>,
  pub face_vert_colors: Vec<Vec3>,
  pub face_vert_uvs: Vec<Vec2>,
  pub face_vert_lights: Vec<Vec3>,
  pub face_vert_ao: Vec<f32>,
}

impl Buffers {
  /// Allocate an arena holding up to `max_verts` vertices (and face corners)
  /// and `max_verts / 4` faces.
  pub fn new(max_verts: usize) -> Self {
    let max_faces = max_verts / 4;
    Self {
      max_verts,
      max_faces,
      vert_count: 0,
      face_count: 0,
      positions: vec![Vec3::ZERO; max_verts],
      rings: vec![0.0; max_verts],
      smooth_normals: vec![Vec3::ZERO; max_verts],
      both_normals: vec![Vec3::ZERO; max_verts],
      deform_count: vec![0; max_verts],
      deform_strength: vec![0.0; max_verts],
      deform_damping: vec![0.0; max_verts],
      has_deform: BitSet::new(max_verts),
      warp_amplitude: vec![0.0; max_verts],
      warp_frequency: vec![0.0; max_verts],
      has_warp: BitSet::new(max_verts),
      scatter: vec![0.0; max_verts],
      has_scatter: BitSet::new(max_verts),
      links: vec![[0; MAX_LINKS]; max_verts],
      link_counts: vec![0; max_verts],
      color_sums: vec![Vec3::ZERO; max_verts],
      color_counts: vec![0; max_verts],
      vert_flatten: [
        BitSet::new(max_verts),
        BitSet::new(max_verts),
        BitSet::new(max_verts),
      ],
      vert_clamp: [
        BitSet::new(max_verts),
        BitSet::new(max_verts),
        BitSet::new(max_verts),
      ],
      face_materials: vec![0; max_faces],
      face_dirs: vec![0; max_faces],
      face_cells: vec![[0; 3]; max_faces],
      face_flattened: BitSet::new(max_faces),
      face_clamped: BitSet::new(max_faces),
      face_smooth: BitSet::new(max_faces),
      face_equidistant: BitSet::new(max_faces),
      face_culled: BitSet::new(max_faces),
      face_vert_indices: vec![0; max_verts],
      face_vert_normals: vec![Vec3::ZERO; max_verts],
      face_vert_smooth_normals: vec![Vec3::ZERO; max_verts],
      face_vert_both_normals: vec![Vec3::ZERO; max_verts],
      face_vert_final_normals: vec![Vec3::ZERO; max_verts],
      face_vert_colors: vec![Vec3::ZERO; max_verts],
      face_vert_uvs: vec![Vec2::ZERO; max_verts],
      face_vert_lights: vec![Vec3::ONE; max_verts],
      face_vert_ao: vec![0.0; max_verts],
    }
  }

  /// Vertex capacity.
  pub fn max_verts(&self) -> usize {
    self.max_verts
  }

  /// Face capacity.
  pub fn max_faces(&self) -> usize {
    self.max_faces
  }

  /// Reset counters and flag bitsets without deallocating.
  ///
  /// Scalar arrays are overwritten on use and are deliberately left as-is;
  /// only state that is read before being written must be zeroed here.
  pub fn clear(&mut self) {
    self.vert_count = 0;
    self.face_count = 0;
    self.has_deform.clear();
    self.has_warp.clear();
    self.has_scatter.clear();
    for axis in 0..3 {
      self.vert_flatten[axis].clear();
      self.vert_clamp[axis].clear();
    }
    self.face_flattened.clear();
    self.face_clamped.clear();
    self.face_smooth.clear();
    self.face_equidistant.clear();
    self.face_culled.clear();
  }

  /// Claim the next vertex slot, zeroing its accumulators.
  pub fn add_vertex(&mut self, position: Vec3) -> Result<u32, MeshError> {
    if self.vert_count >= self.max_verts {
      return Err(MeshError::VertexCapacity {
        needed: self.vert_count + 1,
        capacity: self.max_verts,
      });
    }
    let v = self.vert_count;
    self.positions[v] = position;
    self.rings[v] = 0.0;
    self.smooth_normals[v] = Vec3::ZERO;
    self.both_normals[v] = Vec3::ZERO;
    self.deform_count[v] = 0;
    self.deform_strength[v] = 0.0;
    self.deform_damping[v] = 0.0;
    self.warp_amplitude[v] = 0.0;
    self.warp_frequency[v] = 0.0;
    self.scatter[v] = 0.0;
    self.link_counts[v] = 0;
    self.color_sums[v] = Vec3::ZERO;
    self.color_counts[v] = 0;
    self.vert_count += 1;
    Ok(v as u32)
  }

  /// Claim the next face slot.
  pub fn add_face(
    &mut self,
    material: u16,
    dir: u8,
    cell: [u16; 3],
    corners: [u32; 4],
  ) -> Result<usize, MeshError> {
    if self.face_count >= self.max_faces {
      return Err(MeshError::FaceCapacity {
        needed: self.face_count + 1,
        capacity: self.max_faces,
      });
    }
    let f = self.face_count;
    self.face_materials[f] = material;
    self.face_dirs[f] = dir;
    self.face_cells[f] = cell;
    for (corner, &v) in corners.iter().enumerate() {
      self.face_vert_indices[f * 4 + corner] = v;
    }
    self.face_count += 1;
    Ok(f)
  }

  /// Try to add an adjacency link, deduplicated, capped at [`MAX_LINKS`].
  pub fn add_link(&mut self, vertex: u32, neighbor: u32) {
    let v = vertex as usize;
    let n = self.link_counts[v] as usize;
    if self.links[v][..n].contains(&neighbor) {
      return;
    }
    if n < MAX_LINKS {
      self.links[v][n] = neighbor;
      self.link_counts[v] = (n + 1) as u8;
    }
  }

  /// Drop all links of a vertex.
  pub fn reset_links(&mut self, vertex: u32) {
    self.link_counts[vertex as usize] = 0;
  }
}

#[cfg(test)]
#[path = "buffers_test.rs"]
mod buffers_test;
