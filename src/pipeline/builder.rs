//! Face/vertex builder: scans the voxel grid and emits visible quads.
//!
//! Vertex identity is an exact integer key over the corner's grid
//! coordinates, so corners shared between adjacent faces resolve to one
//! vertex index regardless of float rounding. When several materials claim
//! the same vertex, deform/warp/scatter parameters are arbitrated by a
//! least-total-displacement-wins policy; exact ties keep the first-written
//! value.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use super::GenContext;
use crate::buffers::Buffers;
use crate::error::MeshError;
use crate::material::Material;
use crate::model::Model;
use crate::planar::Planar;
use crate::voxels::{material_of, rgb_of, VoxelSource};

/// Face direction ids: -x, +x, -y, +y, -z, +z.
pub const DIR_NX: u8 = 0;
pub const DIR_PX: u8 = 1;
pub const DIR_NY: u8 = 2;
pub const DIR_PY: u8 = 3;
pub const DIR_NZ: u8 = 4;
pub const DIR_PZ: u8 = 5;

/// Neighbor cell offset per direction.
pub const DIR_OFFSETS: [[i32; 3]; 6] = [
  [-1, 0, 0],
  [1, 0, 0],
  [0, -1, 0],
  [0, 1, 0],
  [0, 0, -1],
  [0, 0, 1],
];

/// Axis of each direction.
pub const DIR_AXIS: [usize; 6] = [0, 0, 1, 1, 2, 2];

/// True for the positive direction of each axis.
pub const DIR_POSITIVE: [bool; 6] = [false, true, false, true, false, true];

/// Unit-cube corner offsets per direction, ordered clockwise viewed from
/// outside so the packer's `(2,1,0)`/`(0,3,2)` triangles are front-facing.
pub const FACE_CORNERS: [[[u32; 3]; 4]; 6] = [
  // -x
  [[0, 0, 0], [0, 1, 0], [0, 1, 1], [0, 0, 1]],
  // +x
  [[1, 0, 1], [1, 1, 1], [1, 1, 0], [1, 0, 0]],
  // -y
  [[0, 0, 0], [0, 0, 1], [1, 0, 1], [1, 0, 0]],
  // +y
  [[0, 1, 0], [1, 1, 0], [1, 1, 1], [0, 1, 1]],
  // -z
  [[0, 1, 0], [0, 0, 0], [1, 0, 0], [1, 1, 0]],
  // +z
  [[0, 1, 1], [1, 1, 1], [1, 0, 1], [0, 0, 1]],
];

/// Scan the grid and emit all visible faces into `buffers`.
pub fn build(
  grid: &dyn VoxelSource,
  model: &Model,
  buffers: &mut Buffers,
  vertex_map: &mut HashMap<(i32, i32, i32), u32>,
) -> Result<GenContext, MeshError> {
  let size = grid.size();
  let ctx = scan_bounds(grid);
  if ctx.empty {
    return Ok(ctx);
  }

  for x in 0..size[0] as i32 {
    for y in 0..size[1] as i32 {
      for z in 0..size[2] as i32 {
        let palette = grid.palette_index_at(x, y, z);
        if palette == 0 {
          continue;
        }
        let color = grid.color_for_palette_index(palette);
        let mat_index = material_of(color);
        let material = &model.materials[mat_index];
        if material.opacity == 0.0 {
          continue;
        }
        let rgb = rgb_of(color);

        for dir in 0..6u8 {
          if covered_by_neighbor(grid, model, [x, y, z], dir) {
            continue;
          }
          let skip = material.skip.or(&model.skip);
          if face_on_skip_plane(&skip, &ctx, [x, y, z], dir) {
            continue;
          }
          emit_face(
            model, material, mat_index, &ctx, buffers, vertex_map, [x, y, z], dir, rgb,
          )?;
        }
      }
    }
  }

  Ok(ctx)
}

/// Occupied-cell bounds of the grid.
fn scan_bounds(grid: &dyn VoxelSource) -> GenContext {
  let size = grid.size();
  let mut min = [i32::MAX; 3];
  let mut max = [i32::MIN; 3];
  let mut empty = true;
  for x in 0..size[0] as i32 {
    for y in 0..size[1] as i32 {
      for z in 0..size[2] as i32 {
        if grid.palette_index_at(x, y, z) == 0 {
          continue;
        }
        empty = false;
        let cell = [x, y, z];
        for axis in 0..3 {
          min[axis] = min[axis].min(cell[axis]);
          max[axis] = max[axis].max(cell[axis]);
        }
      }
    }
  }
  GenContext {
    grid_size: size,
    bounds_min: min,
    bounds_max: max,
    empty,
  }
}

/// A face is hidden when its neighbor is opaque and not see-through.
fn covered_by_neighbor(grid: &dyn VoxelSource, model: &Model, cell: [i32; 3], dir: u8) -> bool {
  if model.wireframe {
    return false;
  }
  let offset = DIR_OFFSETS[dir as usize];
  let neighbor = grid.palette_index_at(cell[0] + offset[0], cell[1] + offset[1], cell[2] + offset[2]);
  if neighbor == 0 {
    return false;
  }
  let color = grid.color_for_palette_index(neighbor);
  let material = &model.materials[material_of(color)];
  !material.is_see_through()
}

/// Skip planes omit faces lying on a flagged boundary plane.
fn face_on_skip_plane(skip: &Planar, ctx: &GenContext, cell: [i32; 3], dir: u8) -> bool {
  let axis = DIR_AXIS[dir as usize];
  if DIR_POSITIVE[dir as usize] {
    skip.pos[axis] && cell[axis] == ctx.bounds_max[axis]
  } else {
    skip.neg[axis] && cell[axis] == ctx.bounds_min[axis]
  }
}

#[allow(clippy::too_many_arguments)]
fn emit_face(
  model: &Model,
  material: &Material,
  mat_index: usize,
  ctx: &GenContext,
  buffers: &mut Buffers,
  vertex_map: &mut HashMap<(i32, i32, i32), u32>,
  cell: [i32; 3],
  dir: u8,
  rgb: Vec3,
) -> Result<(), MeshError> {
  let flatten = material.flatten.or(&model.flatten);
  let clamp = material.clamp.or(&model.clamp);

  let mut corners = [0u32; 4];
  let mut corner_coords = [[0i32; 3]; 4];
  for (i, offset) in FACE_CORNERS[dir as usize].iter().enumerate() {
    let coords = [
      cell[0] + offset[0] as i32,
      cell[1] + offset[1] as i32,
      cell[2] + offset[2] as i32,
    ];
    corner_coords[i] = coords;
    let key = (coords[0], coords[1], coords[2]);
    let vertex = match vertex_map.get(&key) {
      Some(&v) => v,
      None => {
        let v = buffers.add_vertex(Vec3::new(
          coords[0] as f32,
          coords[1] as f32,
          coords[2] as f32,
        ))?;
        vertex_map.insert(key, v);
        v
      }
    };
    corners[i] = vertex;

    arbitrate_params(material, buffers, vertex);
    apply_planar_flags(&flatten, &clamp, ctx, buffers, vertex, coords);
    if material.fade {
      let v = vertex as usize;
      buffers.color_sums[v] += rgb;
      buffers.color_counts[v] = buffers.color_counts[v].saturating_add(1);
    }
  }

  let face = buffers.add_face(
    mat_index as u16,
    dir,
    [cell[0] as u16, cell[1] as u16, cell[2] as u16],
    corners,
  )?;

  if face_in_planes(&flatten, ctx, &corner_coords) {
    buffers.face_flattened.set(face);
  }
  if face_in_planes(&clamp, ctx, &corner_coords) {
    buffers.face_clamped.set(face);
  }

  let (u_axis, v_axis) = super::uvs::UV_AXES[dir as usize];
  for (i, offset) in FACE_CORNERS[dir as usize].iter().enumerate() {
    let fvi = face * 4 + i;
    buffers.face_vert_colors[fvi] = rgb;
    // Placeholder UV: owning cell coordinate plus an unambiguous quarter-point
    // marking which side of the cell the corner sits on. The UV assigner
    // turns these into final, nudged texture coordinates.
    buffers.face_vert_uvs[fvi] = Vec2::new(
      cell[u_axis] as f32 + if offset[u_axis] == 1 { 0.75 } else { 0.25 },
      cell[v_axis] as f32 + if offset[v_axis] == 1 { 0.75 } else { 0.25 },
    );
    buffers.face_vert_ao[fvi] = 0.0;
    buffers.face_vert_lights[fvi] = Vec3::ONE;
  }

  Ok(())
}

/// Least-total-displacement-wins arbitration for shared vertices.
///
/// Materials without a parameter propose zero displacement, so a vertex on
/// the seam between a deformed and a rigid material stays put. Strict `<`
/// keeps the first-written value on exact ties.
fn arbitrate_params(material: &Material, buffers: &mut Buffers, vertex: u32) {
  let v = vertex as usize;

  let (count, strength, damping, total) = match &material.deform {
    Some(d) => (d.count, d.strength, d.damping, d.total_displacement()),
    None => (0, 0.0, 0.0, 0.0),
  };
  if !buffers.has_deform.get(v) {
    buffers.has_deform.set(v);
    buffers.deform_count[v] = count;
    buffers.deform_strength[v] = strength;
    buffers.deform_damping[v] = damping;
  } else {
    let stored = crate::material::Deform::new(
      buffers.deform_count[v],
      buffers.deform_strength[v],
      buffers.deform_damping[v],
    )
    .total_displacement();
    if total < stored {
      buffers.deform_count[v] = count;
      buffers.deform_strength[v] = strength;
      buffers.deform_damping[v] = damping;
    }
  }

  let (amplitude, frequency) = match &material.warp {
    Some(w) => (w.amplitude, w.frequency),
    None => (0.0, 0.0),
  };
  if !buffers.has_warp.get(v) {
    buffers.has_warp.set(v);
    buffers.warp_amplitude[v] = amplitude;
    buffers.warp_frequency[v] = frequency;
  } else {
    let stored_amp = buffers.warp_amplitude[v];
    let stored_freq = buffers.warp_frequency[v];
    // Lower amplitude wins; on equal amplitude the higher frequency loses.
    if amplitude < stored_amp || (amplitude == stored_amp && frequency < stored_freq) {
      buffers.warp_amplitude[v] = amplitude;
      buffers.warp_frequency[v] = frequency;
    }
  }

  if !buffers.has_scatter.get(v) {
    buffers.has_scatter.set(v);
    buffers.scatter[v] = material.scatter;
  } else if material.scatter < buffers.scatter[v] {
    buffers.scatter[v] = material.scatter;
  }
}

/// OR per-axis flatten/clamp flags into a vertex lying on flagged planes.
fn apply_planar_flags(
  flatten: &Planar,
  clamp: &Planar,
  ctx: &GenContext,
  buffers: &mut Buffers,
  vertex: u32,
  coords: [i32; 3],
) {
  let v = vertex as usize;
  for axis in 0..3 {
    let on_min = coords[axis] == ctx.bounds_min[axis];
    let on_max = coords[axis] == ctx.bounds_max[axis] + 1;
    if (flatten.neg[axis] && on_min) || (flatten.pos[axis] && on_max) {
      buffers.vert_flatten[axis].set(v);
    }
    if (clamp.neg[axis] && on_min) || (clamp.pos[axis] && on_max) {
      buffers.vert_clamp[axis].set(v);
    }
  }
}

/// True when all 4 corners lie in one flagged boundary plane.
fn face_in_planes(planar: &Planar, ctx: &GenContext, corners: &[[i32; 3]; 4]) -> bool {
  for axis in 0..3 {
    if planar.neg[axis] && corners.iter().all(|c| c[axis] == ctx.bounds_min[axis]) {
      return true;
    }
    if planar.pos[axis] && corners.iter().all(|c| c[axis] == ctx.bounds_max[axis] + 1) {
      return true;
    }
  }
  false
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
