//! UV assigner: turns the builder's placeholder UVs into final 0..1
//! texture coordinates, with optional cube-layout atlas packing.

use glam::Vec2;

use super::GenContext;
use crate::buffers::Buffers;
use crate::model::Model;

/// In-face texture axes (u, v) per face direction.
pub const UV_AXES: [(usize, usize); 6] = [(2, 1), (2, 1), (0, 2), (0, 2), (0, 1), (0, 1)];

/// Per-direction (flip u, flip v) so opposite faces read left-to-right
/// instead of mirrored.
const UV_FLIPS: [(bool, bool); 6] = [
  (false, false),
  (true, false),
  (false, false),
  (false, true),
  (true, false),
  (false, false),
];

/// Cube-layout atlas offset per face direction: a 4x2 grid of tiles, the
/// bottom row holding -x +x -y +y and the top row -z +z.
const CUBE_OFFSETS: [(f32, f32); 6] = [
  (0.0, 0.0),
  (0.25, 0.0),
  (0.5, 0.0),
  (0.75, 0.0),
  (0.0, 0.5),
  (0.25, 0.5),
];

/// Corner UVs are pushed this far inside their cell to keep bilinear
/// filtering from bleeding across texel seams.
const NUDGE: f32 = 0.0001;

pub fn assign(model: &Model, ctx: &GenContext, buffers: &mut Buffers) {
  let max_dim = ctx.grid_size.iter().copied().max().unwrap_or(1).max(1) as f32;
  let auto_scale = 1.0 / max_dim;

  for face in 0..buffers.face_count {
    let material = &model.materials[buffers.face_materials[face] as usize];
    let dir = buffers.face_dirs[face] as usize;

    let map = material.map.unwrap_or_default();
    let mut u_scale = map.u_scale.unwrap_or(auto_scale);
    let mut v_scale = map.v_scale.unwrap_or(auto_scale);
    let mut offset = (0.0, 0.0);
    if map.cube {
      u_scale *= 0.25;
      v_scale *= 0.5;
      offset = CUBE_OFFSETS[dir];
    }

    let (u_axis, v_axis) = UV_AXES[dir];
    let (flip_u, flip_v) = UV_FLIPS[dir];
    let u_extent = ctx.grid_size[u_axis] as f32;
    let v_extent = ctx.grid_size[v_axis] as f32;

    for i in 0..4 {
      let fvi = face * 4 + i;
      let placeholder = buffers.face_vert_uvs[fvi];
      let u = finalize(placeholder.x, flip_u, u_extent) * u_scale + offset.0;
      let v = finalize(placeholder.y, flip_v, v_extent) * v_scale + offset.1;
      buffers.face_vert_uvs[fvi] = Vec2::new(u, v);
    }
  }
}

/// Decode a placeholder coordinate (`cell + 0.25|0.75`) into a nudged,
/// optionally direction-flipped grid coordinate.
fn finalize(placeholder: f32, flip: bool, extent: f32) -> f32 {
  let cell = placeholder.floor();
  let nudged = if placeholder - cell < 0.5 {
    NUDGE
  } else {
    1.0 - NUDGE
  };
  let coord = cell + nudged;
  if flip {
    extent - coord
  } else {
    coord
  }
}

#[cfg(test)]
#[path = "uvs_test.rs"]
mod uvs_test;
