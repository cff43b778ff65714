//! Normals calculator: per-corner flat normals plus angle-weighted smooth
//! and smooth-unless-constrained ("both") accumulation.

use glam::Vec3;

use super::GenContext;
use crate::buffers::Buffers;
use crate::material::Lighting;
use crate::model::Model;

pub fn calculate(model: &Model, ctx: &GenContext, buffers: &mut Buffers) {
  accumulate(model, ctx, buffers);

  for v in 0..buffers.vert_count {
    buffers.smooth_normals[v] = buffers.smooth_normals[v].normalize_or_zero();
    buffers.both_normals[v] = buffers.both_normals[v].normalize_or_zero();
  }

  select(model, buffers);
}

fn accumulate(model: &Model, ctx: &GenContext, buffers: &mut Buffers) {
  for face in 0..buffers.face_count {
    let smooth = buffers.face_equidistant.get(face)
      || (!buffers.face_flattened.get(face) && !buffers.face_clamped.get(face));
    if smooth {
      buffers.face_smooth.set(face);
    }

    let corners: [Vec3; 4] =
      std::array::from_fn(|i| buffers.positions[buffers.face_vert_indices[face * 4 + i] as usize]);
    let mid = (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25;

    for i in 0..4 {
      let v = buffers.face_vert_indices[face * 4 + i] as usize;
      let to_prev = corners[(i + 3) % 4] - corners[i];
      let to_mid = mid - corners[i];
      // Degenerate edges get a unit length instead of dividing by zero.
      let mut len_prev = to_prev.length();
      if len_prev == 0.0 {
        len_prev = 1.0;
      }
      let mut len_mid = to_mid.length();
      if len_mid == 0.0 {
        len_mid = 1.0;
      }
      let e_prev = to_prev / len_prev;
      let e_mid = to_mid / len_mid;

      let mut normal = e_prev.cross(e_mid).normalize_or_zero();
      zero_tiled_components(model, ctx, corners[i], &mut normal);

      let weight = e_prev.dot(e_mid).clamp(-1.0, 1.0).acos();
      buffers.face_vert_normals[face * 4 + i] = normal;
      buffers.smooth_normals[v] += normal * weight;
      if smooth {
        buffers.both_normals[v] += normal * weight;
      }
    }
  }
}

/// Normals on a tiled boundary lose their boundary-perpendicular component
/// so the seam shades identically on both repeats.
fn zero_tiled_components(model: &Model, ctx: &GenContext, position: Vec3, normal: &mut Vec3) {
  for axis in 0..3 {
    if (model.tile.neg[axis] && position[axis] == ctx.plane_min(axis))
      || (model.tile.pos[axis] && position[axis] == ctx.plane_max(axis))
    {
      normal[axis] = 0.0;
    }
  }
}

/// Pick the emitted normal per corner from the material's lighting mode.
/// "Both" shades smooth faces with the accumulated normal and constrained
/// (flattened or clamped) faces flat.
fn select(model: &Model, buffers: &mut Buffers) {
  for face in 0..buffers.face_count {
    let lighting = model.materials[buffers.face_materials[face] as usize].lighting;
    let smooth_face = buffers.face_smooth.get(face);
    for i in 0..4 {
      let fvi = face * 4 + i;
      let v = buffers.face_vert_indices[fvi] as usize;
      let flat = buffers.face_vert_normals[fvi];
      buffers.face_vert_smooth_normals[fvi] = buffers.smooth_normals[v];
      buffers.face_vert_both_normals[fvi] = buffers.both_normals[v];
      buffers.face_vert_final_normals[fvi] = match lighting {
        Lighting::Smooth => buffers.smooth_normals[v],
        Lighting::Both => {
          let both = buffers.both_normals[v];
          // A smooth face can still meet a vertex with no "both" sum when
          // tiling zeroed every contribution.
          if !smooth_face || both == Vec3::ZERO {
            flat
          } else {
            both
          }
        }
        Lighting::Flat | Lighting::Quad => flat,
      };
    }
  }
}

#[cfg(test)]
#[path = "normals_test.rs"]
mod normals_test;
