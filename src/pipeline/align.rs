//! Face aligner: rotates quad corner order to pick a safe, deterministic
//! triangulation diagonal.

use glam::Vec3;

use crate::buffers::Buffers;
use crate::model::Model;

pub fn align(model: &Model, buffers: &mut Buffers) {
  let threshold = (0.1 * model.scale.min_element()).powi(2);

  for face in 0..buffers.face_count {
    if buffers.face_culled.get(face) {
      continue;
    }
    let p: [Vec3; 4] =
      std::array::from_fn(|i| buffers.positions[buffers.face_vert_indices[face * 4 + i] as usize]);

    // Deformation can push an off-diagonal corner onto the 0-2 diagonal,
    // which makes the default (2,1,0)/(0,3,2) split produce a sliver or a
    // concave fold. Rotating by one switches the split to the 1-3 diagonal.
    let mid = (p[0] + p[2]) * 0.5;
    if p[1].distance_squared(mid) < threshold || p[3].distance_squared(mid) < threshold {
      rotate_corners(buffers, face, 1);
      continue;
    }

    // Deterministic orientation: corner 0 gets the smallest manhattan
    // magnitude, so symmetric models triangulate symmetrically.
    let mut best = 0;
    let mut best_sum = f32::INFINITY;
    for (i, corner) in p.iter().enumerate() {
      let sum = corner.x.abs() + corner.y.abs() + corner.z.abs();
      if sum < best_sum {
        best_sum = sum;
        best = i;
      }
    }
    if best != 0 {
      rotate_corners(buffers, face, best);
    }
  }
}

/// Cyclically shift a face's per-corner data left by `by` slots.
fn rotate_corners(buffers: &mut Buffers, face: usize, by: usize) {
  let base = face * 4;
  buffers.face_vert_indices[base..base + 4].rotate_left(by);
  buffers.face_vert_uvs[base..base + 4].rotate_left(by);
  buffers.face_vert_normals[base..base + 4].rotate_left(by);
  buffers.face_vert_smooth_normals[base..base + 4].rotate_left(by);
  buffers.face_vert_both_normals[base..base + 4].rotate_left(by);
  buffers.face_vert_final_normals[base..base + 4].rotate_left(by);
  buffers.face_vert_colors[base..base + 4].rotate_left(by);
  buffers.face_vert_lights[base..base + 4].rotate_left(by);
  buffers.face_vert_ao[base..base + 4].rotate_left(by);
}

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;
