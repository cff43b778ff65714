//! Simplifier: merges runs of contiguous coplanar quads into longer quads.
//!
//! Three sweep passes, one per axis. Each pass only considers faces whose
//! plane contains the sweep axis, sorts them so contiguous candidates are
//! adjacent, and greedily absorbs each face into the running anchor when
//! geometry, normals and colors allow. Culled faces stay in the buffers but
//! are skipped by every later stage.

use glam::Vec3;

use super::builder::DIR_AXIS;
use crate::buffers::Buffers;
use crate::model::Model;

/// Per-component tolerance for normal agreement between merged faces.
const NORMAL_TOLERANCE: f32 = 0.01;

/// Per-component tolerance for the shared-edge colinearity check.
const EDGE_TOLERANCE: f32 = 1e-4;

pub fn simplify(model: &Model, buffers: &mut Buffers) {
  if !model.simplify {
    return;
  }
  for axis in 0..3 {
    sweep(model, buffers, axis);
  }
}

fn sweep(model: &Model, buffers: &mut Buffers, axis: usize) {
  let fixed_b = (axis + 1) % 3;
  let fixed_c = (axis + 2) % 3;

  let mut order: Vec<usize> = (0..buffers.face_count)
    .filter(|&face| {
      !buffers.face_culled.get(face)
        && DIR_AXIS[buffers.face_dirs[face] as usize] != axis
        && model.materials[buffers.face_materials[face] as usize].simplify
    })
    .collect();
  order.sort_by_key(|&face| {
    (
      buffers.face_materials[face],
      buffers.face_dirs[face],
      buffers.face_cells[face][fixed_b],
      buffers.face_cells[face][fixed_c],
      buffers.face_cells[face][axis],
    )
  });

  let mut anchor: Option<usize> = None;
  for face in order {
    if let Some(last) = anchor {
      if contiguous(buffers, last, face, axis, fixed_b, fixed_c)
        && try_merge(buffers, last, face)
      {
        // The anchor absorbed the face; track the absorbed cell so the next
        // contiguity check continues the run.
        buffers.face_cells[last][axis] = buffers.face_cells[face][axis];
        continue;
      }
    }
    anchor = Some(face);
  }
}

/// Same material, direction and fixed-axis coordinates, exactly one cell
/// further along the sweep axis.
fn contiguous(
  buffers: &Buffers,
  last: usize,
  face: usize,
  axis: usize,
  fixed_b: usize,
  fixed_c: usize,
) -> bool {
  buffers.face_materials[last] == buffers.face_materials[face]
    && buffers.face_dirs[last] == buffers.face_dirs[face]
    && buffers.face_cells[last][fixed_b] == buffers.face_cells[face][fixed_b]
    && buffers.face_cells[last][fixed_c] == buffers.face_cells[face][fixed_c]
    && buffers.face_cells[face][axis] == buffers.face_cells[last][axis] + 1
}

/// Attempt to absorb `face` into `last`. Returns false (leaving both faces
/// untouched) when any merge condition fails.
fn try_merge(buffers: &mut Buffers, last: usize, face: usize) -> bool {
  let (i, j) = match shared_edge(buffers, last, face) {
    Some(slots) => slots,
    None => return false,
  };

  // Corner correspondence along the sweep: shared corners first, then the
  // anchor's near corners against the new face's far corners.
  let pairs = [
    (i, (j + 1) % 4),
    ((i + 1) % 4, j),
    ((i + 3) % 4, (j + 2) % 4),
    ((i + 2) % 4, (j + 3) % 4),
  ];
  for &(a, b) in &pairs {
    let dn = buffers.face_vert_final_normals[last * 4 + a]
      - buffers.face_vert_final_normals[face * 4 + b];
    if dn.abs().max_element() > NORMAL_TOLERANCE {
      return false;
    }
    if buffers.face_vert_colors[last * 4 + a] != buffers.face_vert_colors[face * 4 + b] {
      return false;
    }
  }

  // Both shared corners must sit on the straight line between the anchor's
  // near corner and the new face's far corner, at the split the two edge
  // lengths imply. Deformation can bend a run; bent runs are not merged.
  let checks = [
    (i, (i + 3) % 4, (j + 2) % 4, (j + 1) % 4),
    ((i + 1) % 4, (i + 2) % 4, (j + 3) % 4, j),
  ];
  for &(shared_slot, near_slot, far_slot, face_shared_slot) in &checks {
    let shared = corner_pos(buffers, last, shared_slot);
    let near = corner_pos(buffers, last, near_slot);
    let far = corner_pos(buffers, face, far_slot);
    let new_edge = (far - corner_pos(buffers, face, face_shared_slot)).length();
    let combined_edge = (far - near).length();
    if combined_edge == 0.0 {
      return false;
    }
    let ratio = new_edge / combined_edge;
    let expected = near.lerp(far, 1.0 - ratio);
    if (shared - expected).abs().max_element() > EDGE_TOLERANCE {
      return false;
    }
  }

  // Absorb: the anchor's shared slots take over the new face's far corners.
  for &(slot, src) in &[(i, (j + 2) % 4), ((i + 1) % 4, (j + 3) % 4)] {
    let dst_fvi = last * 4 + slot;
    let src_fvi = face * 4 + src;
    buffers.face_vert_indices[dst_fvi] = buffers.face_vert_indices[src_fvi];
    buffers.face_vert_uvs[dst_fvi] = buffers.face_vert_uvs[src_fvi];
    buffers.face_vert_normals[dst_fvi] = buffers.face_vert_normals[src_fvi];
    buffers.face_vert_smooth_normals[dst_fvi] = buffers.face_vert_smooth_normals[src_fvi];
    buffers.face_vert_both_normals[dst_fvi] = buffers.face_vert_both_normals[src_fvi];
    buffers.face_vert_final_normals[dst_fvi] = buffers.face_vert_final_normals[src_fvi];
    buffers.face_vert_colors[dst_fvi] = buffers.face_vert_colors[src_fvi];
    buffers.face_vert_lights[dst_fvi] = buffers.face_vert_lights[src_fvi];
    buffers.face_vert_ao[dst_fvi] = buffers.face_vert_ao[src_fvi];
  }
  buffers.face_culled.set(face);
  true
}

/// Find slots (i, j) where the anchor's edge `i → i+1` is the new face's
/// edge `j+1 → j`, i.e. the same two vertices traversed in opposite order.
fn shared_edge(buffers: &Buffers, last: usize, face: usize) -> Option<(usize, usize)> {
  for i in 0..4 {
    let a0 = buffers.face_vert_indices[last * 4 + i];
    let a1 = buffers.face_vert_indices[last * 4 + (i + 1) % 4];
    for j in 0..4 {
      if a0 == buffers.face_vert_indices[face * 4 + (j + 1) % 4]
        && a1 == buffers.face_vert_indices[face * 4 + j]
      {
        return Some((i, j));
      }
    }
  }
  None
}

#[inline]
fn corner_pos(buffers: &Buffers, face: usize, slot: usize) -> Vec3 {
  buffers.positions[buffers.face_vert_indices[face * 4 + slot] as usize]
}

#[cfg(test)]
#[path = "simplify_test.rs"]
mod simplify_test;
