//! Deformer: shape projection, iterative relaxation and warp/scatter.

use glam::Vec3;
use rand::Rng;

use super::GenContext;
use crate::buffers::Buffers;
use crate::model::{Model, Shape};
use crate::noise::perlin;

/// Per-axis noise decorrelation offsets for warp sampling.
const WARP_OFFSETS: [f32; 3] = [0.0, 19.0, 41.0];

/// Vertices closer than this to a tiled boundary keep their position so the
/// seam stays watertight across tile repeats.
const TILE_MARGIN: f32 = 0.5;

pub fn deform(model: &Model, ctx: &GenContext, buffers: &mut Buffers, rng: &mut impl Rng) {
  project_shape(model, ctx, buffers);
  relax(buffers);
  warp_and_scatter(model, ctx, buffers, rng);
}

/// Project vertices toward the iso-distance surface of the model shape and
/// record per-vertex ring distances; faces whose 4 corners share a ring are
/// marked equidistant and treated as smooth downstream.
fn project_shape(model: &Model, ctx: &GenContext, buffers: &mut Buffers) {
  if model.shape == Shape::Box {
    return;
  }
  let strengths = Vec3::from_array(model.shape.axis_strengths());
  let mid = Vec3::new(
    (ctx.plane_min(0) + ctx.plane_max(0)) * 0.5,
    (ctx.plane_min(1) + ctx.plane_max(1)) * 0.5,
    (ctx.plane_min(2) + ctx.plane_max(2)) * 0.5,
  );

  for v in 0..buffers.vert_count {
    let d = buffers.positions[v] - mid;
    let masked = d * strengths;
    let distance = masked.length();
    let ring = masked.abs().max_element();
    buffers.rings[v] = ring;
    if distance == 0.0 {
      continue;
    }
    // Blend per axis: participating axes project onto the shell where the
    // max-norm (ring) and euclidean distances coincide.
    let factor = Vec3::ONE - strengths + strengths * (ring / distance);
    buffers.positions[v] = mid + d * factor;
  }

  for face in 0..buffers.face_count {
    let ring = buffers.rings[buffers.face_vert_indices[face * 4] as usize];
    let equidistant = (1..4).all(|corner| {
      buffers.rings[buffers.face_vert_indices[face * 4 + corner] as usize] == ring
    });
    if equidistant {
      buffers.face_equidistant.set(face);
    }
  }
}

/// Jacobi-style relaxation: each step buffers every displacement and applies
/// them after the full pass, so the result does not depend on vertex order.
fn relax(buffers: &mut Buffers) {
  let max_steps = (0..buffers.vert_count)
    .filter(|&v| buffers.has_deform.get(v))
    .map(|v| buffers.deform_count[v])
    .max()
    .unwrap_or(0);

  let mut moves: Vec<(usize, Vec3)> = Vec::new();
  for step in 0..max_steps {
    moves.clear();
    for v in 0..buffers.vert_count {
      if !buffers.has_deform.get(v)
        || buffers.deform_count[v] <= step
        || buffers.deform_strength[v] == 0.0
      {
        continue;
      }
      let link_count = buffers.link_counts[v] as usize;
      if link_count == 0 {
        continue;
      }
      let mut sum = Vec3::ZERO;
      for &link in &buffers.links[v][..link_count] {
        sum += buffers.positions[link as usize];
      }
      let average = sum / link_count as f32;
      let influence = buffers.deform_strength[v] * buffers.deform_damping[v].powi(step as i32);
      let delta = (average - buffers.positions[v]) * influence * axis_mask(buffers, v);
      if delta != Vec3::ZERO {
        moves.push((v, delta));
      }
    }
    for &(v, delta) in &moves {
      buffers.positions[v] += delta;
    }
  }
}

/// Perlin warp plus uniform scatter, masked by flatten/clamp and excluded
/// near tiled boundaries.
fn warp_and_scatter(model: &Model, ctx: &GenContext, buffers: &mut Buffers, rng: &mut impl Rng) {
  for v in 0..buffers.vert_count {
    let amplitude = buffers.warp_amplitude[v];
    let scatter = buffers.scatter[v];
    if amplitude == 0.0 && scatter == 0.0 {
      continue;
    }
    let position = buffers.positions[v];
    if near_tiled_boundary(model, ctx, position) {
      continue;
    }

    let mut displacement = Vec3::ZERO;
    if amplitude != 0.0 {
      let frequency = buffers.warp_frequency[v];
      for axis in 0..3 {
        let offset = WARP_OFFSETS[axis];
        displacement[axis] = amplitude
          * perlin(
            (position.x + offset) * frequency,
            (position.y + offset) * frequency,
            (position.z + offset) * frequency,
          );
      }
    }
    if scatter != 0.0 {
      for axis in 0..3 {
        displacement[axis] += rng.random_range(-scatter..=scatter);
      }
    }
    let mask = axis_mask(buffers, v);
    buffers.positions[v] += displacement * mask;
  }
}

/// 1 on free axes, 0 where the vertex is clamped or flattened.
#[inline]
fn axis_mask(buffers: &Buffers, v: usize) -> Vec3 {
  let mut mask = Vec3::ONE;
  for axis in 0..3 {
    if buffers.vert_clamp[axis].get(v) || buffers.vert_flatten[axis].get(v) {
      mask[axis] = 0.0;
    }
  }
  mask
}

fn near_tiled_boundary(model: &Model, ctx: &GenContext, position: Vec3) -> bool {
  for axis in 0..3 {
    if model.tile.neg[axis] && position[axis] < ctx.plane_min(axis) + TILE_MARGIN {
      return true;
    }
    if model.tile.pos[axis] && position[axis] > ctx.plane_max(axis) - TILE_MARGIN {
      return true;
    }
  }
  false
}

#[cfg(test)]
#[path = "deformer_test.rs"]
mod deformer_test;
