//! Ambient occlusion: hemisphere raycasts against an octree of opaque faces.
//!
//! Results are memoized on the exact bit patterns of (position, normal), so
//! corners shared between faces are traced once per generation.

use std::collections::HashMap;

use glam::Vec3;

use crate::buffers::Buffers;
use crate::material::AoSettings;
use crate::model::Model;
use crate::octree::{Octree, Triangle};

/// Faces at or above this opacity occlude rays.
const OCCLUDER_OPACITY: f32 = 0.75;

/// Offset factor pulling the ray origin off the surface.
const ORIGIN_EPSILON: f32 = 1e-4;

pub fn calculate(model: &Model, buffers: &mut Buffers, memo: &mut HashMap<[u32; 6], f32>) {
  if !ao_enabled(model) {
    return;
  }

  let octree = build_occluders(model, buffers);
  if octree.is_empty() {
    return;
  }
  let directions = fibonacci_sphere(model.ao_samples);

  for face in 0..buffers.face_count {
    let material = &model.materials[buffers.face_materials[face] as usize];
    let settings = match model.ao_for(material) {
      Some(s) if s.is_active() && material.opacity > 0.0 => s,
      _ => continue,
    };
    let cos_cutoff = settings.angle.to_radians().cos();

    for i in 0..4 {
      let fvi = face * 4 + i;
      let position = buffers.positions[buffers.face_vert_indices[fvi] as usize];
      let normal = buffers.face_vert_smooth_normals[fvi];
      let key = memo_key(position, normal);
      if let Some(&ao) = memo.get(&key) {
        buffers.face_vert_ao[fvi] = ao;
        continue;
      }

      let opposite =
        buffers.positions[buffers.face_vert_indices[face * 4 + (i + 2) % 4] as usize];
      let origin = position.lerp(opposite, ORIGIN_EPSILON) + normal * ORIGIN_EPSILON;
      let ao = trace_corner(&octree, &directions, origin, normal, cos_cutoff, settings);
      memo.insert(key, ao);
      buffers.face_vert_ao[fvi] = ao;
    }
  }
}

fn ao_enabled(model: &Model) -> bool {
  model.ao.as_ref().is_some_and(AoSettings::is_active)
    || model
      .materials
      .iter()
      .any(|m| m.ao.as_ref().is_some_and(AoSettings::is_active))
}

fn trace_corner(
  octree: &Octree,
  directions: &[Vec3],
  origin: Vec3,
  normal: Vec3,
  cos_cutoff: f32,
  settings: &AoSettings,
) -> f32 {
  let mut total = 0.0;
  let mut samples = 0u32;
  for &direction in directions {
    if direction.dot(normal) <= cos_cutoff {
      continue;
    }
    samples += 1;
    let distance = octree
      .raycast(origin, direction, settings.max_distance)
      .unwrap_or(settings.max_distance);
    total += distance / settings.max_distance;
  }
  if samples == 0 {
    return 0.0;
  }
  let visibility = (total / samples as f32).clamp(0.0, 1.0);
  1.0 - visibility.powf(settings.strength)
}

/// Two triangles per opaque face, plus oversized quads sealing tiled
/// boundaries so rays leaving an open tile edge still occlude as if the next
/// repeat were present.
fn build_occluders(model: &Model, buffers: &Buffers) -> Octree {
  let mut triangles = Vec::new();
  for face in 0..buffers.face_count {
    if model.materials[buffers.face_materials[face] as usize].opacity < OCCLUDER_OPACITY {
      continue;
    }
    let p: [Vec3; 4] =
      std::array::from_fn(|i| buffers.positions[buffers.face_vert_indices[face * 4 + i] as usize]);
    triangles.push(Triangle::new(p[2], p[1], p[0]));
    triangles.push(Triangle::new(p[0], p[3], p[2]));
  }

  if !model.tile.is_empty() && buffers.vert_count > 0 {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for v in 0..buffers.vert_count {
      min = min.min(buffers.positions[v]);
      max = max.max(buffers.positions[v]);
    }
    let margin = (max - min).max_element().max(1.0);
    for axis in 0..3 {
      if model.tile.neg[axis] {
        push_boundary_quad(&mut triangles, axis, min[axis], min, max, margin);
      }
      if model.tile.pos[axis] {
        push_boundary_quad(&mut triangles, axis, max[axis], min, max, margin);
      }
    }
  }

  Octree::build(triangles)
}

/// Quad in the plane `position[axis] == plane`, grown past the mesh bounds.
fn push_boundary_quad(
  triangles: &mut Vec<Triangle>,
  axis: usize,
  plane: f32,
  min: Vec3,
  max: Vec3,
  margin: f32,
) {
  let u = (axis + 1) % 3;
  let v = (axis + 2) % 3;
  let mut corners = [Vec3::ZERO; 4];
  for (i, (du, dv)) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
    .into_iter()
    .enumerate()
  {
    let mut c = Vec3::ZERO;
    c[axis] = plane;
    c[u] = min[u] - margin + du * (max[u] - min[u] + 2.0 * margin);
    c[v] = min[v] - margin + dv * (max[v] - min[v] + 2.0 * margin);
    corners[i] = c;
  }
  triangles.push(Triangle::new(corners[0], corners[1], corners[2]));
  triangles.push(Triangle::new(corners[0], corners[2], corners[3]));
}

fn memo_key(position: Vec3, normal: Vec3) -> [u32; 6] {
  [
    position.x.to_bits(),
    position.y.to_bits(),
    position.z.to_bits(),
    normal.x.to_bits(),
    normal.y.to_bits(),
    normal.z.to_bits(),
  ]
}

/// Evenly distributed unit directions over the sphere.
fn fibonacci_sphere(count: u32) -> Vec<Vec3> {
  let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
  (0..count)
    .map(|i| {
      let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
      let radius = (1.0 - y * y).sqrt();
      let theta = golden_angle * i as f32;
      Vec3::new(theta.cos() * radius, y, theta.sin() * radius)
    })
    .collect()
}

#[cfg(test)]
#[path = "ao_test.rs"]
mod ao_test;
