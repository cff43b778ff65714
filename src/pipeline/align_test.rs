use glam::{Vec2, Vec3};

use super::*;
use crate::buffers::Buffers;
use crate::material::Material;

fn quad(corners: [Vec3; 4]) -> Buffers {
  let mut buffers = Buffers::new(64);
  let mut ids = [0u32; 4];
  for (i, c) in corners.iter().enumerate() {
    ids[i] = buffers.add_vertex(*c).unwrap();
  }
  let face = buffers.add_face(0, 3, [0, 0, 0], ids).unwrap();
  for i in 0..4 {
    buffers.face_vert_uvs[face * 4 + i] = Vec2::new(i as f32, 0.0);
  }
  buffers
}

fn corner_positions(buffers: &Buffers) -> [Vec3; 4] {
  std::array::from_fn(|i| buffers.positions[buffers.face_vert_indices[i] as usize])
}

#[test]
fn corner_zero_gets_smallest_magnitude() {
  let corners = [
    Vec3::new(3.0, 1.0, 0.0),
    Vec3::new(3.0, 1.0, 1.0),
    Vec3::new(0.1, 1.0, 1.0),
    Vec3::new(0.1, 1.0, 0.0),
  ];
  let mut buffers = quad(corners);
  let model = Model::new(vec![Material::new()]);
  align(&model, &mut buffers);

  let p = corner_positions(&buffers);
  assert_eq!(p[0], Vec3::new(0.1, 1.0, 0.0));
  // Cyclic order preserved.
  assert_eq!(p[1], Vec3::new(3.0, 1.0, 0.0));
  assert_eq!(p[2], Vec3::new(3.0, 1.0, 1.0));
  assert_eq!(p[3], Vec3::new(0.1, 1.0, 1.0));
  // Corner attributes rotate together with the indices.
  assert_eq!(buffers.face_vert_uvs[0].x, 3.0);
}

#[test]
fn already_aligned_quad_is_untouched() {
  let corners = [
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 0.0),
  ];
  let mut buffers = quad(corners);
  let model = Model::new(vec![Material::new()]);
  align(&model, &mut buffers);
  assert_eq!(corner_positions(&buffers), corners);
  assert_eq!(buffers.face_vert_uvs[0].x, 0.0);
}

#[test]
fn degenerate_diagonal_rotates_once() {
  // Corner 1 deformed onto the midpoint of the 0-2 diagonal: splitting along
  // 0-2 would produce a zero-area triangle, so the quad rotates by one.
  let corners = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(2.0, 0.0, 2.0),
    Vec3::new(0.0, 0.0, 2.0),
  ];
  let mut buffers = quad(corners);
  let model = Model::new(vec![Material::new()]);
  align(&model, &mut buffers);

  let p = corner_positions(&buffers);
  assert_eq!(p[0], corners[1]);
  assert_eq!(p[3], corners[0]);
  assert_eq!(buffers.face_vert_uvs[0].x, 1.0);
}

#[test]
fn threshold_scales_with_model_scale() {
  // The same near-degenerate quad is fine at a tiny scale threshold.
  let corners = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.01, 0.0, 1.0),
    Vec3::new(2.0, 0.0, 2.0),
    Vec3::new(0.0, 0.0, 2.0),
  ];

  let mut buffers = quad(corners);
  let model = Model::new(vec![Material::new()]).with_scale(Vec3::splat(0.01));
  align(&model, &mut buffers);
  // Not degenerate at this threshold; plain min-magnitude alignment keeps
  // corner 0 (smallest sum already).
  assert_eq!(corner_positions(&buffers)[0], corners[0]);

  let mut buffers = quad(corners);
  let model = Model::new(vec![Material::new()]);
  align(&model, &mut buffers);
  // Default scale 1: the off-diagonal corner is within the threshold.
  assert_eq!(corner_positions(&buffers)[0], corners[1]);
}

#[test]
fn culled_faces_are_skipped() {
  let corners = [
    Vec3::new(3.0, 1.0, 0.0),
    Vec3::new(3.0, 1.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, 1.0, 0.0),
  ];
  let mut buffers = quad(corners);
  buffers.face_culled.set(0);
  let model = Model::new(vec![Material::new()]);
  align(&model, &mut buffers);
  assert_eq!(corner_positions(&buffers), corners);
}
