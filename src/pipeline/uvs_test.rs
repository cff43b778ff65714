use glam::Vec2;

use super::*;
use crate::buffers::Buffers;
use crate::material::{MapSettings, Material};
use crate::model::Model;

fn ctx() -> GenContext {
  GenContext {
    grid_size: [4, 4, 4],
    bounds_min: [0, 0, 0],
    bounds_max: [3, 3, 3],
    empty: false,
  }
}

/// One face of direction `dir` with placeholder UVs for cell (1, 2).
fn face_with_placeholders(dir: u8, materials: Vec<Material>) -> (Model, Buffers) {
  let mut buffers = Buffers::new(64);
  let mut ids = [0u32; 4];
  for slot in &mut ids {
    *slot = buffers.add_vertex(glam::Vec3::ZERO).unwrap();
  }
  let face = buffers.add_face(0, dir, [0, 0, 0], ids).unwrap();
  let quarters = [(0.25, 0.25), (0.25, 0.75), (0.75, 0.75), (0.75, 0.25)];
  for (i, (qu, qv)) in quarters.iter().enumerate() {
    buffers.face_vert_uvs[face * 4 + i] = Vec2::new(1.0 + qu, 2.0 + qv);
  }
  (Model::new(materials), buffers)
}

#[test]
fn auto_scale_uses_largest_grid_dimension() {
  let (model, mut buffers) = face_with_placeholders(5, vec![Material::new()]);
  assign(&model, &ctx(), &mut buffers);
  // Cell 1 of 4, near corner: (1 + 0.0001) / 4.
  let uv = buffers.face_vert_uvs[0];
  assert!((uv.x - 1.0001 / 4.0).abs() < 1e-7, "{:?}", uv);
  assert!((uv.y - 2.0001 / 4.0).abs() < 1e-7, "{:?}", uv);
}

#[test]
fn far_corners_nudge_inward() {
  let (model, mut buffers) = face_with_placeholders(5, vec![Material::new()]);
  assign(&model, &ctx(), &mut buffers);
  let uv = buffers.face_vert_uvs[2];
  assert!((uv.x - 1.9999 / 4.0).abs() < 1e-7);
  assert!((uv.y - 2.9999 / 4.0).abs() < 1e-7);
}

#[test]
fn all_uvs_stay_inside_unit_square() {
  for dir in 0..6u8 {
    let (model, mut buffers) = face_with_placeholders(dir, vec![Material::new()]);
    assign(&model, &ctx(), &mut buffers);
    for i in 0..4 {
      let uv = buffers.face_vert_uvs[i];
      assert!(uv.x > 0.0 && uv.x < 1.0, "dir {} u {}", dir, uv.x);
      assert!(uv.y > 0.0 && uv.y < 1.0, "dir {} v {}", dir, uv.y);
    }
  }
}

#[test]
fn explicit_scale_overrides_auto() {
  let material = Material {
    map: Some(MapSettings {
      u_scale: Some(1.0),
      v_scale: Some(0.5),
      cube: false,
    }),
    ..Material::new()
  };
  let (model, mut buffers) = face_with_placeholders(5, vec![material]);
  assign(&model, &ctx(), &mut buffers);
  let uv = buffers.face_vert_uvs[0];
  assert!((uv.x - 1.0001).abs() < 1e-6);
  assert!((uv.y - 2.0001 * 0.5).abs() < 1e-6);
}

#[test]
fn flipped_directions_mirror_across_the_grid() {
  // +x (dir 1) flips u; -x (dir 0) does not. Same placeholder must land
  // mirrored around the grid extent.
  let (model, mut buffers_nx) = face_with_placeholders(0, vec![Material::new()]);
  assign(&model, &ctx(), &mut buffers_nx);
  let (model, mut buffers_px) = face_with_placeholders(1, vec![Material::new()]);
  assign(&model, &ctx(), &mut buffers_px);

  let u_nx = buffers_nx.face_vert_uvs[0].x;
  let u_px = buffers_px.face_vert_uvs[0].x;
  assert!((u_nx + u_px - 1.0).abs() < 1e-6, "{} + {}", u_nx, u_px);
  // v is unflipped for both x directions.
  assert_eq!(buffers_nx.face_vert_uvs[0].y, buffers_px.face_vert_uvs[0].y);
}

#[test]
fn cube_layout_packs_directions_into_atlas_tiles() {
  let material = Material {
    map: Some(MapSettings {
      u_scale: None,
      v_scale: None,
      cube: true,
    }),
    ..Material::new()
  };
  let expected_tiles = [
    (0.0, 0.0),
    (0.25, 0.0),
    (0.5, 0.0),
    (0.75, 0.0),
    (0.0, 0.5),
    (0.25, 0.5),
  ];
  for dir in 0..6u8 {
    let (model, mut buffers) = face_with_placeholders(dir, vec![material.clone()]);
    assign(&model, &ctx(), &mut buffers);
    let (col, row) = expected_tiles[dir as usize];
    for i in 0..4 {
      let uv = buffers.face_vert_uvs[i];
      assert!(
        uv.x > col && uv.x < col + 0.25,
        "dir {} u {} outside tile",
        dir,
        uv.x
      );
      assert!(
        uv.y > row && uv.y < row + 0.5,
        "dir {} v {} outside tile",
        dir,
        uv.y
      );
    }
  }
}
