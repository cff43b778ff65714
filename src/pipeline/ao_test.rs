use std::collections::HashMap;

use glam::Vec3;

use super::*;
use crate::buffers::Buffers;
use crate::material::Material;
use crate::pipeline::builder::{self, DIR_NX, DIR_PX};
use crate::pipeline::normals;
use crate::voxels::{pack_color, VoxelGrid};

fn run_ao(grid: &VoxelGrid, model: &Model) -> (Buffers, HashMap<[u32; 6], f32>) {
  let mut buffers = Buffers::new(4096);
  let mut map = HashMap::new();
  let ctx = builder::build(grid, model, &mut buffers, &mut map).unwrap();
  normals::calculate(model, &ctx, &mut buffers);
  let mut memo = HashMap::new();
  calculate(model, &mut buffers, &mut memo);
  (buffers, memo)
}

fn ao_settings() -> AoSettings {
  AoSettings::new(Vec3::ZERO, 10.0, 1.0, 70.0)
}

#[test]
fn fibonacci_directions_are_unit_length() {
  let dirs = fibonacci_sphere(50);
  assert_eq!(dirs.len(), 50);
  for d in &dirs {
    assert!((d.length() - 1.0).abs() < 1e-5);
  }
  // Roughly balanced over the sphere.
  let sum: Vec3 = dirs.iter().sum();
  assert!(sum.length() < 1.0);
}

#[test]
fn disabled_ao_computes_nothing() {
  let mut grid = VoxelGrid::new([3, 3, 3]);
  grid.set_palette(1, pack_color(0, 255, 255, 255));
  grid.set(1, 1, 1, 1);
  let model = Model::new(vec![Material::new()]);
  let (buffers, memo) = run_ao(&grid, &model);
  assert!(memo.is_empty());
  for fvi in 0..buffers.face_count * 4 {
    assert_eq!(buffers.face_vert_ao[fvi], 0.0);
  }
}

#[test]
fn convex_voxel_is_unoccluded() {
  let mut grid = VoxelGrid::new([3, 3, 3]);
  grid.set_palette(1, pack_color(0, 255, 255, 255));
  grid.set(1, 1, 1, 1);
  let model = Model::new(vec![Material::new()]).with_ao(ao_settings());
  let (buffers, memo) = run_ao(&grid, &model);
  assert!(!memo.is_empty());
  for fvi in 0..buffers.face_count * 4 {
    assert_eq!(buffers.face_vert_ao[fvi], 0.0, "corner {}", fvi);
  }
}

#[test]
fn facing_wall_occludes_inner_face_only() {
  // One voxel staring at a 5x5 wall three cells away.
  let mut grid = VoxelGrid::new([7, 5, 5]);
  grid.set_palette(1, pack_color(0, 255, 255, 255));
  grid.set(1, 2, 2, 1);
  for y in 0..5 {
    for z in 0..5 {
      grid.set(5, y, z, 1);
    }
  }
  let model = Model::new(vec![Material::new()]).with_ao(ao_settings());
  let (buffers, _) = run_ao(&grid, &model);

  let mut inner = Vec::new();
  let mut outer = Vec::new();
  for face in 0..buffers.face_count {
    if buffers.face_cells[face][0] != 1 {
      continue;
    }
    for i in 0..4 {
      let ao = buffers.face_vert_ao[face * 4 + i];
      assert!((0.0..=1.0).contains(&ao));
      if buffers.face_dirs[face] == DIR_PX {
        inner.push(ao);
      } else if buffers.face_dirs[face] == DIR_NX {
        outer.push(ao);
      }
    }
  }
  assert_eq!(inner.len(), 4);
  assert_eq!(outer.len(), 4);
  assert!(inner.iter().all(|&ao| ao > 0.0), "inner {:?}", inner);
  assert!(outer.iter().all(|&ao| ao == 0.0), "outer {:?}", outer);
}

#[test]
fn shared_corners_reuse_memoized_values() {
  let mut grid = VoxelGrid::new([7, 5, 5]);
  grid.set_palette(1, pack_color(0, 255, 255, 255));
  grid.set(1, 2, 2, 1);
  for y in 0..5 {
    for z in 0..5 {
      grid.set(5, y, z, 1);
    }
  }
  let model = Model::new(vec![Material::new()]).with_ao(ao_settings());
  let (buffers, _) = run_ao(&grid, &model);

  // Same vertex, same smooth normal: every face touching it reports the
  // same occlusion.
  let mut by_vertex: HashMap<u32, f32> = HashMap::new();
  for fvi in 0..buffers.face_count * 4 {
    let v = buffers.face_vert_indices[fvi];
    let ao = buffers.face_vert_ao[fvi];
    if let Some(&prev) = by_vertex.get(&v) {
      assert_eq!(prev, ao, "vertex {}", v);
    } else {
      by_vertex.insert(v, ao);
    }
  }
}

#[test]
fn see_through_materials_do_not_occlude() {
  // Replace the wall with a transparent material: the inner face clears up.
  let mut grid = VoxelGrid::new([7, 5, 5]);
  grid.set_palette(1, pack_color(0, 255, 255, 255));
  grid.set_palette(2, pack_color(1, 255, 255, 255));
  grid.set(1, 2, 2, 1);
  for y in 0..5 {
    for z in 0..5 {
      grid.set(5, y, z, 2);
    }
  }
  let glass = Material::new().with_opacity(0.5);
  let model = Model::new(vec![Material::new(), glass]).with_ao(ao_settings());
  let (buffers, _) = run_ao(&grid, &model);

  for face in 0..buffers.face_count {
    if buffers.face_cells[face][0] == 1 && buffers.face_dirs[face] == DIR_PX {
      for i in 0..4 {
        assert_eq!(buffers.face_vert_ao[face * 4 + i], 0.0);
      }
    }
  }
}

#[test]
fn tiled_boundaries_occlude_open_edges() {
  let mut grid = VoxelGrid::new([3, 3, 3]);
  grid.set_palette(1, pack_color(0, 255, 255, 255));
  grid.set(1, 1, 1, 1);
  let mut model = Model::new(vec![Material::new()]).with_ao(ao_settings());
  model.tile = "x".parse().unwrap();
  let (buffers, _) = run_ao(&grid, &model);

  // Rays from the top face can now hit the synthetic boundary planes.
  let mut top_ao = Vec::new();
  for face in 0..buffers.face_count {
    if buffers.face_dirs[face] == builder::DIR_PY {
      for i in 0..4 {
        top_ao.push(buffers.face_vert_ao[face * 4 + i]);
      }
    }
  }
  assert_eq!(top_ao.len(), 4);
  assert!(top_ao.iter().all(|&ao| ao > 0.0), "{:?}", top_ao);
}
