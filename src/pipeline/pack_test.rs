use glam::Vec3;

use super::*;
use crate::buffers::Buffers;
use crate::material::DataChannel;
use crate::pipeline::MeshGenerator;
use crate::voxels::{pack_color, VoxelGrid};

fn single_voxel_mesh(model: &Model) -> Mesh {
  let mut grid = VoxelGrid::new([3, 3, 3]);
  grid.set_palette(1, pack_color(0, 255, 0, 0));
  grid.set(1, 1, 1, 1);
  let mut buffers = Buffers::new(1024);
  MeshGenerator::with_seed(0)
    .generate(&grid, model, &mut buffers)
    .unwrap()
}

#[test]
fn cube_packs_as_one_group() {
  let model = Model::new(vec![Material::new()]);
  let mesh = single_voxel_mesh(&model);
  assert_eq!(mesh.triangle_count(), 12);
  assert_eq!(mesh.indices.len(), 36);
  // Flat lighting: every face needs its own four vertices.
  assert_eq!(mesh.vertex_count(), 24);
  assert_eq!(mesh.materials.len(), 1);
  assert_eq!(
    mesh.groups,
    vec![DrawGroup {
      start: 0,
      count: 36,
      material_index: 0
    }]
  );
  assert_eq!(mesh.positions.len(), 24 * 3);
  assert_eq!(mesh.normals.len(), 24 * 3);
  assert_eq!(mesh.colors.len(), 24 * 3);
  assert_eq!(mesh.uvs.len(), 24 * 2);
  for &index in &mesh.indices {
    assert!((index as usize) < mesh.vertex_count());
  }
}

#[test]
fn triangles_face_outward() {
  let model = Model::new(vec![Material::new()]);
  let mesh = single_voxel_mesh(&model);
  // Default model centers the voxel on the origin.
  for tri in mesh.indices.chunks(3) {
    let p: Vec<Vec3> = tri
      .iter()
      .map(|&i| {
        let i = i as usize * 3;
        Vec3::new(mesh.positions[i], mesh.positions[i + 1], mesh.positions[i + 2])
      })
      .collect();
    let normal = (p[1] - p[0]).cross(p[2] - p[0]);
    let centroid = (p[0] + p[1] + p[2]) / 3.0;
    assert!(normal.dot(centroid) > 0.0, "inward triangle {:?}", tri);
  }
}

#[test]
fn back_side_material_flips_winding() {
  let model = Model::new(vec![Material::new().with_side(RenderSide::Back)]);
  let mesh = single_voxel_mesh(&model);
  assert_eq!(mesh.materials[0].side, RenderSide::Back);
  for tri in mesh.indices.chunks(3) {
    let p: Vec<Vec3> = tri
      .iter()
      .map(|&i| {
        let i = i as usize * 3;
        Vec3::new(mesh.positions[i], mesh.positions[i + 1], mesh.positions[i + 2])
      })
      .collect();
    let normal = (p[1] - p[0]).cross(p[2] - p[0]);
    let centroid = (p[0] + p[1] + p[2]) / 3.0;
    assert!(normal.dot(centroid) < 0.0, "outward triangle {:?}", tri);
  }
}

#[test]
fn same_render_state_materials_share_a_group() {
  let mut grid = VoxelGrid::new([4, 3, 3]);
  grid.set_palette(1, pack_color(0, 255, 0, 0));
  grid.set_palette(2, pack_color(1, 0, 0, 255));
  grid.set(1, 1, 1, 1);
  grid.set(2, 1, 1, 2);
  let model = Model::new(vec![Material::new(), Material::new()]);
  let mut buffers = Buffers::new(1024);
  let mesh = MeshGenerator::with_seed(0)
    .generate(&grid, &model, &mut buffers)
    .unwrap();

  assert_eq!(mesh.materials.len(), 1);
  assert_eq!(mesh.groups.len(), 1);
  assert_eq!(mesh.groups[0].count as usize, mesh.indices.len());
}

#[test]
fn different_render_states_split_groups() {
  let mut grid = VoxelGrid::new([4, 3, 3]);
  grid.set_palette(1, pack_color(0, 255, 0, 0));
  grid.set_palette(2, pack_color(1, 0, 0, 255));
  grid.set(1, 1, 1, 1);
  grid.set(2, 1, 1, 2);
  let glass = {
    let mut m = Material::new();
    m.transparent = true;
    m
  };
  let model = Model::new(vec![Material::new(), glass]);
  let mut buffers = Buffers::new(1024);
  let mesh = MeshGenerator::with_seed(0)
    .generate(&grid, &model, &mut buffers)
    .unwrap();

  assert_eq!(mesh.materials.len(), 2);
  assert_eq!(mesh.groups.len(), 2);
  assert!(!mesh.materials[0].transparent);
  assert!(mesh.materials[1].transparent);
  // Groups tile the index buffer in order.
  assert_eq!(mesh.groups[0].start, 0);
  assert_eq!(
    mesh.groups[0].count + mesh.groups[1].count,
    mesh.indices.len() as u32
  );
  assert_eq!(mesh.groups[1].start, mesh.groups[0].count);
}

#[test]
fn culled_faces_are_not_emitted() {
  let mut grid = VoxelGrid::new([4, 3, 3]);
  grid.set_palette(1, pack_color(0, 200, 200, 200));
  grid.set(1, 1, 1, 1);
  grid.set(2, 1, 1, 1);
  let model = Model::new(vec![Material::new()]);
  let mut buffers = Buffers::new(1024);
  let mesh = MeshGenerator::with_seed(0)
    .generate(&grid, &model, &mut buffers)
    .unwrap();
  // Simplify merges the 10 faces down to a 6-quad box.
  assert_eq!(mesh.triangle_count(), 12);
}

#[test]
fn data_channels_follow_vertex_count() {
  let mut model = Model::new(vec![{
    let mut m = Material::new();
    m.data = Some(vec![DataChannel {
      name: "glow".into(),
      values: vec![1.0, 0.5],
    }]);
    m
  }]);
  model.data = vec![DataChannel {
    name: "glow".into(),
    values: vec![0.0, 0.0],
  }];
  let mesh = single_voxel_mesh(&model);

  assert_eq!(mesh.channels.len(), 1);
  assert_eq!(mesh.channels[0].name, "glow");
  assert_eq!(mesh.channels[0].width, 2);
  assert_eq!(mesh.channels[0].values.len(), mesh.vertex_count() * 2);
  // Material override wins over the model default.
  assert_eq!(&mesh.channels[0].values[..2], &[1.0, 0.5]);
}

#[test]
fn empty_grid_packs_empty_mesh() {
  let grid = VoxelGrid::new([3, 3, 3]);
  let model = Model::new(vec![Material::new()]);
  let mut buffers = Buffers::new(64);
  let mesh = MeshGenerator::with_seed(0)
    .generate(&grid, &model, &mut buffers)
    .unwrap();
  assert!(mesh.is_empty());
  assert!(mesh.groups.is_empty());
}
