//! Packer: flattens surviving quads into an indexed triangle mesh with one
//! draw group per base material.
//!
//! Model materials that agree on their render-state key (side, lighting,
//! wireframe, transparency, opacity) share a base material, so a palette full
//! of same-state colors still packs into a single draw call.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::buffers::Buffers;
use crate::material::{BaseMaterialKey, Lighting, Material, RenderSide};
use crate::model::Model;
use crate::types::{DrawGroup, MaterialDescriptor, Mesh, VertexChannel};

/// UVs within this distance pack to the same vertex.
const UV_EPSILON: f32 = 1e-4;

/// Dedup key over exact position/normal/color bits and quantized UV.
type VertexKey = ([u32; 3], [u32; 3], [u32; 3], [i64; 2]);

pub fn pack(model: &Model, buffers: &Buffers) -> Mesh {
  let (groups, material_to_group) = base_groups(model);

  let mut faces_by_material: Vec<Vec<usize>> = vec![Vec::new(); model.materials.len()];
  for face in 0..buffers.face_count {
    if !buffers.face_culled.get(face) {
      faces_by_material[buffers.face_materials[face] as usize].push(face);
    }
  }

  let mut mesh = Mesh::new();
  for (_, members) in &groups {
    // The first material carrying the key defines the descriptor.
    mesh.materials.push(describe(&model.materials[members[0]]));
  }
  for channel in &model.data {
    mesh.channels.push(VertexChannel {
      name: channel.name.clone(),
      width: channel.values.len(),
      values: Vec::new(),
    });
  }

  let mut dedup: HashMap<VertexKey, u32> = HashMap::new();
  for (group_index, _) in groups.iter().enumerate() {
    let start = mesh.indices.len() as u32;

    for (mat_index, material) in model.materials.iter().enumerate() {
      if material_to_group[mat_index] != group_index {
        continue;
      }
      for &face in &faces_by_material[mat_index] {
        pack_face(model, buffers, material, face, &mut dedup, &mut mesh);
      }
    }

    let count = mesh.indices.len() as u32 - start;
    if count > 0 {
      mesh.groups.push(DrawGroup {
        start,
        count,
        material_index: group_index as u32,
      });
    }
  }

  mesh
}

fn pack_face(
  model: &Model,
  buffers: &Buffers,
  material: &Material,
  face: usize,
  dedup: &mut HashMap<VertexKey, u32>,
  mesh: &mut Mesh,
) {
  // Back-rendered materials reverse the winding by swapping corners 0 and 2.
  let slots: [usize; 4] = if material.side == RenderSide::Back {
    [2, 1, 0, 3]
  } else {
    [0, 1, 2, 3]
  };

  let positions: [Vec3; 4] = std::array::from_fn(|k| {
    buffers.positions[buffers.face_vert_indices[face * 4 + slots[k]] as usize]
  });
  let normals = face_normals(buffers, face, &slots, &positions, material.lighting);

  let mut packed = [0u32; 4];
  for k in 0..4 {
    let fvi = face * 4 + slots[k];
    packed[k] = intern_vertex(
      model,
      material,
      mesh,
      dedup,
      positions[k],
      normals[k],
      buffers.face_vert_colors[fvi],
      buffers.face_vert_uvs[fvi],
    );
  }

  mesh.indices.extend_from_slice(&[
    packed[2], packed[1], packed[0], //
    packed[0], packed[3], packed[2],
  ]);
}

/// Per-slot normals by lighting mode: smooth modes keep the per-corner
/// normals, flat uses one cross-product normal averaged over both triangles,
/// quad blends the four corner normals into one.
fn face_normals(
  buffers: &Buffers,
  face: usize,
  slots: &[usize; 4],
  p: &[Vec3; 4],
  lighting: Lighting,
) -> [Vec3; 4] {
  match lighting {
    Lighting::Smooth | Lighting::Both => {
      std::array::from_fn(|k| buffers.face_vert_final_normals[face * 4 + slots[k]])
    }
    Lighting::Flat => {
      let normal = ((p[2] - p[0]).cross(p[1] - p[0]) + (p[3] - p[0]).cross(p[2] - p[0]))
        .normalize_or_zero();
      [normal; 4]
    }
    Lighting::Quad => {
      let sum: Vec3 = (0..4)
        .map(|k| buffers.face_vert_normals[face * 4 + slots[k]])
        .sum();
      [sum.normalize_or_zero(); 4]
    }
  }
}

#[allow(clippy::too_many_arguments)]
fn intern_vertex(
  model: &Model,
  material: &Material,
  mesh: &mut Mesh,
  dedup: &mut HashMap<VertexKey, u32>,
  position: Vec3,
  normal: Vec3,
  color: Vec3,
  uv: Vec2,
) -> u32 {
  let key: VertexKey = (
    [position.x.to_bits(), position.y.to_bits(), position.z.to_bits()],
    [normal.x.to_bits(), normal.y.to_bits(), normal.z.to_bits()],
    [color.x.to_bits(), color.y.to_bits(), color.z.to_bits()],
    [
      (uv.x / UV_EPSILON).round() as i64,
      (uv.y / UV_EPSILON).round() as i64,
    ],
  );
  if let Some(&index) = dedup.get(&key) {
    return index;
  }

  let index = (mesh.positions.len() / 3) as u32;
  mesh.positions.extend_from_slice(&[position.x, position.y, position.z]);
  mesh.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
  mesh.colors.extend_from_slice(&[color.x, color.y, color.z]);
  mesh.uvs.extend_from_slice(&[uv.x, uv.y]);
  for (slot, channel) in model.data.iter().enumerate() {
    let values = material
      .data
      .as_ref()
      .and_then(|d| d.iter().find(|c| c.name == channel.name))
      .map(|c| &c.values)
      .unwrap_or(&channel.values);
    mesh.channels[slot].values.extend_from_slice(values);
  }

  dedup.insert(key, index);
  index
}

/// Base material groups in first-seen order, plus a material-to-group map.
fn base_groups(model: &Model) -> (Vec<(BaseMaterialKey, Vec<usize>)>, Vec<usize>) {
  let mut groups: Vec<(BaseMaterialKey, Vec<usize>)> = Vec::new();
  let mut material_to_group = Vec::with_capacity(model.materials.len());
  for (index, material) in model.materials.iter().enumerate() {
    let key = material.base_key();
    let group = match groups.iter().position(|(k, _)| *k == key) {
      Some(g) => g,
      None => {
        groups.push((key, Vec::new()));
        groups.len() - 1
      }
    };
    groups[group].1.push(index);
    material_to_group.push(group);
  }
  (groups, material_to_group)
}

fn describe(material: &Material) -> MaterialDescriptor {
  MaterialDescriptor {
    side: material.side,
    lighting: material.lighting,
    opacity: material.opacity,
    transparent: material.transparent,
    wireframe: material.wireframe,
  }
}

#[cfg(test)]
#[path = "pack_test.rs"]
mod pack_test;
