//! Lights calculator: additive per-corner lighting.
//!
//! Corners of materials with lighting disabled keep full-white light and skip
//! accumulation entirely. All other corners start from an ambient base of 1.0
//! per channel and add each light's contribution.

use glam::Vec3;

use crate::buffers::Buffers;
use crate::model::Model;

pub fn calculate(model: &Model, buffers: &mut Buffers) {
  if model.lights.is_empty() {
    return;
  }

  for face in 0..buffers.face_count {
    if !model.materials[buffers.face_materials[face] as usize].lights {
      continue;
    }
    for i in 0..4 {
      let fvi = face * 4 + i;
      let position = buffers.positions[buffers.face_vert_indices[fvi] as usize];
      let normal = buffers.face_vert_final_normals[fvi];

      let mut light = Vec3::ONE;
      for source in &model.lights {
        light += source.color * contribution(source, position, normal);
      }
      buffers.face_vert_lights[fvi] = light;
    }
  }
}

fn contribution(light: &crate::model::Light, position: Vec3, normal: Vec3) -> f32 {
  if let Some(direction) = light.direction {
    return light.strength * normal.dot(direction.normalize_or_zero()).max(0.0);
  }
  if let Some(light_position) = light.position {
    let to_light = light_position - position;
    let mut strength = light.strength * normal.dot(to_light.normalize_or_zero()).max(0.0);
    if let Some(max_distance) = light.distance {
      strength *= 1.0 - (to_light.length() / max_distance).min(1.0);
    }
    return strength;
  }
  // Ambient: no direction, no position.
  light.strength
}

#[cfg(test)]
#[path = "lights_test.rs"]
mod lights_test;
