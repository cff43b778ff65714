//! Color combiner: merges base color, fade averaging, lighting and AO.

use glam::Vec3;

use crate::buffers::Buffers;
use crate::model::Model;

pub fn combine(model: &Model, buffers: &mut Buffers) {
  let has_lights = !model.lights.is_empty();

  for face in 0..buffers.face_count {
    let material = &model.materials[buffers.face_materials[face] as usize];
    let ao_color = model
      .ao_for(material)
      .filter(|s| s.is_active())
      .map(|s| s.color);

    for i in 0..4 {
      let fvi = face * 4 + i;
      let mut color = if material.fade {
        let v = buffers.face_vert_indices[fvi] as usize;
        let count = buffers.color_counts[v];
        if count > 0 {
          buffers.color_sums[v] / count as f32
        } else {
          buffers.face_vert_colors[fvi]
        }
      } else {
        buffers.face_vert_colors[fvi]
      };

      if has_lights && material.lights {
        color *= buffers.face_vert_lights[fvi];
      }
      if let Some(ao_color) = ao_color {
        // Per channel: base·light·(1−ao) + aoColor·ao.
        let ao = buffers.face_vert_ao[fvi];
        color = color * (1.0 - ao) + ao_color * ao;
      }

      buffers.face_vert_colors[fvi] = color.max(Vec3::ZERO);
    }
  }
}

#[cfg(test)]
#[path = "colors_test.rs"]
mod colors_test;
