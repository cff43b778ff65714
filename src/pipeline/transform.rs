//! Transformer: moves vertices from grid space into model space.
//!
//! Builds one affine matrix from the model's position/rotation/scale plus an
//! automatic rescale and centering offset derived from the resize mode, then
//! applies it to every vertex and its normals (normals via the inverse
//! transpose, renormalized).

use glam::{Mat3, Mat4, Vec3};

use super::GenContext;
use crate::buffers::Buffers;
use crate::model::{Model, ResizeMode};

pub fn apply(model: &Model, ctx: &GenContext, buffers: &mut Buffers) {
  let matrix = model_matrix(model, ctx);
  let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();

  for v in 0..buffers.vert_count {
    buffers.positions[v] = matrix.transform_point3(buffers.positions[v]);
    buffers.smooth_normals[v] = (normal_matrix * buffers.smooth_normals[v]).normalize_or_zero();
    buffers.both_normals[v] = (normal_matrix * buffers.both_normals[v]).normalize_or_zero();
  }
  for fvi in 0..buffers.face_count * 4 {
    buffers.face_vert_normals[fvi] =
      (normal_matrix * buffers.face_vert_normals[fvi]).normalize_or_zero();
    buffers.face_vert_smooth_normals[fvi] =
      (normal_matrix * buffers.face_vert_smooth_normals[fvi]).normalize_or_zero();
    buffers.face_vert_both_normals[fvi] =
      (normal_matrix * buffers.face_vert_both_normals[fvi]).normalize_or_zero();
    buffers.face_vert_final_normals[fvi] =
      (normal_matrix * buffers.face_vert_final_normals[fvi]).normalize_or_zero();
  }
}

/// Composition order (right to left): center, auto-rescale, model scale,
/// rotations X then Y then Z, translation.
fn model_matrix(model: &Model, ctx: &GenContext) -> Mat4 {
  let (rescale, offset) = rescale_and_offset(model, ctx);
  let radians = model.rotation * (std::f32::consts::PI / 180.0);

  Mat4::from_translation(model.position)
    * Mat4::from_rotation_z(radians.z)
    * Mat4::from_rotation_y(radians.y)
    * Mat4::from_rotation_x(radians.x)
    * Mat4::from_scale(model.scale)
    * Mat4::from_scale(rescale)
    * Mat4::from_translation(offset)
}

/// Automatic rescale and centering offset per resize mode.
///
/// `None` and `Bounds` place the origin against the occupied bounds; `Model`
/// uses the full grid box so partially filled grids keep a stable frame.
/// `Bounds` additionally rescales the occupied extent back to the grid size.
fn rescale_and_offset(model: &Model, ctx: &GenContext) -> (Vec3, Vec3) {
  let (box_min, box_max) = match model.resize {
    ResizeMode::Model => (
      Vec3::ZERO,
      Vec3::new(
        ctx.grid_size[0] as f32,
        ctx.grid_size[1] as f32,
        ctx.grid_size[2] as f32,
      ),
    ),
    ResizeMode::None | ResizeMode::Bounds => (
      Vec3::new(ctx.plane_min(0), ctx.plane_min(1), ctx.plane_min(2)),
      Vec3::new(ctx.plane_max(0), ctx.plane_max(1), ctx.plane_max(2)),
    ),
  };

  let rescale = match model.resize {
    ResizeMode::Bounds => {
      let size = box_max - box_min;
      Vec3::new(
        ctx.grid_size[0] as f32 / size.x,
        ctx.grid_size[1] as f32 / size.y,
        ctx.grid_size[2] as f32 / size.z,
      )
    }
    ResizeMode::None | ResizeMode::Model => Vec3::ONE,
  };

  let mut offset = Vec3::ZERO;
  for axis in 0..3 {
    offset[axis] = if model.origin.neg[axis] {
      -box_min[axis]
    } else if model.origin.pos[axis] {
      -box_max[axis]
    } else {
      -(box_min[axis] + box_max[axis]) * 0.5
    };
  }

  (rescale, offset)
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;
