//! Material descriptors for voxel meshing.
//!
//! A [`Material`] owns the shading and deformation parameters of every voxel
//! that references it through the palette. Materials are immutable once a
//! model is handed to the generator. Materials that agree on their render
//! parameters share a render pass; that grouping is by value equality on
//! [`BaseMaterialKey`], not inheritance.

use glam::Vec3;

use crate::planar::Planar;

/// Which side(s) of a face the renderer draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderSide {
  /// Front faces only.
  #[default]
  Front,
  /// Back faces only; the packer flips face winding for these.
  Back,
  /// Both sides.
  Double,
}

/// Per-material lighting mode, selecting which normal each face corner emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lighting {
  /// One normal per triangle.
  #[default]
  Flat,
  /// One blended normal per quad.
  Quad,
  /// Per-vertex averaged normal.
  Smooth,
  /// Smooth unless constrained by flatten/clamp.
  Both,
}

/// Iterative relaxation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deform {
  /// Number of relaxation steps.
  pub count: u32,
  /// Fraction of the distance to the neighbor average moved per step.
  pub strength: f32,
  /// Geometric decay applied per step (`damping^step · strength`).
  pub damping: f32,
}

impl Deform {
  pub fn new(count: u32, strength: f32, damping: f32) -> Self {
    Self {
      count,
      strength,
      damping,
    }
  }

  /// Total displacement integral over all steps.
  ///
  /// Used to arbitrate between materials competing for a shared vertex:
  /// the smaller total displacement wins (first writer wins exact ties).
  pub fn total_displacement(&self) -> f32 {
    if self.damping == 1.0 {
      self.strength * (self.count + 1) as f32
    } else {
      self.strength * (1.0 - self.damping.powi(self.count as i32 + 1)) / (1.0 - self.damping)
    }
  }
}

/// Perlin-noise warp parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Warp {
  /// Maximum displacement per axis.
  pub amplitude: f32,
  /// Noise frequency in voxel units.
  pub frequency: f32,
}

impl Warp {
  pub fn new(amplitude: f32, frequency: f32) -> Self {
    Self {
      amplitude,
      frequency,
    }
  }
}

/// Ambient occlusion parameters, per material or model-wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AoSettings {
  /// Color blended in where the surface is occluded.
  pub color: Vec3,
  /// Ray length in world units.
  pub max_distance: f32,
  /// Exponent applied to the averaged visibility.
  pub strength: f32,
  /// Sample cone half-angle around the normal, in degrees.
  pub angle: f32,
}

impl AoSettings {
  pub fn new(color: Vec3, max_distance: f32, strength: f32, angle: f32) -> Self {
    Self {
      color,
      max_distance,
      strength,
      angle,
    }
  }

  /// AO is computed only when every parameter is effective.
  pub fn is_active(&self) -> bool {
    self.max_distance > 0.0 && self.strength > 0.0 && self.angle > 0.0
  }
}

/// Texture-coordinate mapping parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapSettings {
  /// U scale in texture units per voxel; `None` = auto (`1 / max(grid dim)`).
  pub u_scale: Option<f32>,
  /// V scale in texture units per voxel; `None` = auto.
  pub v_scale: Option<f32>,
  /// Cube atlas layout: quarters the U scale, halves the V scale and applies
  /// a per-face-direction offset.
  pub cube: bool,
}

impl Default for MapSettings {
  fn default() -> Self {
    Self {
      u_scale: None,
      v_scale: None,
      cube: false,
    }
  }
}

/// A named auxiliary per-vertex data channel.
#[derive(Clone, Debug, PartialEq)]
pub struct DataChannel {
  pub name: String,
  pub values: Vec<f32>,
}

/// Full material definition, matching one palette material slot.
#[derive(Clone, Debug)]
pub struct Material {
  /// 0 = invisible (no faces emitted), 1 = fully opaque.
  pub opacity: f32,
  /// See-through materials never occlude neighboring faces.
  pub transparent: bool,
  /// Rendered as wireframe; wireframe neighbors never occlude.
  pub wireframe: bool,
  /// Which side(s) the renderer draws.
  pub side: RenderSide,
  /// Normal selection mode.
  pub lighting: Lighting,
  /// Planes pinned flat (no movement on the plane axis).
  pub flatten: Planar,
  /// Planes excluded from deformation entirely.
  pub clamp: Planar,
  /// Planes whose faces are omitted.
  pub skip: Planar,
  /// Relaxation parameters, if the material deforms.
  pub deform: Option<Deform>,
  /// Noise warp, if any.
  pub warp: Option<Warp>,
  /// Uniform per-axis jitter magnitude (0 = none).
  pub scatter: f32,
  /// Material ambient occlusion; overrides the model-level setting.
  pub ao: Option<AoSettings>,
  /// Average the colors of adjacent voxels into shared vertices.
  pub fade: bool,
  /// Whether model lights affect this material.
  pub lights: bool,
  /// Whether coplanar faces of this material may be merged.
  pub simplify: bool,
  /// UV mapping parameters.
  pub map: Option<MapSettings>,
  /// Per-material override of the model's auxiliary data channels.
  pub data: Option<Vec<DataChannel>>,
}

impl Default for Material {
  fn default() -> Self {
    Self {
      opacity: 1.0,
      transparent: false,
      wireframe: false,
      side: RenderSide::Front,
      lighting: Lighting::Flat,
      flatten: Planar::NONE,
      clamp: Planar::NONE,
      skip: Planar::NONE,
      deform: None,
      warp: None,
      scatter: 0.0,
      ao: None,
      fade: false,
      lights: true,
      simplify: true,
      map: None,
      data: None,
    }
  }
}

impl Material {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_opacity(mut self, opacity: f32) -> Self {
    self.opacity = opacity;
    self
  }

  pub fn with_side(mut self, side: RenderSide) -> Self {
    self.side = side;
    self
  }

  pub fn with_lighting(mut self, lighting: Lighting) -> Self {
    self.lighting = lighting;
    self
  }

  pub fn with_deform(mut self, count: u32, strength: f32, damping: f32) -> Self {
    self.deform = Some(Deform::new(count, strength, damping));
    self
  }

  pub fn with_warp(mut self, amplitude: f32, frequency: f32) -> Self {
    self.warp = Some(Warp::new(amplitude, frequency));
    self
  }

  pub fn with_scatter(mut self, scatter: f32) -> Self {
    self.scatter = scatter;
    self
  }

  pub fn with_ao(mut self, ao: AoSettings) -> Self {
    self.ao = Some(ao);
    self
  }

  pub fn with_fade(mut self, fade: bool) -> Self {
    self.fade = fade;
    self
  }

  pub fn with_flatten(mut self, flatten: Planar) -> Self {
    self.flatten = flatten;
    self
  }

  pub fn with_clamp(mut self, clamp: Planar) -> Self {
    self.clamp = clamp;
    self
  }

  pub fn with_skip(mut self, skip: Planar) -> Self {
    self.skip = skip;
    self
  }

  /// True when faces of this material never occlude a neighbor's face.
  pub fn is_see_through(&self) -> bool {
    self.transparent || self.wireframe || self.opacity < 1.0
  }

  /// Value-equality key grouping materials that can share a render pass.
  pub fn base_key(&self) -> BaseMaterialKey {
    BaseMaterialKey {
      side: self.side,
      lighting: self.lighting,
      wireframe: self.wireframe,
      transparent: self.transparent,
      opacity_bits: self.opacity.to_bits(),
    }
  }
}

/// Render-pass grouping key: materials with equal keys share one draw group
/// ancestor ("base material").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BaseMaterialKey {
  pub side: RenderSide,
  pub lighting: Lighting,
  pub wireframe: bool,
  pub transparent: bool,
  pub opacity_bits: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_displacement_geometric_sum() {
    // strength 1, damping 0.5, count 2: 1 + 0.5 + 0.25 = 1.75
    let d = Deform::new(2, 1.0, 0.5);
    assert!((d.total_displacement() - 1.75).abs() < 1e-6);
  }

  #[test]
  fn total_displacement_damping_one() {
    let d = Deform::new(3, 0.5, 1.0);
    assert_eq!(d.total_displacement(), 2.0);
  }

  #[test]
  fn base_key_groups_equal_render_params() {
    let a = Material::new().with_opacity(1.0).with_lighting(Lighting::Smooth);
    let b = Material::new().with_opacity(1.0).with_lighting(Lighting::Smooth);
    let c = Material::new().with_opacity(0.5).with_lighting(Lighting::Smooth);
    assert_eq!(a.base_key(), b.base_key());
    assert_ne!(a.base_key(), c.base_key());
  }
}
