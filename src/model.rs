//! Model-level settings: the input contract of a generation call.

use glam::Vec3;

use crate::material::{AoSettings, DataChannel, Material};
use crate::planar::Planar;

/// How the model is fitted into its target size before placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeMode {
  /// No rescale; origin flags resolve against the occupied voxel bounds.
  #[default]
  None,
  /// Rescale so the occupied voxel bounds fill the grid box.
  Bounds,
  /// Center on the full grid box without rescaling.
  Model,
}

/// Shape deformation applied before relaxation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shape {
  /// No projection.
  #[default]
  Box,
  /// Project toward an iso-distance sphere.
  Sphere,
  /// Cylinder along X (the X axis does not participate).
  CylinderX,
  /// Cylinder along Y.
  CylinderY,
  /// Cylinder along Z.
  CylinderZ,
}

impl Shape {
  /// Per-axis participation (1 = projected, 0 = untouched).
  pub fn axis_strengths(&self) -> [f32; 3] {
    match self {
      Shape::Box => [0.0, 0.0, 0.0],
      Shape::Sphere => [1.0, 1.0, 1.0],
      Shape::CylinderX => [0.0, 1.0, 1.0],
      Shape::CylinderY => [1.0, 0.0, 1.0],
      Shape::CylinderZ => [1.0, 1.0, 0.0],
    }
  }
}

/// A single light source.
///
/// A light with neither direction nor position is ambient and contributes
/// `strength · color` to every lit corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
  pub color: Vec3,
  pub strength: f32,
  /// Directional component, pointing from the surface toward the light.
  pub direction: Option<Vec3>,
  /// Point-light position in world units.
  pub position: Option<Vec3>,
  /// Attenuation distance for point lights (`None` = no falloff).
  pub distance: Option<f32>,
}

impl Light {
  pub fn ambient(color: Vec3, strength: f32) -> Self {
    Self {
      color,
      strength,
      direction: None,
      position: None,
      distance: None,
    }
  }

  pub fn directional(color: Vec3, strength: f32, direction: Vec3) -> Self {
    Self {
      color,
      strength,
      direction: Some(direction),
      position: None,
      distance: None,
    }
  }

  pub fn point(color: Vec3, strength: f32, position: Vec3, distance: Option<f32>) -> Self {
    Self {
      color,
      strength,
      direction: None,
      position: Some(position),
      distance,
    }
  }
}

/// Everything the generator needs besides the voxel grid itself.
#[derive(Clone, Debug)]
pub struct Model {
  /// Ordered material list; the high byte of a palette color indexes it.
  pub materials: Vec<Material>,
  /// Light sources; empty = unlit (every corner gets white light).
  pub lights: Vec<Light>,
  /// World size of one voxel per axis.
  pub scale: Vec3,
  /// Rotation around Z, then Y, then X, in degrees.
  pub rotation: Vec3,
  /// World-space placement applied last.
  pub position: Vec3,
  /// Bounds/origin resolution mode.
  pub resize: ResizeMode,
  /// Which boundary planes anchor the origin when `resize` is `None`.
  pub origin: Planar,
  /// Model-wide flatten planes (OR-combined with material flags).
  pub flatten: Planar,
  /// Model-wide clamp planes.
  pub clamp: Planar,
  /// Model-wide skip planes.
  pub skip: Planar,
  /// Seamless-wrap sides.
  pub tile: Planar,
  /// Shape projection applied before relaxation.
  pub shape: Shape,
  /// Model-wide ambient occlusion (materials may override).
  pub ao: Option<AoSettings>,
  /// Number of AO sample directions per corner.
  pub ao_samples: u32,
  /// Master switch for coplanar face merging.
  pub simplify: bool,
  /// Render the whole model as wireframe.
  pub wireframe: bool,
  /// Auxiliary per-vertex data channel defaults.
  pub data: Vec<DataChannel>,
}

impl Model {
  pub fn new(materials: Vec<Material>) -> Self {
    Self {
      materials,
      lights: Vec::new(),
      scale: Vec3::ONE,
      rotation: Vec3::ZERO,
      position: Vec3::ZERO,
      resize: ResizeMode::None,
      origin: Planar::NONE,
      flatten: Planar::NONE,
      clamp: Planar::NONE,
      skip: Planar::NONE,
      tile: Planar::NONE,
      shape: Shape::Box,
      ao: None,
      ao_samples: 50,
      simplify: true,
      wireframe: false,
      data: Vec::new(),
    }
  }

  pub fn with_scale(mut self, scale: Vec3) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_rotation(mut self, rotation: Vec3) -> Self {
    self.rotation = rotation;
    self
  }

  pub fn with_position(mut self, position: Vec3) -> Self {
    self.position = position;
    self
  }

  pub fn with_resize(mut self, resize: ResizeMode) -> Self {
    self.resize = resize;
    self
  }

  pub fn with_origin(mut self, origin: Planar) -> Self {
    self.origin = origin;
    self
  }

  pub fn with_shape(mut self, shape: Shape) -> Self {
    self.shape = shape;
    self
  }

  pub fn with_ao(mut self, ao: AoSettings) -> Self {
    self.ao = Some(ao);
    self
  }

  pub fn with_ao_samples(mut self, samples: u32) -> Self {
    self.ao_samples = samples;
    self
  }

  pub fn with_lights(mut self, lights: Vec<Light>) -> Self {
    self.lights = lights;
    self
  }

  pub fn with_simplify(mut self, simplify: bool) -> Self {
    self.simplify = simplify;
    self
  }

  pub fn with_tile(mut self, tile: Planar) -> Self {
    self.tile = tile;
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

  /// Effective AO settings for a material (material overrides model).
  pub fn ao_for<'a>(&'a self, material: &'a Material) -> Option<&'a AoSettings> {
    material.ao.as_ref().or(self.ao.as_ref())
  }
}
