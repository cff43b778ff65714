//! Triangle octree for ambient-occlusion ray casting.
//!
//! Built once per generation from the triangles of opaque faces. Nodes track
//! tight axis-aligned bounds; a node holding more than
//! [`SPLIT_THRESHOLD`] triangles splits at the mean of its triangle centroids
//! into 8 children. Rays are pruned with an AABB slab test and resolved with
//! exact Möller–Trumbore intersection at the leaves.

use glam::Vec3;

/// Triangles per node before splitting.
pub const SPLIT_THRESHOLD: usize = 32;

/// One occluder triangle.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
  pub a: Vec3,
  pub b: Vec3,
  pub c: Vec3,
}

impl Triangle {
  pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
    Self { a, b, c }
  }

  #[inline]
  fn centroid(&self) -> Vec3 {
    (self.a + self.b + self.c) / 3.0
  }
}

/// Octree node with tight bounds.
pub struct Octree {
  min: Vec3,
  max: Vec3,
  triangles: Vec<Triangle>,
  children: Vec<Octree>,
}

impl Octree {
  /// Build a tree over a triangle soup. An empty soup yields an empty tree.
  pub fn build(triangles: Vec<Triangle>) -> Self {
    let mut node = Self {
      min: Vec3::INFINITY,
      max: Vec3::NEG_INFINITY,
      triangles,
      children: Vec::new(),
    };
    for tri in &node.triangles {
      node.min = node.min.min(tri.a).min(tri.b).min(tri.c);
      node.max = node.max.max(tri.a).max(tri.b).max(tri.c);
    }
    node.split();
    node
  }

  fn split(&mut self) {
    if self.triangles.len() <= SPLIT_THRESHOLD {
      return;
    }

    let mut mean = Vec3::ZERO;
    for tri in &self.triangles {
      mean += tri.centroid();
    }
    mean /= self.triangles.len() as f32;

    let mut buckets: [Vec<Triangle>; 8] = Default::default();
    for tri in self.triangles.drain(..) {
      let c = tri.centroid();
      let octant = (c.x >= mean.x) as usize
        | ((c.y >= mean.y) as usize) << 1
        | ((c.z >= mean.z) as usize) << 2;
      buckets[octant].push(tri);
    }

    // Degenerate distribution: everything landed in one octant, keep as leaf.
    if buckets.iter().filter(|b| !b.is_empty()).count() <= 1 {
      self.triangles = buckets.into_iter().flatten().collect();
      return;
    }

    for bucket in buckets {
      if !bucket.is_empty() {
        self.children.push(Octree::build(bucket));
      }
    }
  }

  /// True if the tree holds no triangles at all.
  pub fn is_empty(&self) -> bool {
    self.triangles.is_empty() && self.children.is_empty()
  }

  /// Total triangle count.
  pub fn len(&self) -> usize {
    self.triangles.len() + self.children.iter().map(Octree::len).sum::<usize>()
  }

  /// Nearest intersection distance along `dir` from `origin`, if any within
  /// `max_distance`. `dir` must be unit length.
  pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
    let inv_dir = dir.recip();
    let mut nearest = max_distance;
    let mut hit = false;
    self.raycast_node(origin, dir, inv_dir, &mut nearest, &mut hit);
    hit.then_some(nearest)
  }

  fn raycast_node(&self, origin: Vec3, dir: Vec3, inv_dir: Vec3, nearest: &mut f32, hit: &mut bool) {
    if !slab_test(self.min, self.max, origin, inv_dir, *nearest) {
      return;
    }
    for tri in &self.triangles {
      if let Some(t) = intersect_triangle(origin, dir, tri) {
        if t < *nearest {
          *nearest = t;
          *hit = true;
        }
      }
    }
    for child in &self.children {
      child.raycast_node(origin, dir, inv_dir, nearest, hit);
    }
  }
}

/// AABB slab test against a ray segment of length `t_max`.
#[inline]
fn slab_test(min: Vec3, max: Vec3, origin: Vec3, inv_dir: Vec3, t_max: f32) -> bool {
  let t0 = (min - origin) * inv_dir;
  let t1 = (max - origin) * inv_dir;
  let t_near = t0.min(t1).max_element().max(0.0);
  let t_far = t0.max(t1).min_element().min(t_max);
  t_near <= t_far
}

/// Möller–Trumbore ray-triangle intersection. Returns the hit distance.
#[inline]
pub fn intersect_triangle(origin: Vec3, dir: Vec3, tri: &Triangle) -> Option<f32> {
  const EPSILON: f32 = 1e-7;

  let edge1 = tri.b - tri.a;
  let edge2 = tri.c - tri.a;
  let p = dir.cross(edge2);
  let det = edge1.dot(p);
  if det.abs() < EPSILON {
    return None;
  }
  let inv_det = 1.0 / det;
  let s = origin - tri.a;
  let u = s.dot(p) * inv_det;
  if !(0.0..=1.0).contains(&u) {
    return None;
  }
  let q = s.cross(edge1);
  let v = dir.dot(q) * inv_det;
  if v < 0.0 || u + v > 1.0 {
    return None;
  }
  let t = edge2.dot(q) * inv_det;
  (t > EPSILON).then_some(t)
}

#[cfg(test)]
#[path = "octree_test.rs"]
mod octree_test;
