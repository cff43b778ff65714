//! Error types for mesh generation.

use thiserror::Error;

/// Errors surfaced by a generation call.
///
/// Capacity exhaustion is the only fatal condition: the buffers are sized at
/// construction and a model that produces more geometry than they hold aborts
/// the call rather than truncating silently. Numeric degeneracies (zero-length
/// edges, zero normals) are guarded inline and never surfaced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
  /// The model produced more vertices than the buffers were sized for.
  #[error("vertex capacity exceeded: {needed} vertices, buffers hold {capacity}")]
  VertexCapacity { needed: usize, capacity: usize },

  /// The model produced more faces than the buffers were sized for.
  #[error("face capacity exceeded: {needed} faces, buffers hold {capacity}")]
  FaceCapacity { needed: usize, capacity: usize },
}
