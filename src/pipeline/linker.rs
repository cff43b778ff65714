//! Vertex linker: builds the bounded adjacency graph used by relaxation.
//!
//! Faces contribute their 4 edges as undirected links, deduplicated per
//! direction and capped at 6 neighbors per vertex. Clamped faces contribute
//! self-links instead: a self-linked vertex pulls toward itself, so clamped
//! boundaries do not drift during relaxation while the link-count denominator
//! used for averaging stays intact. A post-pass repairs vertices whose links
//! are all self-links, which would otherwise pinch into sharp corners.

use smallvec::SmallVec;

use crate::buffers::{Buffers, MAX_LINKS};

pub fn link(buffers: &mut Buffers) {
  for face in 0..buffers.face_count {
    let clamped = buffers.face_clamped.get(face);
    for corner in 0..4 {
      let v = buffers.face_vert_indices[face * 4 + corner];
      if clamped {
        add_self_link(buffers, v);
      } else {
        let w = buffers.face_vert_indices[face * 4 + (corner + 1) % 4];
        buffers.add_link(v, w);
        buffers.add_link(w, v);
      }
    }
  }

  // Fully clamped vertices (every link is a self-link) get ordinary edge
  // links back, otherwise corners shared only by clamped faces deform into
  // spikes relative to their neighborhood.
  // Usually empty or a handful of corner vertices.
  let fully_clamped: SmallVec<[u32; 16]> = (0..buffers.vert_count as u32)
    .filter(|&v| is_fully_clamped(buffers, v))
    .collect();
  for &v in &fully_clamped {
    buffers.reset_links(v);
  }
  if fully_clamped.is_empty() {
    return;
  }
  for face in 0..buffers.face_count {
    if !buffers.face_clamped.get(face) {
      continue;
    }
    for corner in 0..4 {
      let v = buffers.face_vert_indices[face * 4 + corner];
      let w = buffers.face_vert_indices[face * 4 + (corner + 1) % 4];
      if fully_clamped.contains(&v) {
        buffers.add_link(v, w);
      }
      if fully_clamped.contains(&w) {
        buffers.add_link(w, v);
      }
    }
  }
}

/// Self-links are appended without deduplication so the averaging denominator
/// reflects every clamped face touching the vertex.
fn add_self_link(buffers: &mut Buffers, v: u32) {
  let i = v as usize;
  let n = buffers.link_counts[i] as usize;
  if n < MAX_LINKS {
    buffers.links[i][n] = v;
    buffers.link_counts[i] = (n + 1) as u8;
  }
}

fn is_fully_clamped(buffers: &Buffers, v: u32) -> bool {
  let i = v as usize;
  let n = buffers.link_counts[i] as usize;
  n > 0 && buffers.links[i][..n].iter().all(|&link| link == v)
}

#[cfg(test)]
#[path = "linker_test.rs"]
mod linker_test;
