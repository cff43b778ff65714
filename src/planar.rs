//! Per-axis/per-side planar flag sets.
//!
//! Planar settings select boundary planes of the model on which a rule
//! applies: `origin` anchors the mesh origin, `flatten` pins a plane flat,
//! `clamp` excludes a plane from deformation, `skip` omits its faces and
//! `tile` marks seamless-wrap sides. The textual model format writes these as
//! space-separated tokens (`"-y +x z"`); an unsigned axis token selects both
//! sides of that axis.

use std::str::FromStr;

/// Axis indices used throughout the crate.
pub const X: usize = 0;
pub const Y: usize = 1;
pub const Z: usize = 2;

/// A set of boundary-plane flags, one negative and one positive flag per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Planar {
  /// Negative-side flag per axis (-x, -y, -z).
  pub neg: [bool; 3],
  /// Positive-side flag per axis (+x, +y, +z).
  pub pos: [bool; 3],
}

impl Planar {
  /// No planes selected.
  pub const NONE: Planar = Planar {
    neg: [false; 3],
    pos: [false; 3],
  };

  /// True if no plane is selected.
  pub fn is_empty(&self) -> bool {
    *self == Self::NONE
  }

  /// True if either side of `axis` is selected.
  #[inline]
  pub fn axis(&self, axis: usize) -> bool {
    self.neg[axis] || self.pos[axis]
  }

  /// Union of two flag sets.
  #[inline]
  pub fn or(&self, other: &Planar) -> Planar {
    Planar {
      neg: [
        self.neg[X] || other.neg[X],
        self.neg[Y] || other.neg[Y],
        self.neg[Z] || other.neg[Z],
      ],
      pos: [
        self.pos[X] || other.pos[X],
        self.pos[Y] || other.pos[Y],
        self.pos[Z] || other.pos[Z],
      ],
    }
  }
}

/// Error returned for an unrecognized planar token.
#[derive(Debug, PartialEq, Eq)]
pub struct PlanarParseError(pub String);

impl std::fmt::Display for PlanarParseError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "unrecognized planar token: {:?}", self.0)
  }
}

impl std::error::Error for PlanarParseError {}

impl FromStr for Planar {
  type Err = PlanarParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut planar = Planar::NONE;
    for token in s.split_whitespace() {
      let (neg, pos, axis) = match token {
        "x" => (true, true, X),
        "-x" => (true, false, X),
        "+x" => (false, true, X),
        "y" => (true, true, Y),
        "-y" => (true, false, Y),
        "+y" => (false, true, Y),
        "z" => (true, true, Z),
        "-z" => (true, false, Z),
        "+z" => (false, true, Z),
        other => return Err(PlanarParseError(other.to_string())),
      };
      planar.neg[axis] |= neg;
      planar.pos[axis] |= pos;
    }
    Ok(planar)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_signed_tokens() {
    let planar: Planar = "-y +x".parse().unwrap();
    assert!(planar.neg[Y]);
    assert!(!planar.pos[Y]);
    assert!(planar.pos[X]);
    assert!(!planar.neg[X]);
  }

  #[test]
  fn parse_unsigned_token_selects_both_sides() {
    let planar: Planar = "z".parse().unwrap();
    assert!(planar.neg[Z]);
    assert!(planar.pos[Z]);
    assert!(!planar.axis(X));
  }

  #[test]
  fn parse_rejects_garbage() {
    assert!("-w".parse::<Planar>().is_err());
  }

  #[test]
  fn or_unions_flags() {
    let a: Planar = "-y".parse().unwrap();
    let b: Planar = "+y -z".parse().unwrap();
    let c = a.or(&b);
    assert!(c.neg[Y] && c.pos[Y] && c.neg[Z]);
  }
}
