//! Improved Perlin noise for warp displacement.
//!
//! Uses the reference permutation table so warp output is reproducible
//! across runs and platforms. Output range is roughly [-1, 1].

/// Ken Perlin's reference permutation.
#[rustfmt::skip]
const PERMUTATION: [u8; 256] = [
  151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225,
  140, 36, 103, 30, 69, 142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148,
  247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219, 203, 117, 35, 11, 32,
  57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
  74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122,
  60, 211, 133, 230, 220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54,
  65, 25, 63, 161, 1, 216, 80, 73, 209, 76, 132, 187, 208, 89, 18, 169,
  200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173, 186, 3, 64,
  52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212,
  207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213,
  119, 248, 152, 2, 44, 154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9,
  129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232, 178, 185, 112, 104,
  218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162, 241,
  81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157,
  184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93,
  222, 114, 67, 29, 24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

#[inline]
fn perm(i: usize) -> usize {
  PERMUTATION[i & 255] as usize
}

#[inline]
fn fade(t: f32) -> f32 {
  t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
  a + t * (b - a)
}

#[inline]
fn grad(hash: usize, x: f32, y: f32, z: f32) -> f32 {
  let h = hash & 15;
  let u = if h < 8 { x } else { y };
  let v = if h < 4 {
    y
  } else if h == 12 || h == 14 {
    x
  } else {
    z
  };
  (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Sample 3D Perlin noise.
pub fn perlin(x: f32, y: f32, z: f32) -> f32 {
  let xi = x.floor() as i32 as usize & 255;
  let yi = y.floor() as i32 as usize & 255;
  let zi = z.floor() as i32 as usize & 255;
  let xf = x - x.floor();
  let yf = y - y.floor();
  let zf = z - z.floor();

  let u = fade(xf);
  let v = fade(yf);
  let w = fade(zf);

  let a = perm(xi) + yi;
  let aa = perm(a) + zi;
  let ab = perm(a + 1) + zi;
  let b = perm(xi + 1) + yi;
  let ba = perm(b) + zi;
  let bb = perm(b + 1) + zi;

  lerp(
    w,
    lerp(
      v,
      lerp(
        u,
        grad(perm(aa), xf, yf, zf),
        grad(perm(ba), xf - 1.0, yf, zf),
      ),
      lerp(
        u,
        grad(perm(ab), xf, yf - 1.0, zf),
        grad(perm(bb), xf - 1.0, yf - 1.0, zf),
      ),
    ),
    lerp(
      v,
      lerp(
        u,
        grad(perm(aa + 1), xf, yf, zf - 1.0),
        grad(perm(ba + 1), xf - 1.0, yf, zf - 1.0),
      ),
      lerp(
        u,
        grad(perm(ab + 1), xf, yf - 1.0, zf - 1.0),
        grad(perm(bb + 1), xf - 1.0, yf - 1.0, zf - 1.0),
      ),
    ),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_at_lattice_points() {
    assert_eq!(perlin(0.0, 0.0, 0.0), 0.0);
    assert_eq!(perlin(3.0, 7.0, 12.0), 0.0);
  }

  #[test]
  fn deterministic() {
    let a = perlin(1.37, 2.81, 0.44);
    let b = perlin(1.37, 2.81, 0.44);
    assert_eq!(a.to_bits(), b.to_bits());
  }

  #[test]
  fn bounded() {
    let mut i = 0.0f32;
    while i < 10.0 {
      let n = perlin(i * 0.73, i * 1.19, i * 0.31);
      assert!(n.abs() <= 1.0, "out of range at {i}: {n}");
      i += 0.1;
    }
  }

  #[test]
  fn varies_between_lattice_points() {
    let a = perlin(0.3, 0.4, 0.5);
    let b = perlin(0.7, 0.4, 0.5);
    assert_ne!(a, b);
  }
}
