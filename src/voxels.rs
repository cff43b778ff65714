//! Voxel grid input contract.
//!
//! The core treats the grid as an opaque indexed-lookup collaborator: it only
//! needs the extent, a palette index per cell and the packed color+material
//! for each palette index. [`VoxelGrid`] is a simple dense implementation for
//! callers (and tests) that do not bring their own storage.

/// Read-only voxel grid seen by the mesh generator.
pub trait VoxelSource {
  /// Grid extent per axis.
  fn size(&self) -> [u32; 3];

  /// Palette index at a cell; 0 = empty. Out-of-range coordinates are empty.
  fn palette_index_at(&self, x: i32, y: i32, z: i32) -> u8;

  /// Packed color for a palette index: `0xMM_RR_GG_BB`, high byte = material
  /// index into the model's material list.
  fn color_for_palette_index(&self, index: u8) -> u32;
}

/// Unpack the material index from a palette color.
#[inline]
pub fn material_of(color: u32) -> usize {
  (color >> 24) as usize
}

/// Unpack the RGB part of a palette color into 0..1 floats.
#[inline]
pub fn rgb_of(color: u32) -> glam::Vec3 {
  glam::Vec3::new(
    ((color >> 16) & 0xff) as f32 / 255.0,
    ((color >> 8) & 0xff) as f32 / 255.0,
    (color & 0xff) as f32 / 255.0,
  )
}

/// Pack a material index and 8-bit RGB into a palette color.
#[inline]
pub fn pack_color(material: u8, r: u8, g: u8, b: u8) -> u32 {
  ((material as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Dense row-major voxel grid with a 256-entry palette.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
  size: [u32; 3],
  cells: Vec<u8>,
  palette: [u32; 256],
}

impl VoxelGrid {
  /// Create an empty grid of the given extent.
  pub fn new(size: [u32; 3]) -> Self {
    let cells = vec![0; (size[0] * size[1] * size[2]) as usize];
    Self {
      size,
      cells,
      palette: [0; 256],
    }
  }

  /// Define the packed color for a palette index (index 0 stays empty).
  pub fn set_palette(&mut self, index: u8, color: u32) {
    self.palette[index as usize] = color;
  }

  /// Set a cell's palette index.
  pub fn set(&mut self, x: u32, y: u32, z: u32, index: u8) {
    let i = self.cell_index(x, y, z);
    self.cells[i] = index;
  }

  #[inline]
  fn cell_index(&self, x: u32, y: u32, z: u32) -> usize {
    ((x * self.size[1] + y) * self.size[2] + z) as usize
  }
}

impl VoxelSource for VoxelGrid {
  fn size(&self) -> [u32; 3] {
    self.size
  }

  fn palette_index_at(&self, x: i32, y: i32, z: i32) -> u8 {
    if x < 0
      || y < 0
      || z < 0
      || x >= self.size[0] as i32
      || y >= self.size[1] as i32
      || z >= self.size[2] as i32
    {
      return 0;
    }
    self.cells[self.cell_index(x as u32, y as u32, z as u32)]
  }

  fn color_for_palette_index(&self, index: u8) -> u32 {
    self.palette[index as usize]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn out_of_range_is_empty() {
    let grid = VoxelGrid::new([2, 2, 2]);
    assert_eq!(grid.palette_index_at(-1, 0, 0), 0);
    assert_eq!(grid.palette_index_at(0, 2, 0), 0);
  }

  #[test]
  fn pack_unpack_round_trip() {
    let c = pack_color(3, 255, 128, 0);
    assert_eq!(material_of(c), 3);
    let rgb = rgb_of(c);
    assert!((rgb.x - 1.0).abs() < 1e-6);
    assert!((rgb.y - 128.0 / 255.0).abs() < 1e-6);
    assert_eq!(rgb.z, 0.0);
  }

  #[test]
  fn set_and_read_back() {
    let mut grid = VoxelGrid::new([3, 3, 3]);
    grid.set_palette(1, pack_color(0, 10, 20, 30));
    grid.set(1, 2, 0, 1);
    assert_eq!(grid.palette_index_at(1, 2, 0), 1);
    assert_eq!(grid.color_for_palette_index(1), pack_color(0, 10, 20, 30));
  }
}
