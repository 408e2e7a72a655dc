//! Gradient lattice: one random unit vector per lattice corner.

use std::f32::consts::PI;

use rand::Rng;

/// Row-major grid of unit gradients, `width × height` corners.
///
/// Built once per noise pass and shared read-only by every worker of that pass.
#[derive(Debug, Clone)]
pub struct Lattice {
    gradients: Vec<[f32; 2]>,
    width: usize,
    height: usize,
}

impl Lattice {
    /// Draw a fresh lattice of `width × height` corners from `rng`.
    ///
    /// Each corner gets `(cos θ, sin θ)` for θ uniform in `[-π, π]`. Corners are
    /// drawn row by row, so a seeded `rng` always yields the same lattice.
    pub fn build<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let gradients = (0..width * height)
            .map(|_| {
                let angle: f32 = rng.gen_range(-PI..=PI);
                let (sin, cos) = angle.sin_cos();
                [cos, sin]
            })
            .collect();
        Self { gradients, width, height }
    }

    /// Lattice sized for a `field_width × field_height` field at `cell_size`:
    /// `⌈w / cell⌉ + 1` by `⌈h / cell⌉ + 1` corners, so clipped edge cells
    /// still have their far corners.
    pub fn for_field<R: Rng + ?Sized>(
        field_width: usize,
        field_height: usize,
        cell_size: usize,
        rng: &mut R,
    ) -> Self {
        let (w, h) = corners_for(field_width, field_height, cell_size);
        Self::build(w, h, rng)
    }

    /// Build from explicit gradients, row-major.
    ///
    /// # Panics
    /// Panics if `gradients.len() != width * height`.
    pub fn from_gradients(width: usize, height: usize, gradients: Vec<[f32; 2]>) -> Self {
        assert_eq!(gradients.len(), width * height, "gradient count must match lattice size");
        Self { gradients, width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gradient at corner `(col, row)`.
    #[inline]
    pub fn gradient(&self, col: usize, row: usize) -> [f32; 2] {
        debug_assert!(col < self.width && row < self.height);
        self.gradients[row * self.width + col]
    }
}

/// Corner counts `(⌈w / cell⌉ + 1, ⌈h / cell⌉ + 1)`.
pub fn corners_for(field_width: usize, field_height: usize, cell_size: usize) -> (usize, usize) {
    (field_width.div_ceil(cell_size) + 1, field_height.div_ceil(cell_size) + 1)
}
