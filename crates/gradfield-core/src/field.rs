use serde::{Deserialize, Serialize};

/// A dense 2D scalar field stored row-major as f32.
///
/// Values produced by the generator are unnormalised: a single pass stays
/// within `[-1, 1]`, composites may exceed it. Mapping to display range is
/// left to [`ScalarField::to_intensities`] or the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl ScalarField {
    /// Create a field filled with `fill`.
    pub fn new(width: usize, height: usize, fill: f32) -> Self {
        Self { data: vec![fill; width * height], width, height }
    }

    /// Create an all-zero field.
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self::new(width, height, 0.0)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major backing slice, `width * height` long.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} field", self.width, self.height
        );
        y * self.width + x
    }

    /// Unchecked-in-release accessor; bounds are asserted in debug builds only.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, val: f32) {
        let i = self.index(x, y);
        self.data[i] = val;
    }

    /// Bounds-checked read. Returns `None` outside the field.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Accumulate `other * amplitude` into `self`, cell by cell.
    ///
    /// # Panics
    /// Panics if the two fields differ in dimensions.
    pub fn add_scaled(&mut self, other: &ScalarField, amplitude: f32) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "cannot accumulate fields of different dimensions"
        );
        for (acc, &v) in self.data.iter_mut().zip(&other.data) {
            *acc += v * amplitude;
        }
    }

    pub fn min_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::INFINITY, f32::min)
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Arithmetic mean; 0 for an empty field.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        (self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64) as f32
    }

    /// Map every value to an 8-bit display intensity, row-major.
    pub fn to_intensities(&self) -> Vec<u8> {
        self.data.iter().map(|&v| intensity(v)).collect()
    }
}

/// Display intensity for a field value: `(v + 1) * 0.5 * 255`, clamped to `[0, 255]`.
#[inline]
pub fn intensity(v: f32) -> u8 {
    ((v + 1.0) * 0.5 * 255.0).clamp(0.0, 255.0) as u8
}

/// Largest multiple of `cell_size` that does not exceed `max`.
///
/// Lets callers shrink a requested extent so strict-divisibility passes
/// always succeed. Returns 0 when `cell_size` is 0 or exceeds `max`.
pub fn snap_to_cell(max: usize, cell_size: usize) -> usize {
    if cell_size == 0 {
        return 0;
    }
    max / cell_size * cell_size
}
