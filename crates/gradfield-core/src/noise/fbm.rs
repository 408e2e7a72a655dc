//! Octave compositing (fractal Brownian motion).
//!
//! Every generation mode lowers to an [`OctaveSchedule`]: an ordered list of
//! passes, each a cell size and an amplitude. Compositing runs the passes in
//! order, each with a fresh lattice, and sums `pass * amplitude` into one
//! accumulation buffer. No normalisation is applied.
use rand::Rng;

use super::lattice::Lattice;
use super::params::{EdgeMode, NoiseMode, FIXED_IMPACT, FIXED_PRECISION};
use crate::error::{FieldError, Result};
use crate::field::{snap_to_cell, ScalarField};
use crate::scheduler::BlockScheduler;

/// Frequency and amplitude of one parametric octave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    pub frequency: f64,
    pub amplitude: f64,
}

impl Octave {
    /// Octave `index`: frequency `base_scale * lacunarity^(index+1)`,
    /// amplitude `base_amplitude * persistence^(index+1)`.
    ///
    /// Returns `None` when `index + 1` does not fit the exponent type.
    pub fn nth(
        index: u32,
        base_scale: f64,
        base_amplitude: f64,
        persistence: f64,
        lacunarity: f64,
    ) -> Option<Self> {
        let step = i32::try_from(index.checked_add(1)?).ok()?;
        Some(Self {
            frequency: base_scale * lacunarity.powi(step),
            amplitude: base_amplitude * persistence.powi(step),
        })
    }

    /// Cell size giving `frequency` lattice cells across `width`, at least 1.
    pub fn cell_size(&self, width: usize) -> usize {
        ((width as f64 / self.frequency).floor() as usize).max(1)
    }
}

/// One noise pass of a composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pass {
    pub cell_size: usize,
    pub amplitude: f32,
}

/// The passes of one generation, fixed before any work starts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OctaveSchedule {
    passes: Vec<Pass>,
}

impl OctaveSchedule {
    pub fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }

    /// Lower a mode to its passes for a field `width` pixels wide.
    pub fn for_mode(mode: &NoiseMode, width: usize) -> Result<Self> {
        match *mode {
            NoiseMode::Single { cell_size } => {
                Ok(Self::new(vec![Pass { cell_size, amplitude: 1.0 }]))
            }
            NoiseMode::Octaves {
                octave_count,
                persistence,
                lacunarity,
                base_scale,
                base_amplitude,
            } => {
                check_octave_param("persistence", persistence)?;
                check_octave_param("lacunarity", lacunarity)?;
                check_octave_param("base_scale", base_scale)?;
                if !base_amplitude.is_finite() {
                    return Err(FieldError::InvalidOctaveConfig(format!(
                        "base_amplitude must be finite, got {base_amplitude}"
                    )));
                }
                if i32::try_from(octave_count).is_err() {
                    return Err(FieldError::InvalidOctaveConfig(format!(
                        "octave_count {octave_count} exceeds {}",
                        i32::MAX
                    )));
                }
                let passes = (0..octave_count)
                    .map(|i| {
                        let octave = Octave::nth(
                            i,
                            base_scale as f64,
                            base_amplitude as f64,
                            persistence as f64,
                            lacunarity as f64,
                        )
                        .ok_or_else(|| {
                            FieldError::InvalidOctaveConfig(format!("octave {i} is out of range"))
                        })?;
                        if !(octave.frequency > 0.0 && octave.frequency.is_finite()) {
                            return Err(FieldError::InvalidOctaveConfig(format!(
                                "octave {i} has frequency {}",
                                octave.frequency
                            )));
                        }
                        Ok(Pass {
                            cell_size: octave.cell_size(width),
                            amplitude: octave.amplitude as f32,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::new(passes))
            }
            NoiseMode::FixedSchedule { base_cell_size } => Ok(Self::fixed(base_cell_size)),
        }
    }

    /// The five-pass preset: cell sizes shrink by half while weights halve.
    pub fn fixed(base_cell_size: usize) -> Self {
        let passes = FIXED_PRECISION
            .iter()
            .zip(FIXED_IMPACT)
            .map(|(&precision, amplitude)| Pass {
                cell_size: ((base_cell_size as f32 * precision).floor() as usize).max(1),
                amplitude,
            })
            .collect();
        Self::new(passes)
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Least common multiple of every pass's cell size; 1 for an empty
    /// schedule, `None` on overflow or a zero cell size.
    pub fn common_unit(&self) -> Option<usize> {
        self.passes.iter().try_fold(1usize, |acc, pass| {
            if pass.cell_size == 0 {
                return None;
            }
            (acc / gcd(acc, pass.cell_size)).checked_mul(pass.cell_size)
        })
    }

    /// Check every pass against the field before any work starts.
    pub fn validate(&self, width: usize, height: usize, edges: EdgeMode) -> Result<()> {
        for pass in &self.passes {
            let cell_size = pass.cell_size;
            if cell_size == 0 || (cell_size > width && cell_size > height) {
                return Err(FieldError::InvalidCellSize { cell_size, width, height });
            }
            if edges == EdgeMode::Strict && (width % cell_size != 0 || height % cell_size != 0) {
                return Err(FieldError::InvalidDimensions {
                    width,
                    height,
                    reason: format!("not a whole multiple of cell size {cell_size}"),
                });
            }
        }
        Ok(())
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn check_octave_param(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FieldError::InvalidOctaveConfig(format!(
            "{name} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Largest `(width, height)` not exceeding the request that every pass of
/// `mode` divides, so a strict generation at that size succeeds.
///
/// Octave cell sizes depend on the width, so the schedule is re-lowered at
/// each snapped width until it stops changing. Fails with `InvalidDimensions`
/// when no non-empty size fits.
pub fn snap_dimensions(mode: &NoiseMode, width: usize, height: usize) -> Result<(usize, usize)> {
    let (mut w, mut h) = (width, height);
    loop {
        let schedule = OctaveSchedule::for_mode(mode, w)?;
        let unit = schedule.common_unit().ok_or_else(|| FieldError::InvalidDimensions {
            width,
            height,
            reason: "pass cell sizes have no usable common multiple".into(),
        })?;
        let (sw, sh) = (snap_to_cell(w, unit), snap_to_cell(h, unit));
        if sw == 0 || sh == 0 {
            return Err(FieldError::InvalidDimensions {
                width,
                height,
                reason: format!("no non-empty size fits every pass (common cell {unit})"),
            });
        }
        if (sw, sh) == (w, h) {
            return Ok((w, h));
        }
        (w, h) = (sw, sh);
    }
}

/// Run every pass of `schedule` and sum the weighted results.
///
/// The schedule must already be validated for `width × height`. Lattices are
/// drawn from `rng` in pass order, one per pass.
pub fn composite<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    schedule: &OctaveSchedule,
    scheduler: &BlockScheduler,
    rng: &mut R,
) -> Result<ScalarField> {
    let mut acc = ScalarField::zeroed(width, height);
    if schedule.is_empty() {
        return Ok(acc);
    }
    let mut scratch = ScalarField::zeroed(width, height);
    for (i, pass) in schedule.passes().iter().enumerate() {
        let lattice = Lattice::for_field(width, height, pass.cell_size, rng);
        scheduler.fill(&mut scratch, pass.cell_size, &lattice)?;
        acc.add_scaled(&scratch, pass.amplitude);
        tracing::debug!(
            pass = i,
            cell_size = pass.cell_size,
            amplitude = pass.amplitude,
            "pass accumulated"
        );
    }
    Ok(acc)
}
