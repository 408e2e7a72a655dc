use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default target concurrency for the block scheduler.
pub const DEFAULT_WORKERS: usize = 8;
/// Cell size used by single mode when none is given.
pub const DEFAULT_CELL_SIZE: usize = 20;
/// Base cell size the fixed schedule's precision table multiplies.
/// 80 keeps all five passes integral and dividing 1280×720.
pub const DEFAULT_BASE_CELL_SIZE: usize = 80;

/// Per-pass weights of the fixed five-pass schedule.
pub const FIXED_IMPACT: [f32; 5] = [0.5, 0.25, 0.125, 0.0625, 0.03125];
/// Per-pass cell-size multipliers of the fixed five-pass schedule.
pub const FIXED_PRECISION: [f32; 5] = [1.0, 0.5, 0.25, 0.125, 0.0625];

/// How a field whose dimensions are not whole multiples of a pass's cell size
/// is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Reject the configuration with `InvalidDimensions`.
    Strict,
    /// Clip the last block row and column to the remaining pixels.
    #[default]
    Clip,
}

/// Which passes make up one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NoiseMode {
    /// One noise pass at a fixed cell size.
    Single { cell_size: usize },
    /// Parametric fBm: octave `i` runs at frequency
    /// `base_scale * lacunarity^(i+1)` with amplitude
    /// `base_amplitude * persistence^(i+1)`.
    Octaves {
        octave_count: u32,
        persistence: f32,
        lacunarity: f32,
        base_scale: f32,
        #[serde(default = "default_base_amplitude")]
        base_amplitude: f32,
    },
    /// Five passes weighted by [`FIXED_IMPACT`] at cell sizes
    /// `base_cell_size * FIXED_PRECISION[i]`.
    FixedSchedule {
        #[serde(default = "default_base_cell_size")]
        base_cell_size: usize,
    },
}

fn default_base_amplitude() -> f32 {
    1.0
}

fn default_base_cell_size() -> usize {
    DEFAULT_BASE_CELL_SIZE
}

impl Default for NoiseMode {
    fn default() -> Self {
        NoiseMode::Single { cell_size: DEFAULT_CELL_SIZE }
    }
}

/// Call-time tunables for one `generate` call.
///
/// In JSON the `"mode"` tag is required; `workers`, `edges` and `seed` fall
/// back to their defaults when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(flatten)]
    pub mode: NoiseMode,
    /// Target worker count; reduced to the block count when fewer blocks exist.
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub edges: EdgeMode,
    /// Fixed lattice seed. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: NoiseMode::default(),
            workers: DEFAULT_WORKERS,
            edges: EdgeMode::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Single pass at `cell_size`.
    pub fn single(cell_size: usize) -> Self {
        Self { mode: NoiseMode::Single { cell_size }, ..Self::default() }
    }

    /// Parametric fBm with unit base amplitude.
    pub fn octaves(octave_count: u32, persistence: f32, lacunarity: f32, base_scale: f32) -> Self {
        Self {
            mode: NoiseMode::Octaves {
                octave_count,
                persistence,
                lacunarity,
                base_scale,
                base_amplitude: 1.0,
            },
            ..Self::default()
        }
    }

    /// The five-pass preset at the default base cell size.
    pub fn fixed_schedule() -> Self {
        Self {
            mode: NoiseMode::FixedSchedule { base_cell_size: DEFAULT_BASE_CELL_SIZE },
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_edges(mut self, edges: EdgeMode) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a JSON configuration such as
    ///
    /// ```json
    /// {"mode": "octaves", "octave_count": 4, "persistence": 0.5,
    ///  "lacunarity": 2.0, "base_scale": 2.0}
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_mode() {
        let cfg = GeneratorConfig::from_json(r#"{"mode": "single", "cell_size": 16}"#).unwrap();
        assert_eq!(cfg.mode, NoiseMode::Single { cell_size: 16 });
        assert_eq!(cfg.workers, DEFAULT_WORKERS);
        assert_eq!(cfg.edges, EdgeMode::Clip);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn parses_octave_mode_with_defaults() {
        let cfg = GeneratorConfig::from_json(
            r#"{"mode": "octaves", "octave_count": 4, "persistence": 0.5,
                "lacunarity": 2.0, "base_scale": 2.0, "workers": 3, "edges": "strict", "seed": 9}"#,
        )
        .unwrap();
        let expected = GeneratorConfig::octaves(4, 0.5, 2.0, 2.0)
            .with_workers(3)
            .with_edges(EdgeMode::Strict)
            .with_seed(9);
        assert_eq!(cfg, expected);
    }

    #[test]
    fn parses_fixed_schedule_without_fields() {
        let cfg = GeneratorConfig::from_json(r#"{"mode": "fixed_schedule"}"#).unwrap();
        assert_eq!(cfg.mode, NoiseMode::FixedSchedule { base_cell_size: DEFAULT_BASE_CELL_SIZE });
    }

    #[test]
    fn missing_mode_is_rejected() {
        let err = GeneratorConfig::from_json(r#"{"workers": 2}"#).unwrap_err();
        assert!(err.to_string().contains("mode"), "unexpected error: {err}");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(GeneratorConfig::from_json(r#"{"mode": "simplex"}"#).is_err());
    }

    #[test]
    fn serialises_mode_tag() {
        let json = serde_json::to_value(GeneratorConfig::single(20)).unwrap();
        assert_eq!(json["mode"], "single");
        assert_eq!(json["cell_size"], 20);
    }
}
