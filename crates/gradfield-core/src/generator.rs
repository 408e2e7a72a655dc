//! Entry point: validates a configuration, lowers it to a pass schedule and
//! runs the schedule on the block scheduler.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{FieldError, Result};
use crate::field::ScalarField;
use crate::noise::fbm::{composite, OctaveSchedule};
use crate::noise::params::GeneratorConfig;
use crate::scheduler::BlockScheduler;

/// Field generator bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct FieldGenerator {
    config: GeneratorConfig,
}

impl FieldGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Validate `width × height` against the configuration and return the
    /// lowered schedule and scheduler. Nothing is allocated for the field yet.
    pub fn plan(&self, width: usize, height: usize) -> Result<(OctaveSchedule, BlockScheduler)> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidDimensions {
                width,
                height,
                reason: "width and height must be positive".into(),
            });
        }
        let scheduler = BlockScheduler::new(self.config.workers)?;
        let schedule = OctaveSchedule::for_mode(&self.config.mode, width)?;
        schedule.validate(width, height, self.config.edges)?;
        Ok((schedule, scheduler))
    }

    /// Generate a field, seeding lattices from `config.seed` or OS entropy.
    pub fn generate(&self, width: usize, height: usize) -> Result<ScalarField> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with_rng(width, height, &mut rng)
    }

    /// Generate a field drawing every lattice from `rng`, ignoring `config.seed`.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Result<ScalarField> {
        let (schedule, scheduler) = self.plan(width, height)?;
        tracing::debug!(
            width,
            height,
            passes = schedule.len(),
            workers = scheduler.workers(),
            edges = ?self.config.edges,
            "generating field"
        );
        composite(width, height, &schedule, &scheduler, rng)
    }
}

/// Generate a `width × height` field for `config`.
pub fn generate(width: usize, height: usize, config: &GeneratorConfig) -> Result<ScalarField> {
    FieldGenerator::new(config.clone()).generate(width, height)
}

/// Bounds-checked read of `field` at `(x, y)`.
pub fn field_value(field: &ScalarField, x: usize, y: usize) -> Option<f32> {
    field.get(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::params::EdgeMode;

    #[test]
    fn zero_dimensions_rejected() {
        let gen = FieldGenerator::new(GeneratorConfig::single(4));
        assert!(matches!(gen.generate(0, 8), Err(FieldError::InvalidDimensions { .. })));
        assert!(matches!(gen.generate(8, 0), Err(FieldError::InvalidDimensions { .. })));
    }

    #[test]
    fn zero_workers_rejected_before_work() {
        let gen = FieldGenerator::new(GeneratorConfig::single(4).with_workers(0));
        assert!(matches!(gen.generate(8, 8), Err(FieldError::InvalidWorkerCount)));
    }

    #[test]
    fn strict_mode_rejects_remainder() {
        let cfg = GeneratorConfig::single(3).with_edges(EdgeMode::Strict);
        assert!(matches!(generate(10, 10, &cfg), Err(FieldError::InvalidDimensions { .. })));
    }

    #[test]
    fn clip_mode_accepts_remainder() {
        let cfg = GeneratorConfig::single(3).with_seed(1);
        let field = generate(10, 10, &cfg).unwrap();
        assert_eq!(field.len(), 100);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let cfg = GeneratorConfig::fixed_schedule().with_seed(31);
        assert_eq!(generate(160, 80, &cfg).unwrap(), generate(160, 80, &cfg).unwrap());
    }

    #[test]
    fn unseeded_generation_succeeds() {
        let field = generate(40, 40, &GeneratorConfig::single(20)).unwrap();
        assert!(field.data().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn field_value_is_bounds_checked() {
        let field = generate(20, 20, &GeneratorConfig::single(10).with_seed(3)).unwrap();
        assert!(field_value(&field, 19, 19).is_some());
        assert!(field_value(&field, 20, 0).is_none());
    }
}
