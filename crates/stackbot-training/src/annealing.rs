//! Simulated annealing over placement weights.
//!
//! # Algorithm
//!
//! The annealer keeps a *current* weight vector and the *best* one seen so far.
//! Each iteration:
//!
//! 1. **Propose** - add `N(0, σ)` noise to every component of the current weights. Every
//!    `iterations / restarts` iterations (never on the first) the proposal is instead a
//!    fresh [`random_restart`](crate::weights::random_restart), which also replaces the
//!    current weights outright
//! 2. **Score** - evaluate the proposal with the [`Objective`]
//! 3. **Accept** - with `delta = score - best_score`, accept when `delta >= 0`, otherwise with
//!    probability `exp(delta / T)`. Accepted proposals become current; strictly better ones
//!    also become best
//! 4. **Cool** - `T *= cooling_rate`
//!
//! Note that acceptance compares against the best score, not the current one.
//!
//! # Example
//!
//! ```
//! use stackbot_evaluator::placement_evaluator::WeightVector;
//! use stackbot_training::{
//!     annealing::{AnnealingParams, Annealer},
//!     objective::Objective,
//! };
//!
//! struct PreferHoles;
//!
//! impl Objective for PreferHoles {
//!     fn score(&self, weights: &WeightVector) -> f32 {
//!         -(weights.holes() - 3.0).abs()
//!     }
//! }
//!
//! let params = AnnealingParams {
//!     iterations: 200,
//!     ..AnnealingParams::default()
//! };
//! let result = Annealer::new(params, PreferHoles, WeightVector::default(), rand::rng())
//!     .unwrap()
//!     .run();
//! assert_eq!(result.iterations, 200);
//! assert!(result.score >= PreferHoles.score(&WeightVector::default()));
//! ```

use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use stackbot_evaluator::placement_evaluator::WeightVector;

use crate::{objective::Objective, weights};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingParams {
    pub initial_temperature: f32,
    /// Factor applied to the temperature after every iteration.
    pub cooling_rate: f32,
    pub iterations: usize,
    /// Standard deviation of the per-component perturbation.
    pub noise_sigma: f32,
    /// Number of evenly spaced random restarts; `0` disables them.
    pub restarts: usize,
}

impl Default for AnnealingParams {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.9999,
            iterations: 1500,
            noise_sigma: 0.1,
            restarts: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnnealingParamsError {
    #[display("initial temperature must be positive and finite, got {value}")]
    InvalidTemperature { value: f32 },
    #[display("cooling rate must be in (0, 1], got {value}")]
    InvalidCoolingRate { value: f32 },
    #[display("noise sigma must be non-negative and finite, got {value}")]
    InvalidNoiseSigma { value: f32 },
}

impl AnnealingParams {
    pub fn validate(&self) -> Result<(), AnnealingParamsError> {
        let Self {
            initial_temperature,
            cooling_rate,
            noise_sigma,
            ..
        } = *self;
        if !(initial_temperature.is_finite() && initial_temperature > 0.0) {
            return Err(AnnealingParamsError::InvalidTemperature {
                value: initial_temperature,
            });
        }
        if !(cooling_rate > 0.0 && cooling_rate <= 1.0) {
            return Err(AnnealingParamsError::InvalidCoolingRate {
                value: cooling_rate,
            });
        }
        if !(noise_sigma.is_finite() && noise_sigma >= 0.0) {
            return Err(AnnealingParamsError::InvalidNoiseSigma {
                value: noise_sigma,
            });
        }
        Ok(())
    }

    /// Number of iterations between restarts, or `None` when restarts are disabled.
    ///
    /// Restarts are also disabled when there are more restarts than iterations.
    #[must_use]
    pub fn restart_interval(&self) -> Option<usize> {
        self.iterations
            .checked_div(self.restarts)
            .filter(|&interval| interval > 0)
    }
}

/// What happened during one annealing iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationReport {
    pub iteration: usize,
    /// Temperature used for the acceptance decision.
    pub temperature: f32,
    pub candidate: WeightVector,
    pub score: f32,
    pub accepted: bool,
    pub restarted: bool,
    /// Best score after this iteration.
    pub best_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnealingResult {
    pub weights: WeightVector,
    pub score: f32,
    pub iterations: usize,
}

#[derive(Debug)]
pub struct Annealer<O, R> {
    params: AnnealingParams,
    objective: O,
    rng: R,
    noise: Normal<f32>,
    temperature: f32,
    iteration: usize,
    current: WeightVector,
    best: WeightVector,
    best_score: f32,
}

impl<O, R> Annealer<O, R>
where
    O: Objective,
    R: Rng,
{
    /// Validates `params` and scores the initial weights.
    pub fn new(
        params: AnnealingParams,
        objective: O,
        initial: WeightVector,
        rng: R,
    ) -> Result<Self, AnnealingParamsError> {
        params.validate()?;
        let noise = Normal::new(0.0, params.noise_sigma).map_err(|_| {
            AnnealingParamsError::InvalidNoiseSigma {
                value: params.noise_sigma,
            }
        })?;
        let best_score = objective.score(&initial);
        log::info!(
            "annealing start: {} iterations, T0 = {}, initial score {best_score}",
            params.iterations,
            params.initial_temperature
        );
        Ok(Self {
            params,
            objective,
            rng,
            noise,
            temperature: params.initial_temperature,
            iteration: 0,
            current: initial,
            best: initial,
            best_score,
        })
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    #[must_use]
    pub fn current(&self) -> &WeightVector {
        &self.current
    }

    #[must_use]
    pub fn best(&self) -> &WeightVector {
        &self.best
    }

    #[must_use]
    pub fn best_score(&self) -> f32 {
        self.best_score
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.iteration >= self.params.iterations
    }

    /// Runs one iteration, or returns `None` once all iterations are done.
    pub fn step(&mut self) -> Option<IterationReport> {
        if self.is_finished() {
            return None;
        }
        let iteration = self.iteration;

        let restarted = iteration > 0
            && self
                .params
                .restart_interval()
                .is_some_and(|interval| iteration.is_multiple_of(interval));
        let candidate = if restarted {
            let fresh = weights::random_restart(&mut self.rng);
            log::debug!("iteration {iteration}: restart from [{fresh}]");
            self.current = fresh;
            fresh
        } else {
            weights::perturb(&self.current, &self.noise, &mut self.rng)
        };

        let score = self.objective.score(&candidate);
        let delta = score - self.best_score;
        let accepted =
            delta >= 0.0 || self.rng.random::<f32>() < (delta / self.temperature).exp();
        if accepted {
            self.current = candidate;
            if score > self.best_score {
                self.best = candidate;
                self.best_score = score;
            }
        }
        log::trace!(
            "iteration {iteration}: score {score}, delta {delta}, T = {}, accepted: {accepted}",
            self.temperature
        );

        let report = IterationReport {
            iteration,
            temperature: self.temperature,
            candidate,
            score,
            accepted,
            restarted,
            best_score: self.best_score,
        };
        self.temperature *= self.params.cooling_rate;
        self.iteration += 1;
        Some(report)
    }

    /// Runs the remaining iterations and returns the best weights found.
    #[must_use]
    pub fn run(mut self) -> AnnealingResult {
        while self.step().is_some() {}
        self.into_result()
    }

    #[must_use]
    pub fn into_result(self) -> AnnealingResult {
        log::info!(
            "annealing finished after {} iterations: best score {}",
            self.iteration,
            self.best_score
        );
        AnnealingResult {
            weights: self.best,
            score: self.best_score,
            iterations: self.iteration,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// Negated squared distance to a fixed target.
    struct Target(WeightVector);

    impl Objective for Target {
        fn score(&self, weights: &WeightVector) -> f32 {
            -weights
                .as_array()
                .iter()
                .zip(self.0.as_array())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f32>()
        }
    }

    /// Every evaluation scores one lower than the previous one.
    #[derive(Default)]
    struct Worsening {
        calls: Cell<u16>,
    }

    impl Objective for Worsening {
        fn score(&self, _weights: &WeightVector) -> f32 {
            let calls = self.calls.get();
            self.calls.set(calls + 1);
            -f32::from(calls)
        }
    }

    struct Constant;

    impl Objective for Constant {
        fn score(&self, _weights: &WeightVector) -> f32 {
            1.0
        }
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_default_params() {
        let params = AnnealingParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.restart_interval(), Some(30));
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let base = AnnealingParams::default();
        for value in [0.0, -1.0, f32::INFINITY, f32::NAN] {
            let params = AnnealingParams {
                initial_temperature: value,
                ..base
            };
            assert!(matches!(
                params.validate(),
                Err(AnnealingParamsError::InvalidTemperature { .. })
            ));
        }
        for value in [0.0, 1.5, f32::NAN] {
            let params = AnnealingParams {
                cooling_rate: value,
                ..base
            };
            assert!(matches!(
                params.validate(),
                Err(AnnealingParamsError::InvalidCoolingRate { .. })
            ));
        }
        let params = AnnealingParams {
            noise_sigma: -0.1,
            ..base
        };
        assert!(matches!(
            Annealer::new(params, Constant, WeightVector::default(), rng()),
            Err(AnnealingParamsError::InvalidNoiseSigma { .. })
        ));
    }

    #[test]
    fn test_restart_interval() {
        let params = |iterations, restarts| AnnealingParams {
            iterations,
            restarts,
            ..AnnealingParams::default()
        };
        assert_eq!(params(10, 2).restart_interval(), Some(5));
        assert_eq!(params(10, 0).restart_interval(), None);
        assert_eq!(params(10, 20).restart_interval(), None);
    }

    #[test]
    fn test_restarts_happen_on_schedule() {
        let params = AnnealingParams {
            iterations: 12,
            restarts: 3,
            ..AnnealingParams::default()
        };
        let mut annealer = Annealer::new(params, Constant, WeightVector::default(), rng())
            .unwrap();
        let mut restarted = vec![];
        while let Some(report) = annealer.step() {
            if report.restarted {
                restarted.push(report.iteration);
                for (w, sign) in report.candidate.as_array().iter().zip(weights::RESTART_SIGNS) {
                    assert!(*w == 0.0 || w.signum() == sign);
                }
            }
        }
        assert_eq!(restarted, [4, 8]);
        assert!(annealer.step().is_none());
    }

    #[test]
    fn test_temperature_cools_every_iteration() {
        let params = AnnealingParams {
            initial_temperature: 10.0,
            cooling_rate: 0.5,
            iterations: 4,
            ..AnnealingParams::default()
        };
        let mut annealer = Annealer::new(params, Constant, WeightVector::default(), rng())
            .unwrap();
        let temperatures: Vec<f32> = std::iter::from_fn(|| annealer.step())
            .map(|report| report.temperature)
            .collect();
        assert_eq!(temperatures, [10.0, 5.0, 2.5, 1.25]);
        assert!((annealer.temperature() - 0.625).abs() < f32::EPSILON);
    }

    #[test]
    fn test_equal_scores_are_accepted() {
        let params = AnnealingParams {
            iterations: 20,
            restarts: 0,
            ..AnnealingParams::default()
        };
        let mut annealer = Annealer::new(params, Constant, WeightVector::default(), rng())
            .unwrap();
        while let Some(report) = annealer.step() {
            assert!(report.accepted);
            assert_eq!(*annealer.current(), report.candidate);
        }
        // never strictly better, so best stays the initial weights
        assert_eq!(*annealer.best(), WeightVector::default());
    }

    #[test]
    fn test_regressions_rejected_when_cold() {
        let params = AnnealingParams {
            initial_temperature: 1e-6,
            iterations: 20,
            restarts: 0,
            ..AnnealingParams::default()
        };
        let initial = WeightVector::default();
        let mut annealer = Annealer::new(params, Worsening::default(), initial, rng())
            .unwrap();
        while let Some(report) = annealer.step() {
            assert!(!report.accepted);
            assert!(report.best_score.abs() < f32::EPSILON);
        }
        assert_eq!(*annealer.current(), initial);
        let result = annealer.into_result();
        assert_eq!(result.weights, initial);
        assert_eq!(result.iterations, 20);
    }

    #[test]
    fn test_regressions_accepted_when_hot() {
        let params = AnnealingParams {
            initial_temperature: 1e9,
            cooling_rate: 1.0,
            iterations: 20,
            restarts: 0,
            ..AnnealingParams::default()
        };
        let mut annealer = Annealer::new(
            params,
            Worsening::default(),
            WeightVector::default(),
            rng(),
        )
        .unwrap();
        let accepted = std::iter::from_fn(|| annealer.step())
            .filter(|report| report.accepted)
            .count();
        assert!(accepted >= 18, "only {accepted} of 20 accepted");
    }

    #[test]
    fn test_best_never_worsens() {
        let target = WeightVector::new([1.0, 2.0, -0.5, -1.0]);
        let objective = Target(target);
        let initial = WeightVector::new([0.0; 4]);
        let initial_score = objective.score(&initial);
        let params = AnnealingParams {
            iterations: 300,
            ..AnnealingParams::default()
        };
        let mut annealer = Annealer::new(params, objective, initial, rng()).unwrap();
        let mut best = initial_score;
        while let Some(report) = annealer.step() {
            assert!(report.best_score >= best);
            assert!(report.best_score >= report.score || !report.accepted);
            best = report.best_score;
        }
        let result = annealer.run();
        assert!(result.score >= initial_score);
        let rescored = Target(target).score(&result.weights);
        assert!((rescored - result.score).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_result() {
        let params = AnnealingParams {
            iterations: 50,
            restarts: 5,
            ..AnnealingParams::default()
        };
        let target = WeightVector::new([0.5, 0.5, -0.5, -0.5]);
        let a = Annealer::new(params, Target(target), WeightVector::default(), rng())
            .unwrap()
            .run();
        let b = Annealer::new(params, Target(target), WeightVector::default(), rng())
            .unwrap()
            .run();
        assert_eq!(a, b);
    }
}
