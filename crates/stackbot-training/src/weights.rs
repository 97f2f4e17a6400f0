//! Weight vector operations for simulated annealing.
//!
//! - **Perturbation**: [`perturb`] adds Gaussian noise to every component
//! - **Restart**: [`random_restart`] draws a fresh vector with the expected sign pattern
//!
//! Unlike a population-based search, weights are not clamped or normalized:
//! the placement formula already fixes the sign convention of each term, and
//! restarts re-impose the usual signs.

use rand::Rng;
use rand_distr::Normal;
use stackbot_evaluator::placement_evaluator::WeightVector;

/// Upper bound (exclusive) of restart weight magnitudes.
pub const RESTART_MAX_MAGNITUDE: f32 = 2.0;

/// Signs applied to restart weights: lines and holes positive, height and
/// pillars negative.
pub const RESTART_SIGNS: [f32; WeightVector::LEN] = [1.0, 1.0, -1.0, -1.0];

/// Returns `weights` with independent noise from `noise` added to each component.
///
/// # Examples
///
/// ```
/// use rand_distr::Normal;
/// use stackbot_evaluator::placement_evaluator::WeightVector;
/// use stackbot_training::weights;
///
/// let noise = Normal::new(0.0, 0.0).unwrap();
/// let perturbed = weights::perturb(&WeightVector::default(), &noise, &mut rand::rng());
/// assert_eq!(perturbed, WeightVector::default());
/// ```
pub fn perturb<R>(weights: &WeightVector, noise: &Normal<f32>, rng: &mut R) -> WeightVector
where
    R: Rng + ?Sized,
{
    let mut values = *weights.as_array();
    for w in &mut values {
        *w += rng.sample(noise);
    }
    WeightVector::new(values)
}

/// Draws a fresh weight vector for a restart.
///
/// Each magnitude is uniform in `[0, 2)`; signs follow [`RESTART_SIGNS`].
pub fn random_restart<R>(rng: &mut R) -> WeightVector
where
    R: Rng + ?Sized,
{
    WeightVector::new(
        RESTART_SIGNS.map(|sign| sign * rng.random_range(0.0..RESTART_MAX_MAGNITUDE)),
    )
}
