use chrono::Utc;
use stackbot_engine::{Board, PieceSeed};
use stackbot_evaluator::placement_evaluator::WeightVector;
use stackbot_training::{
    annealing::{Annealer, AnnealingParams},
    objective::{AverageLinesCleared, ObjectiveParams},
};

use crate::{model::TrainedModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of annealing iterations
    #[arg(long, default_value_t = AnnealingParams::default().iterations)]
    iterations: usize,
    /// Initial temperature
    #[arg(long, default_value_t = AnnealingParams::default().initial_temperature)]
    temperature: f32,
    /// Temperature multiplier applied after every iteration
    #[arg(long, default_value_t = AnnealingParams::default().cooling_rate)]
    cooling_rate: f32,
    /// Standard deviation of the weight perturbation
    #[arg(long, default_value_t = AnnealingParams::default().noise_sigma)]
    noise_sigma: f32,
    /// Number of random restarts spread over the run (0 disables them)
    #[arg(long, default_value_t = AnnealingParams::default().restarts)]
    restarts: usize,
    /// Games played to score each candidate
    #[arg(long, default_value_t = ObjectiveParams::default().games)]
    games: usize,
    /// End each scoring game after this many pieces have locked
    #[arg(long)]
    piece_limit: Option<usize>,
    #[arg(long, default_value_t = Board::DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = Board::DEFAULT_HEIGHT)]
    height: usize,
    /// Seed of the scoring games; every candidate then plays the same pieces
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Starting weights (lines,holes,height,pillars); hand-tuned weights if omitted
    #[arg(long, allow_hyphen_values = true)]
    initial_weights: Option<WeightVector>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let annealing = AnnealingParams {
        initial_temperature: arg.temperature,
        cooling_rate: arg.cooling_rate,
        iterations: arg.iterations,
        noise_sigma: arg.noise_sigma,
        restarts: arg.restarts,
    };
    let objective = ObjectiveParams {
        games: arg.games,
        piece_limit: arg.piece_limit,
        width: arg.width,
        height: arg.height,
        seed: arg.seed,
    };
    let initial = arg.initial_weights.unwrap_or_default();

    log::info!(
        "Training for {} iterations, {} game(s) per candidate",
        annealing.iterations,
        objective.games
    );
    eprintln!("Initial weights: {initial}");
    let mut annealer = Annealer::new(
        annealing,
        AverageLinesCleared::new(objective)?,
        initial,
        rand::rng(),
    )?;
    eprintln!("Initial score:   {:.3}", annealer.best_score());

    while let Some(report) = annealer.step() {
        let mark = match (report.restarted, report.accepted) {
            (true, _) => "restart",
            (false, true) => "accept",
            (false, false) => "reject",
        };
        eprintln!(
            "#{:5} T={:8.3} | score {:8.3} | best {:8.3} | {mark:7} [{}]",
            report.iteration, report.temperature, report.score, report.best_score, report.candidate
        );
    }

    let result = annealer.into_result();
    log::info!("Training finished after {} iterations", result.iterations);
    let model = TrainedModel {
        trained_at: Utc::now(),
        best_score: result.score,
        weights: result.weights,
        iterations: result.iterations,
        annealing,
        objective,
    };
    util::print_json(&model)?;

    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Best score: {:.3}", model.best_score);
    eprintln!("  Weights:    {}", model.weights);

    Ok(())
}
