use anyhow::Context;
use stackbot_engine::{Board, Environment, EnvironmentConfig, GameStats, PieceSeed};
use stackbot_evaluator::{agent::Agent, placement_evaluator::WeightVector};
use stackbot_training::objective::GameSummary;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Placement weights (lines,holes,height,pillars); hand-tuned weights if omitted
    #[arg(long, allow_hyphen_values = true)]
    weights: Option<WeightVector>,
    /// Piece sequence seed (32 hex digits); random if omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    #[arg(long, default_value_t = Board::DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = Board::DEFAULT_HEIGHT)]
    height: usize,
    /// End each game after this many pieces have locked
    #[arg(long)]
    piece_limit: Option<usize>,
    /// Print the board after every locked piece
    #[arg(long, default_value_t = false)]
    render: bool,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        games,
        weights,
        seed,
        width,
        height,
        piece_limit,
        render,
    } = arg;

    let weights = weights.unwrap_or_default();
    let seed = seed.unwrap_or_else(rand::random);
    let config = EnvironmentConfig {
        width: *width,
        height: *height,
        seed: Some(seed),
    };
    let mut env = Environment::new(&config).context("Failed to create game environment")?;
    let agent = Agent::new(weights);
    log::info!("Playing {games} game(s) on a {width}x{height} board");

    eprintln!("Weights: {weights}");
    eprintln!("Seed:    {seed}");

    let mut results = Vec::with_capacity(*games);
    for game in 1..=*games {
        if game > 1 {
            env.reset();
        }
        let stats = if *render {
            play_rendered(&agent, &mut env, *piece_limit)
        } else {
            agent.play_game(&mut env, *piece_limit)
        };
        println!(
            "Game: ({game} / {games}) | Score: {}",
            stats.total_cleared_lines()
        );
        log::debug!("Game {game} ended after {} pieces", stats.locked_pieces());
        results.push(stats);
    }

    let summary = GameSummary::from_stats(&results);
    println!();
    println!("Games: {}", summary.games);
    println!("  Mean: {:.2}", summary.mean);
    println!("  Min:  {}", summary.min);
    println!("  Max:  {}", summary.max);

    Ok(())
}

fn play_rendered(agent: &Agent, env: &mut Environment, piece_limit: Option<usize>) -> GameStats {
    while !env.is_game_over()
        && piece_limit.is_none_or(|limit| env.stats().locked_pieces() < limit)
    {
        let kind = env.falling_piece().kind();
        let (target, _) = agent.play_turn(env);
        if target.is_placeable() {
            println!(
                "{kind} -> {} column {} | lines: {}",
                target.rotation(),
                target.column(),
                env.lines_cleared_count()
            );
        } else {
            println!(
                "{kind} -> no placement | lines: {}",
                env.lines_cleared_count()
            );
        }
        println!("{}", env.board());
    }
    env.stats().clone()
}
