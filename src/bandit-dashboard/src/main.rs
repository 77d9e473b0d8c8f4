//! Bandit Dashboard: terminal front end for the Epsilon-Greedy, UCB1 and
//! Thompson Sampling teaching pages.
//!
//! Main entry point: loads configuration, builds a session and renders it.

mod render;

use bandit_analytics::StepLogger;
use bandit_core::config::AppConfig;
use bandit_core::event_bus::{noop_sink, StepSink};
use bandit_core::types::Algorithm;
use bandit_simulator::{ProbabilityMode, RewardEnvironment, Session, SessionParams};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bandit-dashboard")]
#[command(about = "Teaching dashboard for multi-armed bandit algorithms")]
#[command(version)]
struct Cli {
    /// Emit structured JSON logs on stderr
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulated session for one algorithm and render the results
    Run(RunArgs),
    /// Describe the three algorithms
    Algorithms,
    /// Delete an algorithm's step log
    Reset {
        #[arg(value_parser = parse_algorithm)]
        algorithm: Algorithm,

        /// Directory holding the log files (overrides config)
        #[arg(long, env = "BANDIT_DASHBOARD__LOGGING__LOG_DIR")]
        log_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// epsilon-greedy, ucb1 or thompson
    #[arg(value_parser = parse_algorithm)]
    algorithm: Algorithm,

    /// Number of arms (overrides config)
    #[arg(long, env = "BANDIT_DASHBOARD__SESSION__N_ARMS")]
    arms: Option<usize>,

    /// Pull this many times once (defaults to the batch size)
    #[arg(long)]
    pulls: Option<usize>,

    /// Auto-run: repeat a batch this many times
    #[arg(long)]
    auto_rounds: Option<usize>,

    /// Pulls per auto-run round (overrides config)
    #[arg(long)]
    batch: Option<usize>,

    /// Pause between auto-run rounds in milliseconds (overrides config)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Exploration rate for Epsilon-Greedy (overrides config)
    #[arg(long)]
    epsilon: Option<f64>,

    /// Thompson prior alpha (overrides config)
    #[arg(long)]
    alpha: Option<f64>,

    /// Thompson prior beta (overrides config)
    #[arg(long)]
    beta: Option<f64>,

    /// Rewards at or above this count as Thompson successes (overrides config)
    #[arg(long)]
    threshold: Option<f64>,

    /// Manual true probabilities, comma-separated (random when absent)
    #[arg(long)]
    probs: Option<String>,

    /// Seed for reproducible runs (overrides config)
    #[arg(long, env = "BANDIT_DASHBOARD__SESSION__SEED")]
    seed: Option<u64>,

    /// CSV log path (defaults to <log_dir>/<key>_logs.csv)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Do not write the CSV step log
    #[arg(long, default_value_t = false)]
    no_log: bool,

    /// Print the final snapshot as JSON instead of the text dashboard
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    s.parse::<Algorithm>().map_err(|e| e.to_string())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bandit_dashboard=info,bandit_simulator=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config() -> AppConfig {
    AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = load_config();
    match cli.command {
        Command::Run(args) => run(config, args),
        Command::Algorithms => {
            render::print_home();
            Ok(())
        }
        Command::Reset { algorithm, log_dir } => {
            let dir = log_dir.unwrap_or_else(|| PathBuf::from(&config.logging.log_dir));
            let path = StepLogger::default_path(dir, algorithm);
            if StepLogger::remove(&path)? {
                println!("Removed {}", path.display());
            } else {
                println!("Nothing to remove at {}", path.display());
            }
            Ok(())
        }
    }
}

fn run(mut config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    // Apply CLI overrides
    if let Some(arms) = args.arms {
        config.session.n_arms = arms;
    }
    if let Some(batch) = args.batch {
        config.session.batch = batch;
    }
    if let Some(delay) = args.delay_ms {
        config.session.auto_delay_ms = delay;
    }
    if let Some(seed) = args.seed {
        config.session.seed = Some(seed);
    }
    if let Some(epsilon) = args.epsilon {
        config.epsilon_greedy.epsilon = epsilon;
    }
    if let Some(alpha) = args.alpha {
        config.thompson.initial_alpha = alpha;
    }
    if let Some(beta) = args.beta {
        config.thompson.initial_beta = beta;
    }
    if let Some(threshold) = args.threshold {
        config.thompson.success_threshold = threshold;
    }
    if args.no_log {
        config.logging.enabled = false;
    }
    config.validate()?;

    info!(
        algorithm = %args.algorithm,
        n_arms = config.session.n_arms,
        seed = ?config.session.seed,
        "Configuration loaded"
    );

    let mut params = SessionParams::from_config(args.algorithm, &config);
    if let Some(text) = &args.probs {
        let env = RewardEnvironment::parse(text, config.session.n_arms)?;
        params.mode = ProbabilityMode::Manual(env.true_probs().to_vec());
    }

    let sink: Arc<dyn StepSink> = if config.logging.enabled {
        let logger = match &args.log {
            Some(path) => StepLogger::open(path)?,
            None => StepLogger::for_algorithm(&config.logging.log_dir, args.algorithm)?,
        };
        Arc::new(logger)
    } else {
        noop_sink()
    };

    let mut session = Session::start(params, sink)?;

    match args.auto_rounds {
        Some(rounds) => {
            let delay = Duration::from_millis(config.session.auto_delay_ms);
            session.auto_run(rounds, config.session.batch, delay, |round, records| {
                let rewards: f64 = records.iter().map(|r| r.reward).sum();
                info!(round = round + 1, rounds, rewards, "Auto-run round finished");
            })?;
        }
        None => {
            session.pull_batch(args.pulls.unwrap_or(config.session.batch))?;
        }
    }

    if args.json {
        let summary = render::Summary::from_session(&session, config.session.rmse_window);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render::print_dashboard(&session, config.session.rmse_window);
    }

    Ok(())
}
