//! RecoveryPro — loss-recovery staking calculator
//!
//! Entry point. Loads configuration, initialises structured logging,
//! applies command-line overrides, and either prints a plan or runs the
//! interactive win/loss session loop with graceful shutdown.

use std::future::Future;
use std::io::BufRead;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};

use recoverypro::config::{self, StrategySettings};
use recoverypro::display::{format_amount, series_table};
use recoverypro::engine::accountant::Accountant;
use recoverypro::engine::session::Transition;
use recoverypro::engine::tracker::SessionTracker;
use recoverypro::strategy::estimate::sessions_needed;
use recoverypro::strategy::plan;
use recoverypro::strategy::suggest::check_suggestion;
use recoverypro::types::{Currency, StrategyConfig};

const BANNER: &str = r#"
 ____                                   ____
|  _ \ ___  ___ _____   _____ _ __ _   |  _ \ _ __ ___
| |_) / _ \/ __/ _ \ \ / / _ \ '__| | | | |_) | '__/ _ \
|  _ <  __/ (_| (_) \ V /  __/ |  | |_| |  __/| | | (_) |
|_| \_\___|\___\___/ \_/ \___|_|   \__, |_|   |_|  \___/
                                   |___/
  Use at your own risk. Trading involves significant capital risk.
"#;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "recoverypro", version, about = "Loss-recovery staking calculator")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stake for every step and what a bust costs.
    Series(StrategyArgs),
    /// Suggest a base amount for the capital and goal.
    Suggest(StrategyArgs),
    /// Winning sessions needed from a given balance.
    Sessions {
        #[command(flatten)]
        strategy: StrategyArgs,
        /// Profit already made.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        balance: f64,
    },
    /// Track a live run of sessions from win/loss input.
    Run(StrategyArgs),
}

/// Overrides for the `[strategy]` section of the config file.
#[derive(Args, Debug, Clone, Default)]
struct StrategyArgs {
    #[arg(long)]
    currency: Option<Currency>,
    /// Stake for the first step.
    #[arg(long)]
    base: Option<f64>,
    /// Profit goal.
    #[arg(long)]
    goal: Option<f64>,
    /// Capital available for one full series.
    #[arg(long)]
    capital: Option<f64>,
    /// Payout percentage, e.g. 92.
    #[arg(long)]
    payout: Option<f64>,
    /// Number of steps in a session.
    #[arg(long)]
    steps: Option<usize>,
}

impl StrategyArgs {
    fn apply(&self, settings: &mut StrategySettings) {
        if let Some(c) = self.currency {
            settings.currency = c;
        }
        if let Some(b) = self.base {
            settings.base_amount = Some(b);
        }
        if let Some(g) = self.goal {
            settings.target_goal = g;
        }
        if let Some(c) = self.capital {
            settings.capital = c;
        }
        if let Some(p) = self.payout {
            settings.payout_pct = p;
        }
        if let Some(s) = self.steps {
            settings.max_steps = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let mut cfg = config::AppConfig::load_or_default(&cli.config)?;

    match &cli.command {
        Command::Series(args) => {
            args.apply(&mut cfg.strategy);
            print_series(&cfg.strategy.to_strategy()?);
        }
        Command::Suggest(args) => {
            args.apply(&mut cfg.strategy);
            print_suggestion(&cfg.strategy);
        }
        Command::Sessions { strategy, balance } => {
            strategy.apply(&mut cfg.strategy);
            let s = cfg.strategy.to_strategy()?;
            let profit = s.base_amount * s.payout_rate;
            let needed = sessions_needed(s.target_goal, *balance, profit);
            println!(
                "{needed} winning session(s) of {} needed to reach {} from {}",
                format_amount(profit, s.currency),
                format_amount(s.target_goal, s.currency),
                format_amount(*balance, s.currency),
            );
        }
        Command::Run(args) => {
            args.apply(&mut cfg.strategy);
            let strategy = cfg.strategy.to_strategy()?;
            println!("{BANNER}");
            if let Some(warning) = risk_warning(&strategy) {
                println!("{warning}");
            }
            run_interactive(strategy, &cfg.display).await?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

fn print_series(config: &StrategyConfig) {
    let p = plan(config);
    let cur = config.currency;

    print!("{}", series_table(&p.series, cur, None));
    println!();
    println!("Profit per session:  {}", format_amount(p.series.session_profit, cur));
    println!("Max session drawdown: {} ({:.1}% of capital)", format_amount(p.series.total_investment, cur), p.drawdown_pct);
    println!("Sessions to goal:    {} (best case)", p.sessions_to_goal);
    if let Some(warning) = risk_warning(config) {
        println!("{warning}");
    }
}

/// Warning line for a configuration whose full bust costs more than the
/// capital, shown before any stake is placed.
fn risk_warning(config: &StrategyConfig) -> Option<String> {
    config.is_risky().then(|| {
        format!(
            "⚠️  Risk warning: {} consecutive losses will exceed your capital ({} required, {} available).",
            config.max_steps,
            format_amount(config.series_cost(), config.currency),
            format_amount(config.capital, config.currency),
        )
    })
}

fn print_suggestion(settings: &StrategySettings) {
    let cur = settings.currency;
    let s = check_suggestion(
        settings.capital,
        settings.target_goal,
        settings.payout_rate(),
        settings.max_steps,
        cur,
    );

    println!("Suggested base amount: {}", format_amount(s.base_amount, cur));
    if s.raised_to_minimum {
        println!(
            "  (heuristic gave {}, raised to the {cur} minimum)",
            format_amount(s.heuristic_amount as f64, cur)
        );
    }
    println!("Max session drawdown:  {}", format_amount(s.series_cost, cur));
    if s.exceeds_capital {
        println!(
            "⚠️  Warning: your capital ({}) is not enough for even the minimum series cost ({}) at {} steps.",
            format_amount(settings.capital, cur),
            format_amount(s.series_cost, cur),
            settings.max_steps,
        );
    }
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Win,
    Loss,
    Status,
    Reset,
    Quit,
    Help,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "w" | "win" => Some(Input::Win),
        "l" | "loss" | "lose" => Some(Input::Loss),
        "s" | "status" => Some(Input::Status),
        "r" | "reset" => Some(Input::Reset),
        "q" | "quit" | "exit" => Some(Input::Quit),
        "h" | "help" | "?" => Some(Input::Help),
        _ => None,
    }
}

const HELP: &str = "Commands: [w]in  [l]oss  [s]tatus  [r]eset  [q]uit";

/// Why the input loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Quit,
    InputClosed,
    Shutdown,
}

async fn run_interactive(strategy: StrategyConfig, display: &config::DisplaySettings) -> Result<()> {
    let mut tracker = SessionTracker::new(strategy);

    print_status(&tracker, display);
    print_prompt(&tracker);

    let lines = spawn_stdin_reader()?;
    let exit = drive(&mut tracker, display, lines, tokio::signal::ctrl_c()).await;
    info!(?exit, "Input loop stopped");

    let summary = Accountant::summarize(&tracker);
    let cur = tracker.config().currency;
    println!();
    println!("Run summary: {summary}");
    println!(
        "Net profit {} over {} session(s); worst session {}.",
        format_amount(summary.cumulative_profit, cur),
        summary.sessions_resolved,
        format_amount(summary.worst_session, cur),
    );
    Ok(())
}

/// Read stdin on a plain OS thread and forward each line over a channel.
///
/// A blocking read parked on this thread does not hold up runtime
/// shutdown, so the process exits as soon as `main` returns.
fn spawn_stdin_reader() -> Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Failed to read from stdin");
                        break;
                    }
                };
                // Receiver gone: the loop has already stopped.
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to start the stdin reader thread")?;
    Ok(rx)
}

/// Apply input lines to the tracker until the user quits, input ends, or
/// `shutdown` completes.
async fn drive<F>(
    tracker: &mut SessionTracker,
    display: &config::DisplaySettings,
    mut lines: mpsc::Receiver<String>,
    shutdown: F,
) -> LoopExit
where
    F: Future,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Input closed.");
                    return LoopExit::InputClosed;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Some(Input::Quit) => return LoopExit::Quit,
                    Some(Input::Help) => println!("{HELP}"),
                    Some(Input::Status) => print_status(tracker, display),
                    Some(Input::Reset) => {
                        tracker.reset();
                        println!("Started over from session 1.");
                    }
                    Some(Input::Win | Input::Loss) if tracker.is_goal_reached() => {
                        println!("Goal reached. Type r to start over or q to quit.");
                    }
                    Some(Input::Win) => {
                        let t = tracker.on_win();
                        report_transition(tracker, &t);
                    }
                    Some(Input::Loss) => {
                        let t = tracker.on_loss();
                        report_transition(tracker, &t);
                        if display.show_steps && !t.closes_session() {
                            print_steps(tracker);
                        }
                    }
                    None => println!("Unknown command {:?}. {HELP}", line.trim()),
                }
                print_prompt(tracker);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                return LoopExit::Shutdown;
            }
        }
    }
}

fn report_transition(tracker: &SessionTracker, t: &Transition) {
    let cur = tracker.config().currency;
    match t {
        Transition::Won { entry, step } => println!(
            "✓ Session {} won at step {}: +{}",
            entry.session,
            step + 1,
            format_amount(entry.profit_delta, cur)
        ),
        Transition::Advanced { step } => println!(
            "✗ Loss. Investment increased to recover previous {} loss(es) in this session ({} so far).",
            step,
            format_amount(tracker.loss_so_far(), cur)
        ),
        Transition::Busted { entry } => println!(
            "✗ Session {} busted: {}",
            entry.session,
            format_amount(entry.profit_delta, cur)
        ),
    }
    if tracker.is_goal_reached() {
        println!(
            "🎯 Goal of {} reached with {} profit.",
            format_amount(tracker.config().target_goal, cur),
            format_amount(tracker.state().cumulative_profit, cur)
        );
    }
}

fn print_prompt(tracker: &SessionTracker) {
    if tracker.is_goal_reached() {
        return;
    }
    let state = tracker.state();
    println!(
        "Session {} | Step {} / {} | Stake {}",
        state.current_session,
        state.current_step + 1,
        tracker.config().max_steps,
        format_amount(tracker.current_stake(), tracker.config().currency),
    );
}

fn print_steps(tracker: &SessionTracker) {
    let statuses = tracker.step_statuses();
    print!(
        "{}",
        series_table(tracker.series(), tracker.config().currency, Some(&statuses[..]))
    );
}

fn print_status(tracker: &SessionTracker, display: &config::DisplaySettings) {
    let cur = tracker.config().currency;
    let state = tracker.state();
    let win_rate = tracker
        .win_rate()
        .map(|r| format!("{:.0}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "Profit {} | Goal {} ({:.0}%) | Win rate {} | Sessions left ≥ {}",
        format_amount(state.cumulative_profit, cur),
        format_amount(tracker.config().target_goal, cur),
        tracker.goal_progress_percent().clamp(0.0, 100.0),
        win_rate,
        tracker.sessions_remaining(),
    );
    if display.show_steps {
        print_steps(tracker);
    }
    for entry in state.history().iter().take(display.history_rows) {
        println!(
            "  #{:<4} {:<4} {}",
            entry.session,
            entry.result.to_string(),
            format_amount(entry.profit_delta, cur)
        );
    }
}

/// Initialise the `tracing` subscriber. Logs go to stderr so they don't
/// interleave with the interactive prompt on stdout.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recoverypro=info"));

    let json_logging = std::env::var("RECOVERYPRO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tracker() -> SessionTracker {
        SessionTracker::new(
            StrategyConfig::new(10.0, 0.92, 3, 50.0, 1000.0, Currency::Usd).unwrap(),
        )
    }

    async fn feed(lines: &[&str]) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        for line in lines {
            tx.send(line.to_string()).await.unwrap();
        }
        (tx, rx)
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop_while_input_is_open() {
        let mut t = tracker();
        let display = config::DisplaySettings::default();
        // The sender stays alive, like a terminal that never sends EOF.
        let (_tx, rx) = feed(&["w", "l"]).await;
        let shutdown = tokio::time::sleep(Duration::from_millis(50));

        let exit = tokio::time::timeout(
            Duration::from_secs(5),
            drive(&mut t, &display, rx, shutdown),
        )
        .await
        .expect("loop must stop once shutdown fires");

        assert_eq!(exit, LoopExit::Shutdown);
        assert_eq!(t.state().current_session, 2);
        assert_eq!(t.state().current_step, 1);
    }

    #[tokio::test]
    async fn test_closed_input_stops_loop() {
        let mut t = tracker();
        let display = config::DisplaySettings::default();
        let (tx, rx) = feed(&["l", "", "nonsense"]).await;
        drop(tx);

        let exit = drive(&mut t, &display, rx, std::future::pending::<()>()).await;
        assert_eq!(exit, LoopExit::InputClosed);
        assert_eq!(t.state().current_step, 1);
    }

    #[tokio::test]
    async fn test_quit_ignores_later_input() {
        let mut t = tracker();
        let display = config::DisplaySettings::default();
        let (_tx, rx) = feed(&["w", "q", "w"]).await;

        let exit = drive(&mut t, &display, rx, std::future::pending::<()>()).await;
        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(t.state().current_session, 2);
        assert_eq!(t.state().history().len(), 1);
    }

    #[tokio::test]
    async fn test_win_and_loss_refused_after_goal() {
        let mut t = SessionTracker::new(
            StrategyConfig::new(10.0, 0.92, 3, 9.0, 1000.0, Currency::Usd).unwrap(),
        );
        let display = config::DisplaySettings::default();
        let (tx, rx) = feed(&["w", "w", "l"]).await;
        drop(tx);

        drive(&mut t, &display, rx, std::future::pending::<()>()).await;
        assert!(t.is_goal_reached());
        assert_eq!(t.state().history().len(), 1);
        assert_eq!(t.state().current_step, 0);
    }

    #[test]
    fn test_risk_warning_when_bust_exceeds_capital() {
        let risky = StrategyConfig::new(10.0, 0.92, 8, 50.0, 1000.0, Currency::Usd).unwrap();
        let warning = risk_warning(&risky).unwrap();
        assert!(warning.contains("8 consecutive losses"));
        assert!(warning.contains("$1,000 available"));

        let safe = StrategyConfig::new(10.0, 0.92, 3, 50.0, 1000.0, Currency::Usd).unwrap();
        assert_eq!(risk_warning(&safe), None);
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("w"), Some(Input::Win));
        assert_eq!(parse_input(" LOSS "), Some(Input::Loss));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("?"), Some(Input::Help));
        assert_eq!(parse_input("maybe"), None);
    }

    #[test]
    fn test_args_override_settings() {
        let mut settings = StrategySettings::default();
        let args = StrategyArgs {
            currency: Some(Currency::Pkr),
            base: Some(400.0),
            steps: Some(5),
            ..Default::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.currency, Currency::Pkr);
        assert_eq!(settings.base_amount, Some(400.0));
        assert_eq!(settings.max_steps, 5);
        assert_eq!(settings.capital, 1000.0);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "recoverypro", "series", "--base", "10", "--payout", "92", "--steps", "3",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Series(ref a) if a.steps == Some(3)));
        assert_eq!(cli.config, "config.toml");

        let cli = Cli::try_parse_from([
            "recoverypro", "sessions", "--balance", "-74.43", "--currency", "usd",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Sessions { balance, .. } if balance < 0.0));
    }
}
