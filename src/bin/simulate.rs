use arcade_maze_engine::autopilot::Autopilot;
use arcade_maze_engine::config::EngineConfig;
use arcade_maze_engine::engine::{FrameOutcome, GameEngine};
use arcade_maze_engine::error::{ConfigError, EngineError};
use arcade_maze_engine::types::{GameState, RuntimeEvent};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const REALTIME_POLL_MS: u64 = 4;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 3)]
    runs: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 60 * 60 * 5)]
    max_ticks: u64,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    realtime: bool,
    #[arg(long)]
    json_logs: bool,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
struct EventTally {
    pellets: u32,
    #[serde(rename = "powerItems")]
    power_items: u32,
    #[serde(rename = "pursuersEaten")]
    pursuers_eaten: u32,
    deaths: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
}

impl EventTally {
    fn record(&mut self, events: &[RuntimeEvent]) {
        for event in events {
            match event {
                RuntimeEvent::PelletEaten { .. } => self.pellets += 1,
                RuntimeEvent::PowerItemEaten { .. } => self.power_items += 1,
                RuntimeEvent::PursuerEaten { .. } => self.pursuers_eaten += 1,
                RuntimeEvent::PlayerDied { .. } => self.deaths += 1,
                RuntimeEvent::LevelCompleted { .. } => self.levels_cleared += 1,
                RuntimeEvent::PowerEnded => {}
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u64,
    #[serde(rename = "finalState")]
    final_state: GameState,
    score: u32,
    level: u32,
    lives: u32,
    ticks: u64,
    #[serde(flatten)]
    tally: EventTally,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "faultCount")]
    fault_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "bestScore")]
    best_score: u32,
    runs: Vec<RunResultLine>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let base = load_config(&cli)?;
    let base_seed = cli.seed.unwrap_or(base.seed);
    let started_at = timestamp();
    let runtime = if cli.realtime {
        Some(
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
        )
    } else {
        None
    };

    let mut results = Vec::new();
    for run in 0..cli.runs {
        let config = EngineConfig {
            seed: base_seed.wrapping_add(run as u64),
            ..base.clone()
        };
        info!(run, seed = config.seed, realtime = cli.realtime, "run started");
        let result = match runtime.as_ref() {
            Some(runtime) => runtime.block_on(run_realtime(run, config, cli.max_ticks))?,
            None => run_fixed(run, config, cli.max_ticks)?,
        };
        info!(
            run,
            score = result.score,
            level = result.level,
            state = ?result.final_state,
            ticks = result.ticks,
            "run finished"
        );
        println!("{}", serde_json::to_string(&result)?);
        results.push(result);
    }

    let summary = build_run_summary(started_at, timestamp(), results);
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(path = %path.display(), error = %err, "summary write failed");
            std::process::exit(2);
        }
    }
    info!(
        runs = summary.run_count,
        faults = summary.fault_count,
        average_score = summary.average_score,
        best_score = summary.best_score,
        "simulation finished"
    );

    if summary.fault_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig, ConfigError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(path) = cli.layout.as_deref() {
        config.layout = EngineConfig::load_layout(path)?;
    }
    Ok(config)
}

/// Fixed-step run: one nominal frame interval per step, as fast as possible.
fn run_fixed(run: u32, config: EngineConfig, max_ticks: u64) -> Result<RunResultLine, EngineError> {
    let seed = config.seed;
    let step_ms = config.frame_interval_ms().round() as u64;
    let mut engine = GameEngine::new(config)?;
    let mut pilot = Autopilot::new();
    let mut tally = EventTally::default();
    let mut fault = None;

    engine.start();
    for _ in 0..max_ticks {
        if engine.state() == GameState::GameOver {
            break;
        }
        let snapshot = engine.snapshot();
        if let Some(intent) = pilot.next_intent(&snapshot, engine.maze()) {
            engine.submit_intent(intent);
        }
        if let Err(err) = engine.step(step_ms) {
            warn!(run, error = %err, "run halted by engine fault");
            fault = Some(err.to_string());
            break;
        }
        tally.record(&engine.drain_events());
    }

    engine.cleanup();
    Ok(finish_run(run, seed, &engine, tally, fault))
}

/// Wall-clock run: a tokio interval polls `frame`, which throttles to the
/// configured rate. Ctrl-C ends the run early.
async fn run_realtime(
    run: u32,
    config: EngineConfig,
    max_ticks: u64,
) -> Result<RunResultLine, EngineError> {
    let seed = config.seed;
    let mut engine = GameEngine::new(config)?;
    let mut pilot = Autopilot::new();
    let mut tally = EventTally::default();
    let mut fault = None;

    let clock = tokio::time::Instant::now();
    let mut interval = tokio::time::interval(Duration::from_millis(REALTIME_POLL_MS));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    engine.start();
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                info!(run, "interrupted");
                break;
            }
        }
        if engine.state() == GameState::GameOver || engine.tick_count() >= max_ticks {
            break;
        }

        let snapshot = engine.snapshot();
        if let Some(intent) = pilot.next_intent(&snapshot, engine.maze()) {
            engine.submit_intent(intent);
        }
        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
        match engine.frame(now_ms) {
            Ok(FrameOutcome::Ticked | FrameOutcome::Waiting) => {
                tally.record(&engine.drain_events());
            }
            Ok(FrameOutcome::Throttled | FrameOutcome::Idle) => {}
            Err(err) => {
                warn!(run, error = %err, "run halted by engine fault");
                fault = Some(err.to_string());
                break;
            }
        }
    }

    engine.cleanup();
    Ok(finish_run(run, seed, &engine, tally, fault))
}

fn finish_run(
    run: u32,
    seed: u64,
    engine: &GameEngine,
    tally: EventTally,
    fault: Option<String>,
) -> RunResultLine {
    let snapshot = engine.snapshot();
    RunResultLine {
        run,
        seed,
        final_state: snapshot.state,
        score: snapshot.score,
        level: snapshot.level,
        lives: snapshot.lives,
        ticks: snapshot.tick,
        tally,
        fault,
    }
}

fn build_run_summary(
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
) -> RunSummary {
    let run_count = runs.len();
    let total_score: u64 = runs.iter().map(|run| run.score as u64).sum();
    let average_score = if run_count == 0 {
        0
    } else {
        (total_score / run_count as u64) as u32
    };
    RunSummary {
        started_at,
        finished_at,
        run_count,
        fault_count: runs.iter().filter(|run| run.fault.is_some()).count(),
        average_score,
        best_score: runs.iter().map(|run| run.score).max().unwrap_or(0),
        runs,
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_result(score: u32, fault: Option<&str>) -> RunResultLine {
        RunResultLine {
            run: 0,
            seed: 42,
            final_state: GameState::GameOver,
            score,
            level: 1,
            lives: 0,
            ticks: 100,
            tally: EventTally::default(),
            fault: fault.map(|reason| reason.to_string()),
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            layout: [
                "#######", "#.....#", "#.###.#", "#P..o.#", "#######", "#BKIC##", "#######",
            ]
            .iter()
            .map(|row| row.to_string())
            .collect(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn tally_counts_each_event_kind() {
        let mut tally = EventTally::default();
        tally.record(&[
            RuntimeEvent::PelletEaten { x: 1.0, y: 1.0 },
            RuntimeEvent::PelletEaten { x: 2.0, y: 1.0 },
            RuntimeEvent::PowerItemEaten { x: 3.0, y: 1.0 },
            RuntimeEvent::PowerEnded,
            RuntimeEvent::PlayerDied { lives_left: 2 },
            RuntimeEvent::LevelCompleted { cleared_level: 1 },
        ]);
        assert_eq!(
            tally,
            EventTally {
                pellets: 2,
                power_items: 1,
                pursuers_eaten: 0,
                deaths: 1,
                levels_cleared: 1,
            }
        );
    }

    #[test]
    fn build_run_summary_averages_scores_and_counts_faults() {
        let summary = build_run_summary(
            "a".to_string(),
            "b".to_string(),
            vec![
                make_result(100, None),
                make_result(300, Some("clipped")),
            ],
        );
        assert_eq!(summary.run_count, 2);
        assert_eq!(summary.average_score, 200);
        assert_eq!(summary.best_score, 300);
        assert_eq!(summary.fault_count, 1);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let target = std::env::temp_dir()
            .join(format!("arcade-maze-missing-{now}"))
            .join("summary.json");
        let summary = build_run_summary(
            timestamp(),
            timestamp(),
            vec![make_result(10, None)],
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn fixed_run_clears_a_small_level() {
        let result = run_fixed(0, small_config(), 600).expect("valid config");
        assert!(result.level >= 2);
        assert!(result.tally.levels_cleared >= 1);
        assert!(result.tally.pellets >= 10);
        assert!(result.fault.is_none());
    }

    #[test]
    fn result_line_uses_camel_case_keys() {
        let line = serde_json::to_value(make_result(5, None)).expect("serializes");
        assert_eq!(line["finalState"], "game_over");
        assert_eq!(line["levelsCleared"], 0);
        assert!(line.get("fault").is_none());
    }
}
