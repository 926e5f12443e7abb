#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays and inspects Encircle levels.

mod config;
mod level_transfer;
mod play;
mod render;
mod session;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use encircle_core::{Cell, EnemyGoal, LevelData, ObstacleSet, PawnId};
use encircle_system_pathfinding::Pathfinder;
use encircle_world::query;
use log::info;

use config::Settings;
use play::Pacing;
use session::Session;

/// Turn-based puzzle: surround the enemy pawns before they reach their targets.
#[derive(Debug, Parser)]
#[command(name = "encircle", version)]
struct Cli {
    /// TOML file with pathfinding tuning.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Plays a level interactively on standard input.
    Play {
        #[command(flatten)]
        source: LevelSource,
        /// Wait out pawn animations and outcome reveal delays.
        #[arg(long)]
        pace: bool,
    },
    /// Prints the distance field an enemy pawn sees toward its goal.
    Inspect {
        #[command(flatten)]
        source: LevelSource,
        /// Identifier of the enemy pawn to inspect.
        #[arg(long)]
        pawn: u32,
        /// Ignore enter-risk flags while flooding.
        #[arg(long)]
        no_risk: bool,
    },
    /// Prints the route an enemy pawn would take from its current cell.
    Path {
        #[command(flatten)]
        source: LevelSource,
        /// Identifier of the enemy pawn.
        #[arg(long)]
        pawn: u32,
    },
    /// Prints the share code for a level.
    Export {
        #[command(flatten)]
        source: LevelSource,
    },
    /// Converts a share code into a JSON level file.
    Import {
        /// Share code produced by `export`.
        code: String,
        /// Destination file; standard output when omitted.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Where the level comes from.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct LevelSource {
    /// JSON level file.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Level share code.
    #[arg(long)]
    code: Option<String>,
}

impl LevelSource {
    fn load(&self) -> Result<LevelData> {
        match (&self.level, &self.code) {
            (Some(path), _) => read_level(path),
            (None, Some(code)) => {
                level_transfer::decode(code).context("failed to decode share code")
            }
            (None, None) => bail!("either --level or --code is required"),
        }
    }
}

fn read_level(path: &Path) -> Result<LevelData> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse level file {}", path.display()))
}

/// Entry point for the Encircle command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let pathfinder = Pathfinder::new(settings.pathfinding);

    match cli.command {
        CliCommand::Play { source, pace } => {
            let mut session = started_session(pathfinder, &source)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            play::run(
                &mut session,
                stdin.lock(),
                &mut stdout,
                Pacing { enabled: pace },
            )
        }
        CliCommand::Inspect {
            source,
            pawn,
            no_risk,
        } => {
            let session = started_session(pathfinder.clone(), &source)?;
            let (start, goal) = enemy_route(&session, PawnId::new(pawn))?;
            let field = pathfinder
                .distance_field(
                    start,
                    goal,
                    &query::occupancy_view(session.world()),
                    ObstacleSet::ALL,
                    !no_risk,
                )
                .ok_or_else(|| anyhow!("search region for pawn #{pawn} is empty"))?;
            print!("{}", render::distance_field(&field, start, goal));
            Ok(())
        }
        CliCommand::Path { source, pawn } => {
            let session = started_session(pathfinder.clone(), &source)?;
            let (start, goal) = enemy_route(&session, PawnId::new(pawn))?;
            let result = pathfinder.find_path(
                start,
                goal,
                &query::occupancy_view(session.world()),
                ObstacleSet::ALL,
                &[],
            );
            print!("{}", render::path(&result));
            Ok(())
        }
        CliCommand::Export { source } => {
            let level = source.load()?;
            level.validate().context("level is invalid")?;
            println!("{}", level_transfer::encode(&level)?);
            Ok(())
        }
        CliCommand::Import { code, output } => {
            let level = level_transfer::decode(&code).context("failed to decode share code")?;
            let json = serde_json::to_string_pretty(&level).context("failed to encode level")?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("level written to {}", path.display());
                }
                None => {
                    let mut stdout = io::stdout();
                    writeln!(stdout, "{json}").context("failed to write output")?;
                }
            }
            Ok(())
        }
    }
}

fn started_session(pathfinder: Pathfinder, source: &LevelSource) -> Result<Session> {
    let level = source.load()?;
    let mut session = Session::new(pathfinder);
    let _ = session.start(level).context("level is invalid")?;
    Ok(session)
}

/// Current cell of an enemy pawn and the cell of its goal.
fn enemy_route(session: &Session, pawn: PawnId) -> Result<(Cell, Cell)> {
    let enemies = query::enemy_view(session.world());
    let enemy = enemies
        .iter()
        .find(|enemy| enemy.id == pawn)
        .ok_or_else(|| anyhow!("pawn #{} is not an enemy pawn", pawn.get()))?;

    let occupancy = query::occupancy_view(session.world());
    let goal = match enemy.goal {
        EnemyGoal::Target(target) => occupancy.cell_of_target(target),
        EnemyGoal::Pawn(partner) => occupancy.cell_of_pawn(partner),
    }
    .ok_or_else(|| anyhow!("goal of pawn #{} is missing from the board", pawn.get()))?;

    Ok((enemy.cell, goal))
}
