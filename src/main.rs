//! Guildxp - Entry Point
//!
//! Command-line access to the level curve, activity log replay, admin XP
//! edits and leaderboards.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use guildxp::data::{export_default_config, load_config_or_default, DEFAULT_CONFIG_PATH};
use guildxp::progression::{calculate_level, calculate_level_progress, calculate_required_xp};
use guildxp::stats::leaderboard;
use guildxp::store::{default_store_path, MemberKey};
use guildxp::{ActivityEvent, LevelingService, MemberStore, Outcome};

#[derive(Parser)]
#[command(name = "guildxp")]
#[command(about = "Activity tracking and leveling for Discord communities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Level reached with a cumulative XP total
    Level {
        #[arg(allow_negative_numbers = true)]
        xp: i64,
    },
    /// XP needed to complete a level
    Required {
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
    /// Progress through a level band
    Progress {
        #[arg(allow_negative_numbers = true)]
        xp: i64,
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
    /// Feed a JSON-lines activity log through the leveling service
    Replay {
        events: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Overwrite a member's XP, paying rewards for any levels crossed
    SetXp {
        guild: u64,
        user: u64,
        xp: u64,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Import members exported from the legacy database
    Import {
        file: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show a guild leaderboard
    Leaderboard {
        guild: u64,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Write the default guild config as RON
    ExportConfig { path: Option<PathBuf> },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .init();

    log::info!("Starting Guildxp v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let result = run(cli.command);

    if let Err(ref e) = result {
        log::error!("Command failed: {:#}", e);
    }
    result
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Level { xp } => {
            println!("{}", calculate_level(xp)?);
        }
        Commands::Required { level } => {
            println!("{}", calculate_required_xp(level)?);
        }
        Commands::Progress { xp, level } => {
            let progress = calculate_level_progress(xp, level)?;
            println!(
                "{}/{} XP ({}%)",
                progress.current_xp, progress.required_xp, progress.percentage
            );
        }
        Commands::Replay { events, store, config } => replay(events, store, config)?,
        Commands::SetXp { guild, user, xp, store, config } => {
            let (service, store_path) = open_service(store, config)?;
            let outcome = service.set_xp(MemberKey::new(guild, user), xp);
            report(&outcome);
            service.store().save(&store_path)?;
        }
        Commands::Import { file, store, config } => {
            let (service, store_path) = open_service(store, config)?;
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {:?}", file))?;
            let outcomes = service.import_legacy(&json)?;
            outcomes.iter().for_each(report);
            service.store().save(&store_path)?;
            println!("Imported {} members", outcomes.len());
        }
        Commands::Leaderboard { guild, store, limit } => {
            let path = store.unwrap_or_else(default_store_path);
            let store = MemberStore::load(&path)
                .with_context(|| format!("loading store from {:?}", path))?;
            for stats in leaderboard(&store, guild, limit) {
                println!(
                    "#{:<3} {:<20} Lv.{:<4} {:>8} XP  {:>3}%  {}",
                    stats.rank,
                    stats.user,
                    stats.level,
                    stats.xp,
                    stats.progress.percentage,
                    stats.title
                );
            }
        }
        Commands::ExportConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
            export_default_config(&path).with_context(|| format!("writing {:?}", path))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn open_service(
    store: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<(LevelingService, PathBuf)> {
    let store_path = store.unwrap_or_else(default_store_path);
    let config_path = config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = load_config_or_default(&config_path);
    let store = MemberStore::load(&store_path)
        .with_context(|| format!("loading store from {:?}", store_path))?;
    let service = LevelingService::new(config, Arc::new(store))?;
    Ok((service, store_path))
}

fn report(outcome: &Outcome) {
    let key = outcome.key;
    if let Some(level_up) = &outcome.level_up {
        println!(
            "user {} in guild {}: level {} -> {} ({} rewards)",
            key.user,
            key.guild,
            level_up.old_level,
            level_up.new_level,
            level_up.rewards.len()
        );
    }
    for id in &outcome.achievements {
        println!("user {} in guild {}: achievement {}", key.user, key.guild, id);
    }
}

fn replay(events: PathBuf, store: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let (service, store_path) = open_service(store, config)?;

    let file = File::open(&events).with_context(|| format!("opening {:?}", events))?;
    let mut handled = 0usize;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: ActivityEvent = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: bad event", events.display(), line_no + 1))?;

        report(&service.handle_event(&event));
        handled += 1;
    }

    service.store().save(&store_path)?;
    log::info!("Replayed {} events", handled);
    Ok(())
}
