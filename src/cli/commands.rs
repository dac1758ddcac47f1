//! CLI commands

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::ApiServer;
use crate::config::Config;
use crate::core::{rules, AppState};
use crate::db::{repositories::chunk::ChunkStatus, Database};

#[derive(Parser)]
#[command(name = "tomo")]
#[command(about = "Personal productivity tracker: chunked tasks, focus sessions and XP streaks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.tomo/config.yml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Database path, overriding the config file
    #[arg(long, global = true)]
    database: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// List all tasks with their chunk progress
    Tasks,

    /// List logged focus sessions, newest first
    Sessions {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show XP, level and streaks
    Stats,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let db_path = match cli.database {
        Some(path) => std::path::PathBuf::from(path),
        None => config.resolve_db_path()?,
    };

    // Initialize database
    let db = Database::new(&db_path)?;
    let state = Arc::new(AppState::new(db));

    // Create a multi-threaded runtime for CLI operations
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match cli.command {
            Commands::Serve { host, port } => {
                let host = host.unwrap_or(config.server.host);
                let port = port.unwrap_or(config.server.port);

                let server = ApiServer::new(host, port, config.server.allowed_origins, state);
                server.run().await?;
                Ok(())
            }

            Commands::Tasks => {
                let tasks = state.tasks.list().await?;

                if tasks.is_empty() {
                    println!("No tasks found");
                } else {
                    for task in tasks {
                        let progress = rules::progress(&task.chunks);
                        println!(
                            "[{}] {} - {}/{} chunks ({:.0}%) - {}",
                            task.id.chars().take(8).collect::<String>(),
                            task.title,
                            task.chunks
                                .iter()
                                .filter(|c| c.status == ChunkStatus::Complete)
                                .count(),
                            task.chunks.len(),
                            progress * 100.0,
                            task.step.as_deref().unwrap_or("-")
                        );
                    }
                }
                Ok(())
            }

            Commands::Sessions { limit } => {
                let sessions = state.sessions.list().await?;

                if sessions.is_empty() {
                    println!("No focus sessions found");
                } else {
                    for session in sessions.into_iter().take(limit.unwrap_or(usize::MAX)) {
                        println!(
                            "{} {} / {} - {} min, +{} xp ({})",
                            session.created_at.format("%Y-%m-%d %H:%M"),
                            session.task_title,
                            session.chunk_title.as_deref().unwrap_or("-"),
                            session.duration,
                            session.xp_earned,
                            session.mood.as_deref().unwrap_or("-")
                        );
                    }
                }
                Ok(())
            }

            Commands::Stats => {
                let stats = state.stats.ensure().await?;

                println!("XP:             {}", stats.total_xp);
                println!("Level:          {}", stats.current_level);
                println!("Current streak: {}", stats.current_streak);
                println!("Longest streak: {}", stats.longest_streak);
                println!(
                    "Last active:    {}",
                    stats
                        .last_active_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                Ok(())
            }
        }
    })
}

