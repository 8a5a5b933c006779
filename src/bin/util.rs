use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use gameday::{db, importer};

#[derive(Parser)]
#[command(name = "util", about = "Gameday database utilities")]
struct Cli {
    /// SQLite database file
    #[arg(long, default_value = "gameday.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Initdb,
    /// Walk a downloaded tree and import every game directory
    Import {
        /// Root directory to search for Gameday files
        #[arg(long)]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut conn = db::open(&cli.db)?;
    match cli.command {
        Commands::Initdb => {
            db::init(&conn)?;
            info!("initialized schema in {}", cli.db.display());
        }
        Commands::Import { root } => {
            importer::import_root(&mut conn, &root)?;
        }
    }
    Ok(())
}
