//! `ctyresolve` - look up callsigns and grid squares from the command line
//!
//! ```bash
//! ctyresolve lookup W1AW KH6ABC VP2E/K1ABC
//! ctyresolve --json lookup JA1XYZ
//! ctyresolve state EM10 FN31
//! ctyresolve --data-dir /usr/share/ctyresolve --user-dir ~/.local/share/ctyresolve version
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ctyresolve::{CtyDatabase, CtyRecord, DataDirs};

#[derive(Parser)]
#[command(name = "ctyresolve", version, about = "Resolve callsigns to DXCC entities using cty.dat")]
struct Cli {
    /// Directory holding the bundled cty.dat and grid.dat
    #[arg(long, env = "CTY_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory whose cty.dat / grid.dat override the bundled copies
    #[arg(long, env = "CTY_USER_DIR")]
    user_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve callsigns to their entity
    Lookup {
        #[arg(required = true)]
        calls: Vec<String>,
    },
    /// Look up the US state for grid squares
    State {
        #[arg(required = true)]
        grids: Vec<String>,
    },
    /// Show the loaded cty.dat version
    Version,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("ctyresolve=info")).init();

    let cli = Cli::parse();

    let mut dirs = DataDirs::new(&cli.data_dir);
    if let Some(user_dir) = &cli.user_dir {
        dirs = dirs.with_user_dir(user_dir);
    }

    let db = match CtyDatabase::open(dirs) {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to load reference data: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Lookup { calls } => {
            for call in &calls {
                let record = db.resolve(call);
                if cli.json {
                    print_json(&serde_json::json!({ "call": call, "record": record }));
                } else {
                    println!("{}", describe(call, &record));
                }
            }
        }
        Command::State { grids } => {
            for grid in &grids {
                let state = db.lookup_state(grid);
                if cli.json {
                    print_json(&serde_json::json!({ "grid": grid, "state": state }));
                } else {
                    println!("{grid}: {state}");
                }
            }
        }
        Command::Version => {
            let date = db.version_date().map(|d| d.to_string()).unwrap_or_default();
            if cli.json {
                print_json(&serde_json::json!({
                    "version": db.version(),
                    "date": date,
                    "name": db.version_name(),
                }));
            } else {
                println!("{} {} {}", db.version(), date, db.version_name());
            }
        }
    }

    ExitCode::SUCCESS
}

fn describe(call: &str, r: &CtyRecord) -> String {
    if r.is_empty() {
        return format!("{call}: no match");
    }
    format!(
        "{call}: {} ({}) {} CQ {} ITU {} {:.2}/{:.2} UTC{:+}{}",
        r.entity_name,
        r.primary_prefix,
        r.continent,
        r.cq_zone,
        r.itu_zone,
        r.latitude,
        r.longitude,
        r.utc_offset_hours(),
        if r.wae_only { " [WAE]" } else { "" }
    )
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => log::error!("Failed to serialize output: {}", e),
    }
}
