//! cty.dat Callsign Database
//!
//! Loads the AD1C cty.dat country file and grid.dat side table and answers
//! callsign -> entity and grid -> US state queries.
//!
//! The entity and prefix tables are held as one immutable snapshot. Reload
//! parses into a fresh snapshot and swaps it in only when the whole file
//! parsed, so lookups never see a partially loaded table and a failed
//! reload leaves the previous data in place.

mod callsign;
mod loader;
mod resolver;

pub use callsign::{EffectivePrefix, StandardPrefixRule};
pub use loader::{is_version_tag, CtyTables};
pub use resolver::CtyRecord;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::DataPaths;
use crate::error::CtyError;
use crate::reference::{is_valid_grid, GridStateIndex};

/// Primary prefix of the entity grid.dat states belong to
const GRID_STATE_ENTITY_PREFIX: &str = "K";
const EVENT_CAPACITY: usize = 16;

/// Published to subscribers after each successful (re)load
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CtyEvent {
    Loaded {
        /// Name of the VERSION entity, e.g. "CTY-3409 (10 January 2024)"
        version: String,
        /// Tag such as "VER20240110"
        version_tag: String,
        entities: usize,
        prefixes: usize,
    },
}

pub struct CtyDatabase {
    paths: Box<dyn DataPaths>,
    prefix_rule: Box<dyn EffectivePrefix>,
    tables: RwLock<Arc<CtyTables>>,
    grid: GridStateIndex,
    events: broadcast::Sender<CtyEvent>,
}

impl CtyDatabase {
    /// Load cty.dat and grid.dat from `paths`.
    ///
    /// A missing grid.dat only disables state lookups; a missing or
    /// malformed cty.dat is an error.
    pub fn open(paths: impl DataPaths + 'static) -> Result<Self, CtyError> {
        let grid = load_grid(&paths.grid_path())?;
        let tables = load_tables(&paths.cty_path())?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            paths: Box::new(paths),
            prefix_rule: Box::new(StandardPrefixRule),
            tables: RwLock::new(Arc::new(tables)),
            grid,
            events,
        })
    }

    /// Replace the effective prefix rule used by [`resolve`](Self::resolve)
    pub fn with_prefix_rule(mut self, rule: impl EffectivePrefix + 'static) -> Self {
        self.prefix_rule = Box::new(rule);
        self
    }

    /// Re-read cty.dat. On failure the current tables stay in use.
    pub fn reload(&self) -> Result<CtyEvent, CtyError> {
        let path = self.paths.cty_path();
        let tables = match load_tables(&path) {
            Ok(tables) => tables,
            Err(e) => {
                log::warn!("Reload of {} failed, keeping previous data: {}", path.display(), e);
                return Err(e);
            }
        };

        let event = CtyEvent::Loaded {
            version: tables.version_name().to_string(),
            version_tag: tables.version_tag().to_string(),
            entities: tables.entities().len(),
            prefixes: tables.prefixes().len(),
        };

        *self.tables.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(tables);

        // No subscribers is fine
        let _ = self.events.send(event.clone());
        Ok(event)
    }

    /// Receive a [`CtyEvent`] for every later successful reload
    pub fn subscribe(&self) -> broadcast::Receiver<CtyEvent> {
        self.events.subscribe()
    }

    /// Current tables; stays valid across a concurrent reload
    pub fn snapshot(&self) -> Arc<CtyTables> {
        Arc::clone(&self.tables.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Resolve a callsign to its entity; no match gives `CtyRecord::default()`
    pub fn resolve(&self, callsign: &str) -> CtyRecord {
        self.snapshot().resolve(callsign, self.prefix_rule.as_ref())
    }

    /// Version tag of the loaded file, e.g. "VER20240110"
    pub fn version(&self) -> String {
        self.snapshot().version_tag().to_string()
    }

    /// Name of the VERSION entity of the loaded file
    pub fn version_name(&self) -> String {
        self.snapshot().version_name().to_string()
    }

    pub fn version_date(&self) -> Option<NaiveDate> {
        self.snapshot().version_date()
    }

    /// US state code for a grid square, "**" when unknown
    pub fn lookup_state(&self, grid: &str) -> &str {
        self.grid.lookup_state(grid)
    }

    /// State for a station heard from `grid`, only for mainland US calls
    pub fn us_state(&self, callsign: &str, grid: &str) -> Option<&str> {
        if !is_valid_grid(grid) || self.resolve(callsign).primary_prefix != GRID_STATE_ENTITY_PREFIX {
            return None;
        }
        Some(self.grid.lookup_state(grid))
    }
}

fn load_tables(path: &Path) -> Result<CtyTables, CtyError> {
    log::info!("Loading cty.dat from {}", path.display());
    let file = File::open(path).map_err(|source| CtyError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let tables = CtyTables::parse(BufReader::new(file))?;
    log::info!(
        "Loaded cty.dat version {}, {} ({} entities, {} prefixes)",
        tables.version_tag(),
        tables.version_name(),
        tables.entities().len(),
        tables.prefixes().len()
    );
    Ok(tables)
}

fn load_grid(path: &Path) -> Result<GridStateIndex, CtyError> {
    match File::open(path) {
        Ok(file) => GridStateIndex::parse(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("No grid.dat at {}, state lookups disabled", path.display());
            Ok(GridStateIndex::new())
        }
        Err(source) => Err(CtyError::Unavailable {
            path: path.to_path_buf(),
            source,
        }),
    }
}
