// ctyresolve library
// Callsign -> DXCC entity resolution from cty.dat, grid square -> US state from grid.dat

pub mod config;
pub mod cty;
pub mod error;
pub mod reference;

pub use config::{DataDirs, DataPaths, FixedPaths};
pub use cty::{CtyDatabase, CtyEvent, CtyRecord, EffectivePrefix, StandardPrefixRule};
pub use error::CtyError;
pub use reference::Continent;
