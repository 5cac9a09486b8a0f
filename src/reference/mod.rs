// Reference data tables - DXCC entities, callsign prefixes and grid states
// Built at runtime from cty.dat and grid.dat; see crate::cty for loading.

pub mod continent;
pub mod dxcc;
pub mod prefixes;
pub mod states;

pub use continent::Continent;
pub use dxcc::{Entity, EntityTable};
pub use prefixes::{Overrides, Prefix, PrefixTable};
pub use states::{is_valid_grid, GridStateIndex, UNKNOWN_STATE};
