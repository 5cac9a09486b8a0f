// Continent codes as used in cty.dat entity headers and {..} overrides

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownContinent;

/// One of the seven continents, or `Unknown` for an unresolved callsign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Continent {
    AF,
    AN,
    AS,
    EU,
    NA,
    OC,
    SA,
    #[default]
    #[serde(rename = "UN")]
    Unknown,
}

impl Continent {
    /// Two-letter code; `Unknown` renders as "UN"
    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::AF => "AF",
            Continent::AN => "AN",
            Continent::AS => "AS",
            Continent::EU => "EU",
            Continent::NA => "NA",
            Continent::OC => "OC",
            Continent::SA => "SA",
            Continent::Unknown => "UN",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Continent::AF => "Africa",
            Continent::AN => "Antarctica",
            Continent::AS => "Asia",
            Continent::EU => "Europe",
            Continent::NA => "North America",
            Continent::OC => "Oceania",
            Continent::SA => "South America",
            Continent::Unknown => "Unknown",
        }
    }
}

impl FromStr for Continent {
    type Err = UnknownContinent;

    /// Accepts exactly the seven codes; "UN" is an output-only sentinel
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AF" => Ok(Continent::AF),
            "AN" => Ok(Continent::AN),
            "AS" => Ok(Continent::AS),
            "EU" => Ok(Continent::EU),
            "NA" => Ok(Continent::NA),
            "OC" => Ok(Continent::OC),
            "SA" => Ok(Continent::SA),
            other => Err(UnknownContinent(other.to_string())),
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
