// Prefix to DXCC Entity mapping
// Populated from the prefix lists of cty.dat
//
// A prefix pattern is a call or call prefix optionally followed by override
// annotations that replace attributes of the entity for matching calls:
//   (n)      CQ zone
//   [n]      ITU zone
//   <lat/lon> coordinates
//   {cc}     continent
//   ~h~      UTC offset in hours
// The lookup key is the pattern with the annotations removed.

use std::collections::btree_map::{self, BTreeMap};

use crate::error::OverrideError;

use super::continent::Continent;

/// Characters that start an override annotation
const OVERRIDE_OPENERS: &[char] = &['(', '[', '<', '{', '~'];

/// Attribute overrides carried by a single prefix pattern
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub cq_zone: Option<i32>,
    pub itu_zone: Option<i32>,
    /// (latitude, longitude)
    pub location: Option<(f64, f64)>,
    pub continent: Option<Continent>,
    /// Seconds
    pub utc_offset: Option<i32>,
}

impl Overrides {
    /// Parse every annotation present in `pattern`, in any order
    pub fn parse(pattern: &str) -> Result<Self, OverrideError> {
        let mut overrides = Overrides::default();

        if let Some(value) = override_value(pattern, '(', ')') {
            overrides.cq_zone = Some(parse_number(value, "CQ zone")?);
        }
        if let Some(value) = override_value(pattern, '[', ']') {
            overrides.itu_zone = Some(parse_number(value, "ITU zone")?);
        }
        if let Some(value) = override_value(pattern, '<', '>') {
            let (lat, lon) = value
                .split_once('/')
                .ok_or_else(|| OverrideError::InvalidLocation(value.to_string()))?;
            let lat = lat.trim().parse::<f64>().map_err(|_| OverrideError::InvalidLocation(value.to_string()))?;
            let lon = lon.trim().parse::<f64>().map_err(|_| OverrideError::InvalidLocation(value.to_string()))?;
            overrides.location = Some((lat, lon));
        }
        if let Some(value) = override_value(pattern, '{', '}') {
            overrides.continent = Some(value.parse()?);
        }
        if let Some(value) = override_value(pattern, '~', '~') {
            let hours: f64 = parse_number(value, "UTC offset")?;
            overrides.utc_offset = Some(hours_to_seconds(hours));
        }

        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        *self == Overrides::default()
    }
}

/// Text between the first `open` and the next `close`; runs to the end if unclosed
fn override_value(pattern: &str, open: char, close: char) -> Option<&str> {
    let start = pattern.find(open)? + open.len_utf8();
    let rest = &pattern[start..];
    Some(rest.find(close).map_or(rest, |end| &rest[..end]))
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T, OverrideError> {
    value.trim().parse().map_err(|_| OverrideError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// cty.dat stores offsets as fractional hours
pub fn hours_to_seconds(hours: f64) -> i32 {
    (hours * 3600.0).round() as i32
}

/// A prefix rule for matching callsigns to DXCC entities
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    /// Pattern as written in cty.dat, without the '=' marker, overrides included
    pub pattern: String,
    /// Must equal the whole callsign, not just its leading characters
    pub exact_only: bool,
    pub entity_id: u32,
    pub overrides: Overrides,
}

impl Prefix {
    pub fn new(pattern: impl Into<String>, exact_only: bool, entity_id: u32) -> Result<Self, OverrideError> {
        let pattern = pattern.into();
        let overrides = Overrides::parse(&pattern)?;
        Ok(Self { pattern, exact_only, entity_id, overrides })
    }

    /// Lookup key: the pattern up to its first override annotation
    pub fn key(&self) -> &str {
        prefix_key(&self.pattern)
    }
}

pub fn prefix_key(pattern: &str) -> &str {
    pattern.find(OVERRIDE_OPENERS).map_or(pattern, |end| &pattern[..end])
}

/// Prefixes ordered by key
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    prefixes: BTreeMap<String, Prefix>,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix. Returns it back if another prefix already has the same key.
    pub fn insert(&mut self, prefix: Prefix) -> Result<(), Prefix> {
        match self.prefixes.entry(prefix.key().to_string()) {
            btree_map::Entry::Occupied(_) => Err(prefix),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(prefix);
                Ok(())
            }
        }
    }

    /// Exact key lookup
    pub fn find(&self, key: &str) -> Option<&Prefix> {
        self.prefixes.get(key)
    }

    /// All prefixes mapped to an entity, in key order
    pub fn prefixes_for_entity(&self, entity_id: u32) -> Vec<&Prefix> {
        self.prefixes
            .values()
            .filter(|p| p.entity_id == entity_id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prefix> {
        self.prefixes.values()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
