// Callsign -> DXCC entity resolution over a loaded cty.dat
//
// Longest prefix match: start from the effective prefix and drop one
// character at a time until a key is found. Exact-only keys are accepted
// only when they cover the whole callsign.

use serde::Serialize;

use crate::reference::{Continent, Entity, Prefix};

use super::callsign::EffectivePrefix;
use super::loader::CtyTables;

/// Calls under this prefix belong to Guantanamo Bay only as 1x2 (5 char) or bare (3 char) calls
const GUANTANAMO_PREFIX: &str = "KG4";
/// Primary prefix of the mainland US entity that takes every other KG4 call
const MAINLAND_PREFIX: &str = "K";

/// Resolved entity data for one callsign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtyRecord {
    /// Entity id, 0 when unresolved
    pub entity_id: u32,
    pub entity_name: String,
    pub wae_only: bool,
    pub continent: Continent,
    pub cq_zone: i32,
    pub itu_zone: i32,
    /// Degrees, + is North
    pub latitude: f64,
    /// Degrees, + is West
    pub longitude: f64,
    /// Seconds
    pub utc_offset: i32,
    pub primary_prefix: String,
}

impl Default for CtyRecord {
    fn default() -> Self {
        Self {
            entity_id: 0,
            entity_name: String::new(),
            wae_only: false,
            continent: Continent::Unknown,
            cq_zone: 0,
            itu_zone: 0,
            latitude: f64::NAN,
            longitude: f64::NAN,
            utc_offset: 0,
            primary_prefix: String::new(),
        }
    }
}

impl CtyRecord {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id,
            entity_name: entity.name.clone(),
            wae_only: entity.wae_only,
            continent: entity.continent,
            cq_zone: entity.cq_zone,
            itu_zone: entity.itu_zone,
            latitude: entity.latitude,
            longitude: entity.longitude,
            utc_offset: entity.utc_offset,
            primary_prefix: entity.primary_prefix.clone(),
        }
    }

    /// True when the callsign did not resolve to any entity
    pub fn is_empty(&self) -> bool {
        self.entity_id == 0
    }

    pub fn utc_offset_hours(&self) -> f64 {
        f64::from(self.utc_offset) / 3600.0
    }

    /// Entity name shortened for narrow displays. Without `include_wae`
    /// WAE-only entities are reported as the DXCC entity that contains them.
    pub fn short_name(&self, include_wae: bool) -> String {
        let mut name = self.entity_name.clone();
        for (long, short) in NAME_ABBREVIATIONS {
            name = name.replace(long, short);
        }
        if !include_wae {
            for (wae, dxcc) in WAE_TO_DXCC {
                name = name.replace(wae, dxcc);
            }
        }
        name
    }
}

const NAME_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Islands", "Is."),
    ("Island", "Is."),
    ("North ", "N. "),
    ("Northern ", "N. "),
    ("South ", "S. "),
    ("East ", "E. "),
    ("Eastern ", "E. "),
    ("West ", "W. "),
    ("Western ", "W. "),
    ("Central ", "C. "),
    (" and ", " & "),
    ("Republic", "Rep."),
    ("United States of America", "U.S.A."),
    ("United States", "U.S.A."),
    ("Fed. Rep. of ", ""),
    ("French ", "Fr."),
    ("Asiatic", "AS"),
    ("European", "EU"),
    ("African", "AF"),
];

/// Applied after abbreviation, so names are in their shortened form
const WAE_TO_DXCC: &[(&str, &str)] = &[
    ("Bear Is.", "Svalbard"),
    ("Shetland Is.", "Scotland"),
    ("AF Italy", "Italy"),
    ("Sicily", "Italy"),
    ("Vienna Intl Ctr", "Austria"),
    ("AF Turkey", "Turkey"),
    ("EU Turkey", "Turkey"),
];

impl CtyTables {
    /// Resolve a callsign; an unresolvable call yields `CtyRecord::default()`
    pub fn resolve(&self, callsign: &str, rule: &dyn EffectivePrefix) -> CtyRecord {
        let call = callsign.trim().to_uppercase();

        // Maritime and aeronautical mobile stations have no entity
        if call.ends_with("/MM") || call.ends_with("/AM") {
            return CtyRecord::default();
        }

        let mut search = rule.effective_prefix(&call);
        if search != call {
            if let Some(p) = self.prefixes.find(&call) {
                if p.exact_only {
                    return self.fixup(&call, p);
                }
            }
        }

        while !search.is_empty() {
            if let Some(p) = self.prefixes.find(&search) {
                if !p.exact_only || call.len() == search.len() {
                    return self.fixup(&call, p);
                }
            }
            search.pop();
        }

        CtyRecord::default()
    }

    /// Entity for a matched prefix, applying rules cty.dat cannot express
    fn entity_for(&self, call: &str, prefix: &Prefix) -> Option<&Entity> {
        if call.starts_with(GUANTANAMO_PREFIX) && call.len() != 5 && call.len() != 3 {
            match self.entities.by_primary_prefix(MAINLAND_PREFIX) {
                Some(mainland) => return Some(mainland),
                None => log::warn!("No entity with primary prefix {} for {}", MAINLAND_PREFIX, call),
            }
        }
        self.entities.get(prefix.entity_id)
    }

    /// Copy the entity then apply the prefix overrides in order:
    /// CQ zone, ITU zone, location, continent, UTC offset
    fn fixup(&self, call: &str, prefix: &Prefix) -> CtyRecord {
        let Some(entity) = self.entity_for(call, prefix) else {
            log::error!("Prefix {} refers to missing entity {}", prefix.pattern, prefix.entity_id);
            return CtyRecord::default();
        };

        let mut record = CtyRecord::from_entity(entity);
        let o = &prefix.overrides;
        if let Some(cq_zone) = o.cq_zone {
            record.cq_zone = cq_zone;
        }
        if let Some(itu_zone) = o.itu_zone {
            record.itu_zone = itu_zone;
        }
        if let Some((latitude, longitude)) = o.location {
            record.latitude = latitude;
            record.longitude = longitude;
        }
        if let Some(continent) = o.continent {
            record.continent = continent;
        }
        if let Some(utc_offset) = o.utc_offset {
            record.utc_offset = utc_offset;
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cty::callsign::StandardPrefixRule;

    const SAMPLE: &str = "\
United States:            7:  08:  NA:   38.0:    -97.0:     5.0:  K:
    K,KH6(31)[61]<21.0/-157.0>,W,N,KL7{OC}~9.0~;
Guantanamo Bay:           08:  11:  NA:   20.00:    75.00:     5.0:  KG4:
    KG4,=KG4AB;
Canada:                   05:  09:  NA:   44.35:    78.75:     5.0:  VE:
    VE,=VE3EXACT(4),VE3(4)[9];
Sicily:                   15:  28:  EU:   37.50:   -14.00:    -1.0:  *IT9:
    IT9;
Italy:                    15:  28:  EU:   42.82:   -12.58:    -1.0:  I:
    I;
Fed. Rep. of Germany:     14:  28:  EU:   51.00:   -10.00:    -1.0:  DL:
    DL;
";

    fn tables() -> CtyTables {
        CtyTables::parse(SAMPLE.as_bytes()).unwrap()
    }

    fn resolve(call: &str) -> CtyRecord {
        tables().resolve(call, &StandardPrefixRule)
    }

    #[test]
    fn test_overrides_applied_to_matching_prefix() {
        let r = resolve("KH6ABC");
        assert_eq!(r.entity_name, "United States");
        assert_eq!(r.continent, Continent::NA);
        assert_eq!(r.cq_zone, 31);
        assert_eq!(r.itu_zone, 61);
        assert_eq!(r.latitude, 21.0);
        assert_eq!(r.longitude, -157.0);
        assert_eq!(r.utc_offset, 5 * 3600);
        assert_eq!(r.primary_prefix, "K");
    }

    #[test]
    fn test_continent_and_offset_overrides() {
        let r = resolve("KL7XX");
        assert_eq!(r.continent, Continent::OC);
        assert_eq!(r.utc_offset, 9 * 3600);
        assert_eq!(r.cq_zone, 7);
        assert_eq!(r.latitude, 38.0);
    }

    #[test]
    fn test_zone_overrides_are_independent() {
        let r = resolve("VE3ABC");
        assert_eq!(r.cq_zone, 4);
        assert_eq!(r.itu_zone, 9);
        assert_eq!(r.entity_name, "Canada");

        let plain = resolve("VE7ABC");
        assert_eq!(plain.cq_zone, 5);
        assert_eq!(plain.itu_zone, 9);
    }

    #[test]
    fn test_primary_prefix_round_trip() {
        let tables = tables();
        for entity in tables.entities().iter() {
            let r = tables.resolve(&entity.primary_prefix, &StandardPrefixRule);
            assert_eq!(r.primary_prefix, entity.primary_prefix, "entity {}", entity.name);
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        assert_eq!(resolve("KH6XYZ").cq_zone, 31);
        assert_eq!(resolve("K1XYZ").cq_zone, 7);
    }

    #[test]
    fn test_no_match_returns_default() {
        let r = resolve("ZZZZZ");
        assert!(r.is_empty());
        assert_eq!(r.continent, Continent::Unknown);
        assert_eq!(r.cq_zone, 0);
        assert_eq!(r.itu_zone, 0);
        assert_eq!(r.entity_name, "");
        assert!(r.latitude.is_nan());
        assert!(r.longitude.is_nan());
        assert_eq!(r.primary_prefix, "");
    }

    #[test]
    fn test_maritime_and_aeronautical_mobile_unresolved() {
        assert!(resolve("K1ABC/MM").is_empty());
        assert!(resolve("w1aw/am").is_empty());
        assert!(!resolve("K1ABC/M").is_empty());
    }

    #[test]
    fn test_exact_only_prefix_needs_whole_call() {
        // =VE3EXACT only matches itself; longer calls fall back to VE3
        let exact = resolve("VE3EXACT");
        assert_eq!(exact.cq_zone, 4);
        assert_eq!(exact.itu_zone, 9);
        let longer = resolve("VE3EXACTX");
        assert_eq!(longer.entity_name, "Canada");
        assert_eq!(longer.itu_zone, 9);
    }

    #[test]
    fn test_exact_call_with_portable_suffix() {
        // Effective prefix differs from the call, so the raw call is tried exactly first
        let tables = CtyTables::parse(
            "Alaska: 1: 1: NA: 61.4: 148.9: 9.0: KL:\n KL,=W1AW/KL7;\nUnited States: 5: 8: NA: 37.5: 91.7: 5.0: K:\n K,W;\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(tables.resolve("W1AW/KL7", &StandardPrefixRule).entity_name, "Alaska");
        assert_eq!(tables.resolve("W1AW/P", &StandardPrefixRule).entity_name, "United States");
        assert_eq!(tables.resolve("KL7/W1AW", &StandardPrefixRule).entity_name, "Alaska");
    }

    #[test]
    fn test_lower_case_input() {
        assert_eq!(resolve("kh6abc").cq_zone, 31);
    }

    #[test]
    fn test_guantanamo_special_rule() {
        // exact call of 5 characters stays with Guantanamo Bay
        assert_eq!(resolve("KG4AB").entity_name, "Guantanamo Bay");
        // bare prefix (3 characters) stays with Guantanamo Bay
        assert_eq!(resolve("KG4").entity_name, "Guantanamo Bay");
        // other lengths under KG4 are mainland US
        let r = resolve("KG4XYZ");
        assert_eq!(r.entity_name, "United States");
        assert_eq!(r.primary_prefix, "K");
        assert_eq!(resolve("KG4ABCD").entity_name, "United States");
        // a 5 character call matched through the KG4 prefix stays with Guantanamo Bay
        assert_eq!(resolve("KG4XY").entity_name, "Guantanamo Bay");
        // portable form of the exact call is 7 characters, so it is mainland
        assert_eq!(resolve("KG4AB/P").entity_name, "United States");
    }

    #[test]
    fn test_wae_entity_flag() {
        let r = resolve("IT9ABC");
        assert!(r.wae_only);
        assert_eq!(r.primary_prefix, "IT9");
        assert_eq!(r.utc_offset_hours(), -1.0);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(resolve("IT9ABC").short_name(true), "Sicily");
        assert_eq!(resolve("IT9ABC").short_name(false), "Italy");
        assert_eq!(resolve("DL1ABC").short_name(true), "Germany");
        assert_eq!(resolve("W1AW").short_name(true), "U.S.A.");
        assert_eq!(CtyRecord::default().short_name(false), "");
    }
}
