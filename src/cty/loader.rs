// cty.dat Parser
//
// Each entity is an 8-field header line followed by a prefix list:
//
//   United States:  05:  08:  NA:  37.53:  91.67:  5.0:  K:
//       AA,AB,K,KH6(31)[61]<21.0/157.0>,N,W,=VER20240110;
//
// Header fields (':' separated, trimmed):
// 0: entity name
// 1: CQ zone
// 2: ITU zone
// 3: continent
// 4: latitude (+ North)
// 5: longitude (+ West)
// 6: UTC offset in hours
// 7: primary prefix, '*' marks a WAE-only entity
//
// The prefix list is ',' separated and may span several lines; it ends at
// the first line that closes it with ';'. A leading '=' marks an exact call.

use std::io::BufRead;

use chrono::NaiveDate;

use crate::error::CtyError;
use crate::reference::prefixes::hours_to_seconds;
use crate::reference::{Entity, EntityTable, Prefix, PrefixTable};

const WAE_MARKER: char = '*';
const EXACT_MARKER: char = '=';
/// Key of the sentinel prefix whose entity name is the human readable version
const VERSION_KEY: &str = "VERSION";

/// One complete load of cty.dat
#[derive(Debug, Clone, Default)]
pub struct CtyTables {
    pub(crate) entities: EntityTable,
    pub(crate) prefixes: PrefixTable,
    version_tag: Option<String>,
    version_name: Option<String>,
}

impl CtyTables {
    /// Parse a whole cty.dat stream. Nothing is kept if any part fails.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, CtyError> {
        let mut tables = CtyTables::default();
        let mut lines = reader.lines();
        let mut line_number = 0;
        let mut entity_id = 0u32;

        while let Some(line) = lines.next() {
            let line = line?;
            line_number += 1;

            let fields: Vec<&str> = line.split(':').map(str::trim).collect();
            if fields.len() < 8 {
                if !line.trim().is_empty() {
                    log::debug!("Skipping cty.dat line {}: not an entity header", line_number);
                }
                continue;
            }

            let header_line = line_number;
            entity_id += 1;
            let entity = parse_entity(entity_id, &fields, &line, header_line)?;
            tables
                .entities
                .insert(entity)
                .map_err(|e| CtyError::DuplicateEntity {
                    prefix: e.primary_prefix,
                    line: header_line,
                })?;

            // Concatenate continuation lines until the list is closed,
            // remembering where each physical line starts for error reports
            let mut detail = String::new();
            let mut line_starts: Vec<(usize, usize)> = Vec::new();
            loop {
                let Some(next) = lines.next() else {
                    return Err(CtyError::UnterminatedPrefixList { line: header_line });
                };
                let next = next?;
                line_number += 1;
                line_starts.push((detail.len(), line_number));
                detail.push_str(&next);
                if detail.trim_end().ends_with(';') {
                    break;
                }
            }

            let list = detail.trim_end();
            let list = &list[..list.len() - 1];
            tables.add_prefix_list(list, &line_starts, entity_id)?;
        }

        tables.version_name = tables.find_version_name();
        log::debug!(
            "Parsed cty.dat: {} entities, {} prefixes, version {:?}",
            tables.entities.len(),
            tables.prefixes.len(),
            tables.version_tag
        );
        Ok(tables)
    }

    fn add_prefix_list(&mut self, list: &str, line_starts: &[(usize, usize)], entity_id: u32) -> Result<(), CtyError> {
        let mut offset = 0;
        for raw in list.split(',') {
            let line = line_at(line_starts, offset);
            offset += raw.len() + 1;

            let piece = raw.trim();
            if piece.is_empty() {
                continue;
            }
            let (pattern, exact) = match piece.strip_prefix(EXACT_MARKER) {
                Some(rest) => (rest, true),
                None => (piece, false),
            };

            if exact && is_version_tag(pattern) {
                log::debug!("cty.dat version tag {} on line {}", pattern, line);
                self.version_tag = Some(pattern.to_string());
                continue;
            }

            let prefix = Prefix::new(pattern, exact, entity_id).map_err(|source| CtyError::InvalidOverride {
                prefix: pattern.to_string(),
                line,
                source,
            })?;
            self.prefixes.insert(prefix).map_err(|p| CtyError::DuplicatePrefix {
                key: p.key().to_string(),
                line,
            })?;
        }
        Ok(())
    }

    fn find_version_name(&self) -> Option<String> {
        self.prefixes
            .find(VERSION_KEY)
            .and_then(|p| self.entities.get(p.entity_id))
            .or_else(|| self.entities.by_primary_prefix(VERSION_KEY))
            .map(|e| e.name.clone())
    }

    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Version/date tag such as `VER20240110`, empty if the file has none
    pub fn version_tag(&self) -> &str {
        self.version_tag.as_deref().unwrap_or("")
    }

    /// Name of the VERSION sentinel entity, empty if the file has none
    pub fn version_name(&self) -> &str {
        self.version_name.as_deref().unwrap_or("")
    }

    /// Date encoded in the version tag
    pub fn version_date(&self) -> Option<NaiveDate> {
        self.version_tag.as_deref().and_then(version_tag_date)
    }
}

fn parse_entity(id: u32, fields: &[&str], line: &str, line_number: usize) -> Result<Entity, CtyError> {
    let invalid = || CtyError::InvalidNumber {
        line: line_number,
        text: line.to_string(),
    };

    let cq_zone: i32 = fields[1].parse().map_err(|_| invalid())?;
    let itu_zone: i32 = fields[2].parse().map_err(|_| invalid())?;
    let continent = fields[3].parse().map_err(|_| CtyError::UnknownContinent {
        code: fields[3].to_string(),
        line: line_number,
    })?;
    let latitude: f64 = fields[4].parse().map_err(|_| invalid())?;
    let longitude: f64 = fields[5].parse().map_err(|_| invalid())?;
    let utc_hours: f64 = fields[6].parse().map_err(|_| invalid())?;

    let (primary_prefix, wae_only) = match fields[7].strip_prefix(WAE_MARKER) {
        Some(rest) => (rest, true),
        None => (fields[7], false),
    };

    Ok(Entity {
        id,
        name: fields[0].to_string(),
        wae_only,
        cq_zone,
        itu_zone,
        continent,
        latitude,
        longitude,
        utc_offset: hours_to_seconds(utc_hours),
        primary_prefix: primary_prefix.to_string(),
    })
}

/// Physical line holding byte `offset` of the concatenated prefix list
fn line_at(line_starts: &[(usize, usize)], offset: usize) -> usize {
    line_starts
        .iter()
        .take_while(|(start, _)| *start <= offset)
        .last()
        .map_or(0, |&(_, line)| line)
}

/// Position of the 8 digits of a `VERyyyymmdd` tag within `s`
fn version_digits(s: &str) -> Option<&str> {
    s.as_bytes()
        .windows(11)
        .position(|w| w.starts_with(b"VER") && w[3..].iter().all(u8::is_ascii_digit))
        .map(|i| &s[i + 3..i + 11])
}

pub fn is_version_tag(s: &str) -> bool {
    version_digits(s).is_some()
}

fn version_tag_date(tag: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(version_digits(tag)?, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Continent;

    const SAMPLE: &str = "\
Canada:                   05:  09:  NA:   44.35:    78.75:     5.0:  VE:
    CF,CG,CJ,CK,CY,CZ,VA,VB,VC,VD,VE,VG,VO1(5),VO2,VX,VY(1)[2],XJ,XK,XL,XM,
    XN,XO;
United States:            05:  08:  NA:   37.53:    91.67:     5.0:  K:
    AA,AB,AC,K,KH6(31)[61]<21.0/157.0>~10.0~,N,W,=VER20240110;
Sicily:                   15:  28:  EU:   37.50:   -14.00:    -1.0:  *IT9:
    IB9,ID9,IE9,IF9,II9,IJ9,IO9,IQ9,IR9,IT9,IU9,IW9,IY9;
CTY-3409 (10 January 2024):  0:  0:  NA:    0.00:     0.00:     0.0:  VERSION:
    =VERSION;
";

    fn sample() -> CtyTables {
        CtyTables::parse(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_entities_numbered_in_file_order() {
        let tables = sample();
        let names: Vec<(u32, &str)> = tables.entities().iter().map(|e| (e.id, e.name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (1, "Canada"),
                (2, "United States"),
                (3, "Sicily"),
                (4, "CTY-3409 (10 January 2024)")
            ]
        );
    }

    #[test]
    fn test_entity_fields() {
        let tables = sample();
        let us = tables.entities().by_primary_prefix("K").unwrap();
        assert_eq!(us.cq_zone, 5);
        assert_eq!(us.itu_zone, 8);
        assert_eq!(us.continent, Continent::NA);
        assert_eq!(us.latitude, 37.53);
        assert_eq!(us.longitude, 91.67);
        assert_eq!(us.utc_offset, 18000);
        assert!(!us.wae_only);
    }

    #[test]
    fn test_wae_marker_stripped() {
        let tables = sample();
        let sicily = tables.entities().get(3).unwrap();
        assert_eq!(sicily.primary_prefix, "IT9");
        assert!(sicily.wae_only);
        assert_eq!(sicily.utc_offset, -3600);
        assert!(tables.entities().by_primary_prefix("*IT9").is_none());
    }

    #[test]
    fn test_multiline_prefix_list() {
        let tables = sample();
        let canada: Vec<&str> = tables.prefixes().prefixes_for_entity(1).iter().map(|p| p.key()).collect();
        assert_eq!(canada.len(), 22);
        assert!(canada.contains(&"XN"));
        assert!(canada.contains(&"XO"));
        assert_eq!(tables.prefixes().find("VY").map(|p| p.pattern.as_str()), Some("VY(1)[2]"));
    }

    #[test]
    fn test_exact_marker_and_version_tag() {
        let tables = sample();
        let version = tables.prefixes().find("VERSION").unwrap();
        assert!(version.exact_only);
        assert!(!tables.prefixes().find("K").unwrap().exact_only);

        assert_eq!(tables.version_tag(), "VER20240110");
        assert!(tables.prefixes().find("VER20240110").is_none());
        assert_eq!(tables.version_date(), NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(tables.version_name(), "CTY-3409 (10 January 2024)");
    }

    #[test]
    fn test_no_version_information() {
        let tables = CtyTables::parse("Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2;\n".as_bytes()).unwrap();
        assert_eq!(tables.version_tag(), "");
        assert_eq!(tables.version_name(), "");
        assert!(tables.version_date().is_none());
    }

    #[test]
    fn test_blank_and_short_lines_skipped() {
        let text = "\n# comment\nFiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2;\n\n";
        let tables = CtyTables::parse(text.as_bytes()).unwrap();
        assert_eq!(tables.entities().len(), 1);
        assert_eq!(tables.prefixes().len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\r\n 3D2,3D2C(32)[56];\r\n";
        let tables = CtyTables::parse(text.as_bytes()).unwrap();
        assert_eq!(tables.prefixes().len(), 2);
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let text = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2;\nTonga: 32: x: OC: -21.22: 175.13: -13.0: A3:\n A3;\n";
        let err = CtyTables::parse(text.as_bytes()).unwrap_err();
        match err {
            CtyError::InvalidNumber { line, text } => {
                assert_eq!(line, 3);
                assert!(text.starts_with("Tonga"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_continent() {
        let text = "Fiji: 32: 56: XX: -17.78: -177.92: -12.0: 3D2:\n 3D2;\n";
        let err = CtyTables::parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CtyError::UnknownContinent { ref code, line: 1 } if code == "XX"));
    }

    #[test]
    fn test_bad_override_reports_line_of_prefix() {
        let text = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2,\n 3D2C(x);\n";
        let err = CtyTables::parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CtyError::InvalidOverride { ref prefix, line: 3, .. } if prefix == "3D2C(x)"));
    }

    #[test]
    fn test_duplicate_prefix_is_an_error() {
        let text = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2;\nRotuma: 32: 56: OC: -12.50: -177.08: -12.0: 3D2/r:\n 3D2(32);\n";
        let err = CtyTables::parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CtyError::DuplicatePrefix { ref key, line: 4 } if key == "3D2"));
    }

    #[test]
    fn test_duplicate_primary_prefix_is_an_error() {
        let text = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2;\nAgain: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D3;\n";
        let err = CtyTables::parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CtyError::DuplicateEntity { line: 3, .. }));
    }

    #[test]
    fn test_unterminated_prefix_list() {
        let text = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n 3D2,3D3\n";
        let err = CtyTables::parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CtyError::UnterminatedPrefixList { line: 1 }));

        let header_only = "Fiji: 32: 56: OC: -17.78: -177.92: -12.0: 3D2:\n";
        assert!(CtyTables::parse(header_only.as_bytes()).is_err());
    }

    #[test]
    fn test_version_tag_detection() {
        assert!(is_version_tag("VER20240110"));
        assert!(!is_version_tag("VER2024011"));
        assert!(!is_version_tag("VERSION"));
        assert!(!is_version_tag("W1AW"));
    }
}
