//! Effective prefix of a callsign
//!
//! Portable and compound calls (`K1ABC/P`, `VP2E/K1ABC`, `K1ABC/4`) are looked
//! up by the part that identifies where the station is operating. The rule is
//! a trait so an application can substitute its own.

/// Derives the string prefix matching starts from
pub trait EffectivePrefix: Send + Sync {
    /// Upper-cased effective prefix for `callsign`
    fn effective_prefix(&self, callsign: &str) -> String;
}

/// Suffixes that describe how a station operates, not where
const MODIFIERS: &[&str] = &["P", "M", "MM", "AM", "QRP", "A", "B", "LH", "J", "R"];

/// Default rule used by [`CtyDatabase`](super::CtyDatabase)
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPrefixRule;

impl EffectivePrefix for StandardPrefixRule {
    fn effective_prefix(&self, callsign: &str) -> String {
        let call = callsign.trim().to_uppercase();
        if !call.contains('/') {
            return call;
        }

        let mut parts: Vec<&str> = call.split('/').filter(|p| !p.is_empty()).collect();
        while parts.len() > 1 && parts.last().is_some_and(|p| MODIFIERS.contains(p)) {
            parts.pop();
        }

        match parts.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [base @ .., area] if is_call_area(area) => {
                shortest(base).map_or_else(String::new, |b| with_call_area(b, area))
            }
            all => shortest(all).unwrap_or_default().to_string(),
        }
    }
}

fn is_call_area(part: &str) -> bool {
    part.len() == 1 && part.as_bytes()[0].is_ascii_digit()
}

/// First of the shortest parts
fn shortest<'a>(parts: &[&'a str]) -> Option<&'a str> {
    parts
        .iter()
        .copied()
        .reduce(|best, p| if p.len() < best.len() { p } else { best })
}

/// `K1ABC` + `4` -> `K4`; `2E0ABC` + `4` -> `2E4`
fn with_call_area(call: &str, area: &str) -> String {
    let letters_end = call
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_digit())
        .map_or(call.len(), |(i, _)| i);
    format!("{}{}", &call[..letters_end], area)
}
