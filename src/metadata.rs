//! Human readable annotations embedded in a MIDI file.
//!
//! Controller names come from text meta events, either one per event as
//! `CC7 = Volume` or as a JSON object mapping controller numbers to names,
//! e.g. `{"1": "Mod Wheel", "74": "Brightness"}`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Characters of a malformed annotation echoed back in warnings.
const PREVIEW_CHARS: usize = 50;

/// Key of a controller name. JSON annotations may use keys that aren't
/// numbers; those are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CcKey {
    Number(u64),
    Name(String),
}

impl CcKey {
    fn parse(key: &str) -> Self {
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = key.parse() {
                return CcKey::Number(n);
            }
        }
        CcKey::Name(key.to_string())
    }
}

impl From<u8> for CcKey {
    fn from(controller: u8) -> Self {
        CcKey::Number(controller as u64)
    }
}

impl fmt::Display for CcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CcKey::Number(n) => write!(f, "{}", n),
            CcKey::Name(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metadata {
    names: BTreeMap<CcKey, String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, key: &CcKey) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Display name registered for a controller number.
    pub fn name_for(&self, controller: u8) -> Option<&str> {
        self.get(&CcKey::from(controller))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CcKey, &str)> {
        self.names.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Applies one text meta event. Text that is neither a `CCn = Name`
    /// line nor a JSON object is ignored.
    pub(crate) fn apply_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        if let Some(caps) = cc_line().captures(text) {
            match caps[1].parse::<u64>() {
                Ok(n) => {
                    self.names
                        .insert(CcKey::Number(n), caps[2].trim().to_string());
                }
                Err(err) => warn!("Ignoring CC annotation {:?}: {}", preview(text), err),
            }
        } else if text.starts_with('{') && text.ends_with('}') {
            self.apply_json(text);
        }
    }

    fn apply_json(&mut self, text: &str) {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to parse JSON: {}... ({})", preview(text), err);
                return;
            }
        };

        let Value::Object(map) = value else {
            return;
        };

        for (key, value) in map {
            let name = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.names.insert(CcKey::parse(&key), name);
        }
    }
}

fn cc_line() -> &'static Regex {
    static CC_LINE: OnceLock<Regex> = OnceLock::new();
    CC_LINE.get_or_init(|| Regex::new(r"^CC([0-9]+)\s*=\s*(.+)").expect("valid regex"))
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(texts: &[&str]) -> Metadata {
        let mut meta = Metadata::default();
        for text in texts {
            meta.apply_text(text);
        }
        meta
    }

    #[test]
    fn cc_line_is_trimmed() {
        let meta = apply(&["CC7 = Volume  "]);
        assert_eq!(meta.name_for(7), Some("Volume"));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn cc_line_tolerates_missing_spaces() {
        let meta = apply(&["CC74=Brightness", "CC1   =   Mod Wheel"]);
        assert_eq!(meta.name_for(74), Some("Brightness"));
        assert_eq!(meta.name_for(1), Some("Mod Wheel"));
    }

    #[test]
    fn cc_line_must_start_the_text() {
        let meta = apply(&["see CC7 = Volume", "cc7 = Volume", "CC = Volume"]);
        assert!(meta.is_empty());
    }

    #[test]
    fn json_keys_are_numbers_or_names() {
        let meta = apply(&[r#"{"1": "Mod Wheel", "foo": "bar"}"#]);
        assert_eq!(meta.get(&CcKey::Number(1)), Some("Mod Wheel"));
        assert_eq!(meta.get(&CcKey::Name("foo".into())), Some("bar"));
        assert_eq!(meta.name_for(1), Some("Mod Wheel"));
    }

    #[test]
    fn json_non_string_values_keep_their_json_text() {
        let meta = apply(&[r#"{"3": 42, "-1": "neg"}"#]);
        assert_eq!(meta.name_for(3), Some("42"));
        assert_eq!(meta.get(&CcKey::Name("-1".into())), Some("neg"));
    }

    #[test]
    fn malformed_json_is_skipped() {
        let meta = apply(&["CC2 = Breath", "{bad json}", "{bad json"]);
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.name_for(2), Some("Breath"));
    }

    #[test]
    fn later_annotations_overwrite_earlier() {
        let meta = apply(&["CC7 = Volume", r#"{"7": "Level"}"#]);
        assert_eq!(meta.name_for(7), Some("Level"));
    }

    #[test]
    fn later_json_key_wins_for_same_number() {
        let meta = apply(&[r#"{"7": "first", "07": "second"}"#]);
        assert_eq!(meta.name_for(7), Some("second"));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn key_display() {
        assert_eq!(CcKey::Number(7).to_string(), "7");
        assert_eq!(CcKey::Name("foo".into()).to_string(), "foo");
    }
}
