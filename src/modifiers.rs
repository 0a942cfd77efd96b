use crate::format;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

pub const FLAG: &str = "flag";
pub const FLAG_ALT: &str = "flag alt";
pub const WARNING_MESSAGE: &str = "warning message";
pub const BAN_MESSAGE: &str = "ban message";

pub type Modifiers = IndexMap<String, String>;

/// Pulls the modifier tags out of a post's raw, unmarked-up body.
pub trait ModifierExtractor {
    fn extract_modifiers(&self, body_nomarkup: &str) -> Modifiers;
}

lazy_static! {
    static ref MODIFIER_TAG: Regex =
        Regex::new(r"(?s)<tinyboard ([\w\s]+)>(.*?)</tinyboard>").unwrap();
}

/// Reads `<tinyboard NAME>VALUE</tinyboard>` tags. A repeated name keeps
/// its last value. Values are entity decoded: numeric references, the
/// Latin-1 names and common typographic names (`&eacute;`, `&rsquo;`).
/// Other named entities are left as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagModifiers;

impl ModifierExtractor for TagModifiers {
    fn extract_modifiers(&self, body_nomarkup: &str) -> Modifiers {
        let mut modifiers = Modifiers::new();
        for caps in MODIFIER_TAG.captures_iter(body_nomarkup) {
            modifiers.insert(
                caps[1].to_string(),
                format::html_unescape(&caps[2]),
            );
        }
        modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_flag() {
        let body = "hello\n<tinyboard flag>us</tinyboard><tinyboard flag alt>United States</tinyboard>";
        let mods = TagModifiers.extract_modifiers(body);

        assert_eq!(mods.get(FLAG).map(String::as_str), Some("us"));
        assert_eq!(mods.get(FLAG_ALT).map(String::as_str), Some("United States"));
        assert_eq!(mods.len(), 2);
    }

    #[test]
    fn test_extract_multiline_and_entities() {
        let body = "<tinyboard ban message>USER WAS BANNED\nFOR &quot;THIS&quot;</tinyboard>";
        let mods = TagModifiers.extract_modifiers(body);

        assert_eq!(
            mods.get(BAN_MESSAGE).map(String::as_str),
            Some("USER WAS BANNED\nFOR \"THIS\"")
        );
    }

    #[test]
    fn test_last_duplicate_wins() {
        let body = "<tinyboard flag>us</tinyboard><tinyboard flag>de</tinyboard>";
        let mods = TagModifiers.extract_modifiers(body);

        assert_eq!(mods.get(FLAG).map(String::as_str), Some("de"));
    }

    #[test]
    fn test_accented_flag_alt() {
        let body = "<tinyboard flag>ci</tinyboard><tinyboard flag alt>C&ocirc;te d&#039;Ivoire</tinyboard>";
        let mods = TagModifiers.extract_modifiers(body);

        assert_eq!(mods.get(FLAG_ALT).map(String::as_str), Some("Côte d'Ivoire"));
    }

    #[test]
    fn test_no_modifiers() {
        assert!(TagModifiers.extract_modifiers("just a post").is_empty());
    }
}
