//! Keyword/value translation tables for key-management enumerations.
//!
//! Name lookup accepts any unambiguous abbreviation: given the keywords
//! `taiwan`, `tanzania`, `uganda`, the input "t" or "ta" is ambiguous but
//! "tai" matches taiwan, and "u" matches uganda. An exact match always
//! wins over a prefix match. No keyword maps to the value 0, so a zero
//! return from the C-era callers meant "not found"; here lookups return
//! `Option` instead.
//!
//! Parameters are the one exception: their numeric field is the default
//! value used when the parameter is not set, and existence checks on them
//! require an exact match.

type KeywordTable = &'static [(&'static str, i32)];

const ALGORITHM_KEYWORDS: KeywordTable = &[
    ("rsamd5", 1),
    ("dh", 2),
    ("dsasha1", 3),
    ("rsasha1", 5),
    ("indirect", 252),
    ("privdom", 253),
    ("privoid", 254),
];

const FORMAT_KEYWORDS: KeywordTable = &[("file", 1), ("hsm", 2), ("uri", 3)];

const STATE_KEYWORDS: KeywordTable = &[
    ("generate", 1),
    ("publish", 2),
    ("ready", 3),
    ("active", 4),
    ("retire", 5),
    ("dead", 6),
];

const TYPE_KEYWORDS: KeywordTable = &[("ksk", 257), ("zsk", 256)];

/// Parameter name → default value (seconds, except nemkeys).
const PARAMETER_KEYWORDS: KeywordTable = &[
    ("clockskew", 3600),
    ("nemkeys", 2),
    ("ksklife", 31_536_000),
    ("propdelay", 3600),
    ("signint", 604_800),
    ("soamin", 3600),
    ("soattl", 3600),
    ("zsksiglife", 604_800),
    ("zsklife", 2_592_000),
    ("zskttl", 3600),
];

/// Find `name` in `table`: exact match first, otherwise a unique prefix.
fn name_to_value(table: KeywordTable, name: &str) -> Option<i32> {
    if name.is_empty() {
        return None;
    }
    if let Some(&(_, value)) = table.iter().find(|(keyword, _)| *keyword == name) {
        return Some(value);
    }
    let mut hits = table.iter().filter(|(keyword, _)| keyword.starts_with(name));
    match (hits.next(), hits.next()) {
        (Some(&(_, value)), None) => Some(value),
        // Ambiguous abbreviation or no match.
        _ => None,
    }
}

fn value_to_name(table: KeywordTable, value: i32) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(keyword, _)| *keyword)
}

pub fn algorithm_name_to_value(name: &str) -> Option<i32> {
    name_to_value(ALGORITHM_KEYWORDS, name)
}

pub fn format_name_to_value(name: &str) -> Option<i32> {
    name_to_value(FORMAT_KEYWORDS, name)
}

pub fn state_name_to_value(name: &str) -> Option<i32> {
    name_to_value(STATE_KEYWORDS, name)
}

pub fn type_name_to_value(name: &str) -> Option<i32> {
    name_to_value(TYPE_KEYWORDS, name)
}

pub fn parameter_name_to_value(name: &str) -> Option<i32> {
    name_to_value(PARAMETER_KEYWORDS, name)
}

pub fn algorithm_value_to_name(value: i32) -> Option<&'static str> {
    value_to_name(ALGORITHM_KEYWORDS, value)
}

pub fn format_value_to_name(value: i32) -> Option<&'static str> {
    value_to_name(FORMAT_KEYWORDS, value)
}

pub fn state_value_to_name(value: i32) -> Option<&'static str> {
    value_to_name(STATE_KEYWORDS, value)
}

pub fn type_value_to_name(value: i32) -> Option<&'static str> {
    value_to_name(TYPE_KEYWORDS, value)
}

/// True when `name` is exactly the name of a parameter. Unlike the other
/// keyword lookups, no abbreviation is accepted here.
pub fn parameter_exists(name: &str) -> bool {
    PARAMETER_KEYWORDS.iter().any(|(keyword, _)| *keyword == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_algorithm_lookup() {
        assert_eq!(algorithm_name_to_value("rsasha1"), Some(5));
        assert_eq!(algorithm_name_to_value("dh"), Some(2));
    }

    #[test]
    fn unambiguous_abbreviation_matches() {
        assert_eq!(algorithm_name_to_value("rsas"), Some(5));
        assert_eq!(algorithm_name_to_value("ds"), Some(3));
        assert_eq!(state_name_to_value("g"), Some(1));
        assert_eq!(type_name_to_value("k"), Some(257));
    }

    #[test]
    fn ambiguous_abbreviation_fails() {
        // "d" could be dh or dsasha1
        assert_eq!(algorithm_name_to_value("d"), None);
        // "rsa" could be rsamd5 or rsasha1
        assert_eq!(algorithm_name_to_value("rsa"), None);
    }

    #[test]
    fn parameter_abbreviations() {
        // "zsk" could be zsksiglife, zsklife or zskttl
        assert_eq!(parameter_name_to_value("zsk"), None);
        assert_eq!(parameter_name_to_value("zskl"), Some(2_592_000));
        assert_eq!(parameter_name_to_value("zsks"), Some(604_800));
    }

    #[test]
    fn unknown_and_empty_names_fail() {
        assert_eq!(algorithm_name_to_value("ed25519"), None);
        assert_eq!(algorithm_name_to_value(""), None);
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(algorithm_value_to_name(5), Some("rsasha1"));
        assert_eq!(state_value_to_name(4), Some("active"));
        assert_eq!(type_value_to_name(256), Some("zsk"));
        assert_eq!(format_value_to_name(99), None);
    }

    #[test]
    fn parameter_existence_is_exact() {
        assert!(parameter_exists("clockskew"));
        assert!(!parameter_exists("clock"));
        assert!(!parameter_exists(""));
    }
}
