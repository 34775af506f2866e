//! Classify free-text bracket notation into typed tags.
//!
//! Saved narrative text marks tags as `[Name]`, `[Name-N]`, `[--Name]`,
//! `[Name+]`, and `[Name++]`. Classification never fails: text that matches
//! none of the markers becomes a plain origin-tier story theme tag.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::tag::{Tag, TagId, TagType, TagValue, ThemeLevel};

static BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid regex"));
static NUMERIC_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)").expect("valid regex"));

const WEAKNESS_PREFIX: &str = "--";

/// Classify bracket notation into a tag whose id is derived from its name.
pub fn classify(raw: &str) -> Tag {
    let parsed = parse(raw);
    let id = tag_id_for(&parsed.name);
    parsed.into_tag(Tag::new(id, String::new(), TagType::StoryThemeTag))
}

/// Re-classify an existing tag from its name, keeping its identity flags.
pub fn classify_into(tag: Tag) -> Tag {
    let parsed = parse(&tag.name);
    parsed.into_tag(tag)
}

/// Every `[...]` group in `text`, in order, without the brackets.
pub fn extract_bracketed(text: &str) -> Vec<&str> {
    BRACKETED_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Stable id for a tag known only by name (FNV-1a over UTF-16 units).
pub fn tag_id_for(name: &str) -> TagId {
    let mut hash: u32 = 0x811c_9dc5;
    for unit in name.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash.to_string()
}

struct Parsed {
    name: String,
    kind: TagType,
    value: Option<i32>,
    level: Option<ThemeLevel>,
}

impl Parsed {
    fn into_tag(self, mut tag: Tag) -> Tag {
        tag.name = self.name;
        tag.kind = self.kind;
        if let Some(v) = self.value {
            tag.value = Some(TagValue::Scalar(v));
        }
        tag.level = self.level;
        tag
    }
}

fn parse(raw: &str) -> Parsed {
    let mut text = raw.trim();
    text = text.strip_prefix('[').unwrap_or(text);
    text = text.strip_suffix(']').unwrap_or(text);
    text = text.trim();

    let (kind, mut text) = match text.strip_prefix(WEAKNESS_PREFIX) {
        Some(rest) => (TagType::WeaknessTag, rest),
        None => (TagType::StoryThemeTag, text),
    };

    // Weaknesses have no tier; their markers stay part of the name.
    let level = if kind == TagType::WeaknessTag {
        None
    } else if let Some(rest) = text.strip_suffix("++") {
        text = rest;
        Some(ThemeLevel::Greatness)
    } else if let Some(rest) = text.strip_suffix('+') {
        text = rest;
        Some(ThemeLevel::Adventure)
    } else {
        Some(ThemeLevel::Origin)
    };

    let mut name = text.to_string();
    let mut value = None;
    let suffix = NUMERIC_SUFFIX_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let n = caps.get(1)?.as_str().parse::<i32>().ok()?;
        Some((whole.range(), n))
    });
    if let Some((range, n)) = suffix {
        value = Some(n);
        name.replace_range(range, "");
    }

    Parsed {
        name: name.trim().to_string(),
        kind,
        value,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagState;

    #[test]
    fn weakness_with_value() {
        let tag = classify("[--Coward-2]");
        assert_eq!(tag.kind, TagType::WeaknessTag);
        assert_eq!(tag.name, "Coward");
        assert_eq!(tag.value, Some(TagValue::Scalar(2)));
        assert_eq!(tag.level, None);
        assert_eq!(tag.states(), vec![TagState::Negative]);
    }

    #[test]
    fn greatness_marker() {
        let tag = classify("[Brave++]");
        assert_eq!(tag.kind, TagType::StoryThemeTag);
        assert_eq!(tag.name, "Brave");
        assert_eq!(tag.level, Some(ThemeLevel::Greatness));
        assert_eq!(tag.value, None);
    }

    #[test]
    fn adventure_marker() {
        let tag = classify("[Quick Hands+]");
        assert_eq!(tag.name, "Quick Hands");
        assert_eq!(tag.level, Some(ThemeLevel::Adventure));
    }

    #[test]
    fn plain_text_without_brackets() {
        let tag = classify("Reckless Driver-3");
        assert_eq!(tag.kind, TagType::StoryThemeTag);
        assert_eq!(tag.name, "Reckless Driver");
        assert_eq!(tag.value, Some(TagValue::Scalar(3)));
        assert_eq!(tag.level, Some(ThemeLevel::Origin));
        assert_eq!(
            tag.states(),
            vec![TagState::Negative, TagState::Positive, TagState::Burned]
        );
    }

    #[test]
    fn weakness_ignores_level_markers() {
        let tag = classify("[--Fragile+]");
        assert_eq!(tag.kind, TagType::WeaknessTag);
        assert_eq!(tag.name, "Fragile+");
        assert_eq!(tag.level, None);
    }

    #[test]
    fn malformed_input_degrades_to_plain_tag() {
        let tag = classify("[]");
        assert_eq!(tag.name, "");
        assert_eq!(tag.value, None);
        assert_eq!(tag.level, Some(ThemeLevel::Origin));

        let tag = classify("  [Shadow-  ");
        assert_eq!(tag.name, "Shadow-");
        assert_eq!(tag.value, None);
    }

    #[test]
    fn oversized_number_stays_in_name() {
        let tag = classify("[Legion-99999999999]");
        assert_eq!(tag.name, "Legion-99999999999");
        assert_eq!(tag.value, None);
    }

    #[test]
    fn later_number_used_when_first_overflows() {
        let tag = classify("[Legion-99999999999-2]");
        assert_eq!(tag.name, "Legion-99999999999");
        assert_eq!(tag.resolved_value(), 2);
    }

    #[test]
    fn classify_into_keeps_identity() {
        let tag = Tag::new("theme-1", "[Unbreakable++]", TagType::StoryTag).single_use();
        let tag = classify_into(tag);
        assert_eq!(tag.id, "theme-1");
        assert_eq!(tag.name, "Unbreakable");
        assert!(tag.is_single_use);
        assert_eq!(
            tag.states(),
            vec![TagState::Negative, TagState::Positive]
        );
    }

    #[test]
    fn extracts_bracketed_groups() {
        let text = "The [Ogre-3] swings its [Club] wildly, [--Slow].";
        assert_eq!(extract_bracketed(text), vec!["Ogre-3", "Club", "--Slow"]);
        assert!(extract_bracketed("no tags here").is_empty());
    }

    #[test]
    fn id_hash_is_stable() {
        // FNV-1a offset basis for the empty string.
        assert_eq!(tag_id_for(""), "2166136261");
        assert_eq!(tag_id_for("a"), "3826002220");
        assert_eq!(classify("[Club]").id, tag_id_for("Club"));
    }
}
