//! Tags read from a targeted challenge's description.
//!
//! A challenge lists its tags inline as `[Name]` or `[Name-N]`. Tags with a
//! number are statuses at that level; the rest are plain target tags. Both
//! can only be engaged against the roll.

use crate::classify::{extract_bracketed, tag_id_for};
use crate::tag::{Tag, TagType, TagValue};

/// Parse every bracketed tag in a challenge's tag text.
pub fn target_tags(text: &str) -> Vec<Tag> {
    extract_bracketed(text)
        .into_iter()
        .filter_map(target_tag)
        .collect()
}

fn target_tag(raw: &str) -> Option<Tag> {
    match raw.split_once('-') {
        Some((name, level)) => {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let mut tag = Tag::new(tag_id_for(name), name, TagType::Status);
            tag.value = leading_int(level).map(TagValue::Scalar);
            Some(tag)
        }
        None => {
            let name = raw.trim();
            if name.is_empty() {
                return None;
            }
            Some(Tag::new(tag_id_for(name), name, TagType::TargetTag))
        }
    }
}

/// The integer at the start of `s`, ignoring anything after it.
fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_and_plain_tags() {
        let tags = target_tags("A hulking [Ogre-3] with a [Spiked Club] and [Thick Hide-2ish].");
        assert_eq!(tags.len(), 3);

        assert_eq!(tags[0].name, "Ogre");
        assert_eq!(tags[0].kind, TagType::Status);
        assert_eq!(tags[0].resolved_value(), 3);
        assert_eq!(tags[0].id, tag_id_for("Ogre"));

        assert_eq!(tags[1].name, "Spiked Club");
        assert_eq!(tags[1].kind, TagType::TargetTag);
        assert_eq!(tags[1].value, None);

        assert_eq!(tags[2].name, "Thick Hide");
        assert_eq!(tags[2].resolved_value(), 2);
    }

    #[test]
    fn unnumbered_status_has_no_value() {
        let tags = target_tags("[Angry-]");
        assert_eq!(tags[0].kind, TagType::Status);
        assert_eq!(tags[0].value, None);
    }

    #[test]
    fn nameless_groups_are_skipped() {
        assert!(target_tags("[--Slow] [ ]").is_empty());
    }

    #[test]
    fn target_tags_only_oppose() {
        let tags = target_tags("[Spiked Club]");
        assert_eq!(tags[0].states(), vec![crate::tag::TagState::Negative]);
    }
}
