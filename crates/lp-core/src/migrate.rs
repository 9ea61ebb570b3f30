//! # Legacy Migration
//!
//! Documents written before the block list existed carry a flat `links`
//! array. `normalize` upgrades that shape on the read path, immediately
//! after every raw read and before any other component sees the document.
//! It is never invoked on write; the upgraded shape is simply what the
//! next save persists.

use serde_json::{json, Value};

use crate::models::{ContentBlock, LegacyLink, Profile};

/// Turns a raw stored document into a current-shape Profile.
///
/// Rules:
/// - non-empty `links` and no `blocks`: each legacy link becomes a
///   `link` block in original order;
/// - `blocks` present: `links` is ignored;
/// - `links` is dropped from the result either way;
/// - malformed optional fields default instead of failing.
///
/// Idempotent: normalizing an already-normalized document is a no-op.
pub fn normalize(raw: Value) -> Profile {
    let mut obj = match raw {
        Value::Object(obj) => obj,
        _ => return Profile::blank(),
    };

    let legacy = obj.remove("links");
    let block_values = match obj.remove("blocks") {
        Some(Value::Array(items)) => items,
        Some(_) => Vec::new(),
        None => legacy_links_to_blocks(legacy),
    };

    let blocks: Vec<ContentBlock> = block_values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    let mut profile: Profile =
        serde_json::from_value(Value::Object(obj)).unwrap_or_else(|_| Profile::blank());
    profile.blocks = blocks;
    profile
}

fn legacy_links_to_blocks(legacy: Option<Value>) -> Vec<Value> {
    let items = match legacy {
        Some(Value::Array(items)) => items,
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|value| serde_json::from_value::<LegacyLink>(value).ok())
        .map(|link| {
            json!({
                "type": "link",
                "title": link.title,
                "url": link.url,
                "featured": link.featured.unwrap_or(false),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentBlock;
    use serde_json::json;

    fn legacy_doc() -> Value {
        json!({
            "ownerId": "u1",
            "displayName": "Jane",
            "links": [
                { "title": "Site", "url": "https://a.example" },
                { "title": "Blog", "url": "https://b.example", "featured": true },
            ]
        })
    }

    #[test]
    fn legacy_links_become_blocks_in_order() {
        let profile = normalize(legacy_doc());
        assert_eq!(profile.blocks.len(), 2);
        assert_eq!(
            profile.blocks[0],
            ContentBlock::Link {
                title: "Site".into(),
                url: "https://a.example".into(),
                featured: false,
            }
        );
        assert_eq!(
            profile.blocks[1],
            ContentBlock::Link {
                title: "Blog".into(),
                url: "https://b.example".into(),
                featured: true,
            }
        );
    }

    #[test]
    fn blocks_win_over_links() {
        let profile = normalize(json!({
            "links": [{ "title": "old", "url": "" }],
            "blocks": [{ "type": "text", "body": "current" }]
        }));
        assert_eq!(profile.blocks, vec![ContentBlock::Text { body: "current".into() }]);
    }

    #[test]
    fn migration_is_idempotent() {
        let once = normalize(legacy_doc());
        let twice = normalize(serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn links_are_dropped_from_the_result() {
        let profile = normalize(legacy_doc());
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("links").is_none());
        assert!(value.get("blocks").is_some());
    }

    #[test]
    fn unknown_block_types_are_skipped_not_fatal() {
        let profile = normalize(json!({
            "blocks": [
                { "type": "hologram", "url": "x" },
                { "type": "text", "body": "kept" },
            ]
        }));
        assert_eq!(profile.blocks, vec![ContentBlock::Text { body: "kept".into() }]);
    }

    #[test]
    fn non_object_raw_falls_back_to_blank() {
        let profile = normalize(json!("garbage"));
        assert_eq!(profile, Profile::blank());
    }

    #[test]
    fn empty_blocks_array_stays_empty() {
        let profile = normalize(json!({ "blocks": [] }));
        assert!(profile.blocks.is_empty());
    }
}
