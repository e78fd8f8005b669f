//! Stable numeric encode-ID allocation.
//!
//! An encode ID identifies a field or member on the wire. IDs must stay
//! stable across regenerations as long as the identifying key (property
//! name, enum value, stringified member type) is unchanged, so that
//! independently compiled producers and consumers agree.

use std::collections::{HashMap, HashSet};

use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeIdPair {
    pub key: String,
    pub id: u32,
}

/// Assigns an ID to every key, in order.
///
/// Keys that appear in `prior` keep their prior ID; all other keys take the
/// smallest IDs not used by any kept or already-assigned key. No two keys
/// ever receive the same ID, even when the input contains duplicate keys.
pub fn gen_encode_ids(keys: &[String], prior: Option<&[EncodeIdPair]>) -> Vec<EncodeIdPair> {
    let prior_map: HashMap<&str, u32> = prior
        .unwrap_or(&[])
        .iter()
        .map(|p| (p.key.as_str(), p.id))
        .collect();

    // Reserve every kept ID up front so fresh keys never collide with a
    // kept key that appears later in the list.
    let mut used: HashSet<u32> = keys
        .iter()
        .filter_map(|k| prior_map.get(k.as_str()).copied())
        .collect();

    let mut out = Vec::with_capacity(keys.len());
    let mut assigned: HashSet<u32> = HashSet::new();
    let mut next: u32 = 0;

    for key in keys {
        let id = match prior_map.get(key.as_str()) {
            Some(&id) if !assigned.contains(&id) => id,
            _ => {
                while used.contains(&next) || assigned.contains(&next) {
                    next += 1;
                }
                next
            }
        };
        assigned.insert(id);
        out.push(EncodeIdPair {
            key: key.clone(),
            id,
        });
    }

    out
}

/// The ordered key list of a schema's ID-carrying collection: property names
/// for interfaces, stringified values for enums, stringified member types
/// for unions and intersections. Empty for everything else.
pub fn schema_encode_keys(schema: &Schema) -> Vec<String> {
    match schema {
        Schema::Enum { members } => members.iter().map(|m| m.value.to_key()).collect(),
        Schema::Interface {
            properties: Some(properties),
            ..
        } => properties.iter().map(|p| p.name.clone()).collect(),
        Schema::Union { members } | Schema::Intersection { members } => members
            .iter()
            .map(|m| serde_json::to_string(&m.type_).expect("schema serializes to JSON"))
            .collect(),
        _ => Vec::new(),
    }
}

/// The existing (key, id) pairs of a schema, used as reuse hints. Absent or
/// keyless schemas yield an empty list.
pub fn schema_encode_ids(schema: Option<&Schema>) -> Vec<EncodeIdPair> {
    let schema = match schema {
        Some(s) => s,
        None => return Vec::new(),
    };
    match schema {
        Schema::Enum { members } => members
            .iter()
            .map(|m| EncodeIdPair {
                key: m.value.to_key(),
                id: m.id,
            })
            .collect(),
        Schema::Interface {
            properties: Some(properties),
            ..
        } => properties
            .iter()
            .map(|p| EncodeIdPair {
                key: p.name.clone(),
                id: p.id,
            })
            .collect(),
        Schema::Union { members } | Schema::Intersection { members } => members
            .iter()
            .map(|m| EncodeIdPair {
                key: serde_json::to_string(&m.type_).expect("schema serializes to JSON"),
                id: m.id,
            })
            .collect(),
        _ => Vec::new(),
    }
}
