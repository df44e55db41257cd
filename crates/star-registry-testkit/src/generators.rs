//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value};

use star_registry_core::Keypair;

/// Generate a deterministic wallet keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a star in the shape clients submit: declination, right ascension, story.
pub fn star() -> impl Strategy<Value = Value> {
    (
        -90i32..=90,
        0u32..60,
        0u32..24,
        0u32..60,
        "[A-Za-z ,.'!]{0,64}",
    )
        .prop_map(|(deg, min, hours, ra_min, story)| {
            json!({
                "dec": format!("{}° {}'", deg, min),
                "ra": format!("{}h {}m", hours, ra_min),
                "story": story,
            })
        })
}

/// Generate an arbitrary JSON record, nested up to a few levels.
pub fn json_record() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[ -~]{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate an ownership script: which of `wallets` registers each star.
pub fn owner_sequence(wallets: usize, max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..wallets, 0..=max_len)
}
