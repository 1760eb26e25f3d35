use std::collections::HashMap;

use num_bigint::BigUint;

use game_showcase::domain::{CatalogEntry, Locale, ResolvedEntry, UniverseId};
use game_showcase::merge::{UNKNOWN_NAME, merge};
use game_showcase::roblox::{ImageryRecord, MetadataRecord};

fn id(value: &str) -> UniverseId {
    value.parse().unwrap()
}

fn resolved(url: &str, identifier: Option<&str>) -> ResolvedEntry {
    ResolvedEntry {
        entry: CatalogEntry {
            reference_url: url.to_string(),
            owner: "nilcous".to_string(),
            designer: "youssef_design".to_string(),
        },
        identifier: identifier.map(id),
    }
}

fn metadata(pairs: &[(&str, &str, &str)]) -> HashMap<UniverseId, MetadataRecord> {
    pairs
        .iter()
        .map(|(key, name, visits)| {
            (
                id(key),
                MetadataRecord {
                    identifier: id(key),
                    display_name: Some(name.to_string()),
                    visit_count: visits.parse().unwrap(),
                },
            )
        })
        .collect()
}

#[test]
fn models_follow_catalog_order_and_sum_visits() {
    let entries = vec![
        resolved("https://www.roblox.com/games/2/b", Some("2")),
        resolved("https://www.roblox.com/games/1/a", Some("1")),
    ];
    let meta = metadata(&[("1", "Alpha", "1000"), ("2", "Beta", "234")]);
    let outcome = merge(&entries, &meta, &HashMap::new(), Locale::En);

    let names: Vec<&str> = outcome
        .models
        .iter()
        .map(|model| model.as_ref().unwrap().display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Beta", "Alpha"]);
    assert_eq!(outcome.total, BigUint::from(1234u32));
    assert_eq!(outcome.models[1].as_ref().unwrap().visit_count_formatted, "1,000");
}

#[test]
fn total_is_independent_of_record_order() {
    let entries = vec![
        resolved("https://www.roblox.com/games/1/a", Some("1")),
        resolved("https://www.roblox.com/games/2/b", Some("2")),
        resolved("https://www.roblox.com/games/3/c", Some("3")),
    ];
    let forward = metadata(&[
        ("1", "A", "9007199254740993"),
        ("2", "B", "7"),
        ("3", "C", "100"),
    ]);
    let reversed = metadata(&[
        ("3", "C", "100"),
        ("2", "B", "7"),
        ("1", "A", "9007199254740993"),
    ]);
    let a = merge(&entries, &forward, &HashMap::new(), Locale::En);
    let b = merge(&entries, &reversed, &HashMap::new(), Locale::En);
    assert_eq!(a.total, b.total);
    assert_eq!(a.total.to_str_radix(10), "9007199254741100");
}

#[test]
fn missing_records_fall_back_to_defaults() {
    let entries = vec![resolved("https://www.roblox.com/games/5/e", Some("5"))];
    let outcome = merge(&entries, &HashMap::new(), &HashMap::new(), Locale::En);
    let model = outcome.models[0].as_ref().unwrap();
    assert_eq!(model.display_name, UNKNOWN_NAME);
    assert_eq!(model.visit_count_formatted, "0");
    assert!(model.image_url.is_none());
    assert_eq!(outcome.total, BigUint::default());
}

#[test]
fn unresolved_entries_keep_their_slot() {
    let entries = vec![
        resolved("https://www.roblox.com/games/1/a", Some("1")),
        resolved("https://www.roblox.com/discover", None),
    ];
    let meta = metadata(&[("1", "A", "5")]);
    let mut icons = HashMap::new();
    icons.insert(
        id("1"),
        ImageryRecord {
            identifier: id("1"),
            image_url: Some("https://tr.rbxcdn.com/a.png".to_string()),
        },
    );
    let outcome = merge(&entries, &meta, &icons, Locale::En);
    assert_eq!(outcome.models.len(), 2);
    assert!(outcome.models[1].is_none());
    assert_eq!(
        outcome.models[0].as_ref().unwrap().image_url.as_deref(),
        Some("https://tr.rbxcdn.com/a.png")
    );
}

#[test]
fn duplicate_entries_each_count_toward_total() {
    let entries = vec![
        resolved("https://www.roblox.com/games/4/d", Some("4")),
        resolved("https://www.roblox.com/games/4/d-copy", Some("4")),
    ];
    let meta = metadata(&[("4", "D", "10")]);
    let outcome = merge(&entries, &meta, &HashMap::new(), Locale::En);
    assert_eq!(outcome.total, BigUint::from(20u32));
}
