use assert_matches::assert_matches;

use game_showcase::domain::{
    CatalogEntry, Lang, Locale, UniverseId, request_identifiers, resolve_catalog,
    resolve_identifier,
};
use game_showcase::error::ShowcaseError;

fn entry(url: &str) -> CatalogEntry {
    CatalogEntry {
        reference_url: url.to_string(),
        owner: "Gren".to_string(),
        designer: "youssef_design".to_string(),
    }
}

#[test]
fn identifier_is_digit_run_after_games_marker() {
    let id = resolve_identifier("https://www.roblox.com/games/17745731375/Bous-Revenge-HORROR");
    assert_eq!(id.unwrap().as_str(), "17745731375");
}

#[test]
fn only_first_games_marker_counts() {
    let id = resolve_identifier("https://www.roblox.com/games/12/x/games/34");
    assert_eq!(id.unwrap().as_str(), "12");
}

#[test]
fn urls_without_marker_or_digits_do_not_resolve() {
    assert!(resolve_identifier("https://www.roblox.com/users/42/profile").is_none());
    assert!(resolve_identifier("https://www.roblox.com/games/abc").is_none());
    assert!(resolve_identifier("").is_none());
}

#[test]
fn resolution_keeps_catalog_order_and_length() {
    let catalog = vec![
        entry("https://www.roblox.com/games/3/c"),
        entry("https://www.roblox.com/discover"),
        entry("https://www.roblox.com/games/1/a"),
    ];
    let resolved = resolve_catalog(&catalog);
    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved[0].identifier.as_ref().unwrap().as_str(), "3");
    assert!(resolved[1].identifier.is_none());
    assert_eq!(resolved[2].entry, catalog[2]);
}

#[test]
fn duplicate_ids_are_requested_once() {
    let catalog = vec![
        entry("https://www.roblox.com/games/7/a"),
        entry("https://www.roblox.com/games/8/b"),
        entry("https://www.roblox.com/games/7/a-again"),
    ];
    let ids = request_identifiers(&resolve_catalog(&catalog));
    let ids: Vec<&str> = ids.iter().map(UniverseId::as_str).collect();
    assert_eq!(ids, vec!["7", "8"]);
}

#[test]
fn universe_id_rejects_non_digits() {
    assert_matches!(
        "12a".parse::<UniverseId>(),
        Err(ShowcaseError::InvalidUniverseId(_))
    );
    assert_eq!(" 42 ".parse::<UniverseId>().unwrap().as_str(), "42");
}

#[test]
fn arabic_is_right_to_left() {
    assert_eq!(Lang::Ar.dir(), "rtl");
    assert_eq!(Lang::Es.dir(), "ltr");
    assert_eq!(Lang::Ar.locale(), Locale::Ar);
}
