use recall_data::{
    fetch_or_placeholder, load_catalog, load_stage_table, CardProvider, CatalogProvider, Category,
    Stage, StageTable,
};
use std::collections::HashSet;
use std::path::PathBuf;

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

#[test]
fn shipped_stages_match_builtin_presets() {
    let table = load_stage_table(&assets_root()).expect("load stages");
    assert_eq!(table, StageTable::builtin());
}

#[test]
fn missing_stage_file_falls_back_to_builtin() {
    let empty = std::env::temp_dir().join(format!("recall_no_assets_{}", std::process::id()));
    let table = load_stage_table(&empty).expect("fallback");
    assert_eq!(table, StageTable::builtin());
}

#[test]
fn catalog_covers_every_category() {
    let catalog = load_catalog(&assets_root()).expect("load catalog");
    for category in Category::ALL {
        let count = catalog
            .cards
            .iter()
            .filter(|entry| entry.tags.contains(&category))
            .count();
        assert!(count >= 6, "{category} has only {count} cards");
    }
}

#[test]
fn catalog_can_fill_the_hardest_stage() {
    let table = load_stage_table(&assets_root()).expect("load stages");
    let wanted = table.config_for(Stage::Hard).card_count;
    let mut provider = CatalogProvider::from_assets(&assets_root(), 99).expect("provider");
    for category in Category::ALL.into_iter().map(Some).chain([None]) {
        let cards = provider.fetch(wanted, category).expect("fetch");
        assert_eq!(cards.len(), wanted);
        let ids: HashSet<_> = cards.iter().map(|card| card.id.clone()).collect();
        assert_eq!(ids.len(), wanted, "duplicate ids for {category:?}");
    }
}

#[test]
fn fetch_report_is_clean_for_local_catalog() {
    let mut provider = CatalogProvider::from_assets(&assets_root(), 5).expect("provider");
    let report = fetch_or_placeholder(&mut provider, 10, Some(Category::Space));
    assert!(!report.is_degraded());
    assert_eq!(report.cards.len(), 10);
}
