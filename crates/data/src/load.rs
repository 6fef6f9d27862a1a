use crate::schema::{Catalog, StageTable};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const STAGES_FILE: &str = "stages.json";
const CATALOG_FILE: &str = "cards.json";

/// Reads `stages.json` from `dir`, falling back to the built-in presets when
/// the file is absent. Stages the file leaves out keep their built-in rule.
pub fn load_stage_table(dir: &Path) -> anyhow::Result<StageTable> {
    let path = dir.join(STAGES_FILE);
    if !path.exists() {
        return Ok(StageTable::builtin());
    }
    let table: StageTable = load_json(&path)?;
    validate_stage_table(&table).with_context(|| format!("validate {}", path.display()))?;
    Ok(table)
}

pub fn load_catalog(dir: &Path) -> anyhow::Result<Catalog> {
    let path = dir.join(CATALOG_FILE);
    let catalog: Catalog = load_json(&path)?;
    validate_catalog(&catalog).with_context(|| format!("validate {}", path.display()))?;
    Ok(catalog)
}

fn validate_stage_table(table: &StageTable) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for rule in &table.stages {
        if !seen.insert(rule.stage) {
            bail!("stage {:?} defined twice", rule.stage);
        }
        if rule.config.card_count == 0 {
            bail!("stage {:?} has card_count 0", rule.stage);
        }
    }
    Ok(())
}

fn validate_catalog(catalog: &Catalog) -> anyhow::Result<()> {
    let mut ids = HashSet::new();
    for entry in &catalog.cards {
        if entry.id.trim().is_empty() {
            bail!("catalog entry with empty id");
        }
        if !ids.insert(entry.id.as_str()) {
            bail!("duplicate catalog id '{}'", entry.id);
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CatalogEntry, Stage, StageRule};
    use recall_core::RoundConfig;

    #[test]
    fn rejects_zero_card_stage() {
        let table = StageTable {
            stages: vec![StageRule {
                stage: Stage::Easy,
                config: RoundConfig::untimed(0),
            }],
        };
        assert!(validate_stage_table(&table).is_err());
    }

    #[test]
    fn rejects_duplicate_stage() {
        let rule = StageRule {
            stage: Stage::Hard,
            config: RoundConfig::untimed(4),
        };
        let table = StageTable {
            stages: vec![rule, rule],
        };
        assert!(validate_stage_table(&table).is_err());
    }

    #[test]
    fn rejects_duplicate_catalog_ids() {
        let entry = CatalogEntry {
            id: "x".to_string(),
            url: "u".to_string(),
            label: "l".to_string(),
            tags: Vec::new(),
        };
        let catalog = Catalog {
            cards: vec![entry.clone(), entry],
        };
        assert!(validate_catalog(&catalog).is_err());
    }
}
