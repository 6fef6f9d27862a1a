use recall_data::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PREFS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    pub version: u32,
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFS_SCHEMA_VERSION,
            best_score: 0,
            theme: Theme::default(),
            category: None,
        }
    }
}

pub fn default_prefs_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("RECALL_PREFS") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".recall_prefs.json"))
}

/// A missing file is not an error: first launch starts from defaults.
pub fn load_prefs(path: &Path) -> Result<Preferences, String> {
    if !path.exists() {
        return Ok(Preferences::default());
    }
    let body = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let prefs: Preferences = serde_json::from_str(&body).map_err(|err| err.to_string())?;
    if prefs.version != PREFS_SCHEMA_VERSION {
        return Err(format!(
            "unsupported prefs version {} (expected {})",
            prefs.version, PREFS_SCHEMA_VERSION
        ));
    }
    Ok(prefs)
}

pub fn save_prefs(prefs: &Preferences, path: &Path) -> Result<(), String> {
    let payload = Preferences {
        version: PREFS_SCHEMA_VERSION,
        ..prefs.clone()
    };
    let body = serde_json::to_string_pretty(&payload).map_err(|err| err.to_string())?;
    fs::write(path, body).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn save_then_load_keeps_fields() {
        let file = unique_temp_file();
        let prefs = Preferences {
            best_score: 17,
            theme: Theme::Dark,
            category: Some(Category::Space),
            ..Preferences::default()
        };
        save_prefs(&prefs, &file).expect("save");
        let loaded = load_prefs(&file).expect("load");
        assert_eq!(loaded, prefs);
        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let file = unique_temp_file();
        assert_eq!(load_prefs(&file).expect("load"), Preferences::default());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let file = unique_temp_file();
        std::fs::write(&file, r#"{"version":1,"best_score":4}"#).expect("write");
        let loaded = load_prefs(&file).expect("load");
        assert_eq!(loaded.best_score, 4);
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.category, None);
        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn rejects_other_versions() {
        let file = unique_temp_file();
        std::fs::write(&file, r#"{"version":9,"best_score":4}"#).expect("write");
        let err = load_prefs(&file).expect_err("version mismatch");
        assert!(err.contains("unsupported prefs version 9"));
        let _ = std::fs::remove_file(file);
    }

    fn unique_temp_file() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "recall_cui_prefs_test_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }
}
