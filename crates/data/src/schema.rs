use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use recall_core::{CardRecord, RoundConfig, Stage, StageRule, StageTable};

/// Image category. `None` at the call sites means "random".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nature,
    Animals,
    Architecture,
    Food,
    Travel,
    Technology,
    Space,
    Art,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Nature,
        Category::Animals,
        Category::Architecture,
        Category::Food,
        Category::Travel,
        Category::Technology,
        Category::Space,
        Category::Art,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Nature => "nature",
            Category::Animals => "animals",
            Category::Architecture => "architecture",
            Category::Food => "food",
            Category::Travel => "travel",
            Category::Technology => "technology",
            Category::Space => "space",
            Category::Art => "art",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Nature => "Nature",
            Category::Animals => "Animals",
            Category::Architecture => "Architecture",
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Technology => "Technology",
            Category::Space => "Space",
            Category::Art => "Art",
        }
    }

    /// Steps through `Random -> Nature -> ... -> Art -> Random`.
    pub fn cycle(current: Option<Category>, forward: bool) -> Option<Category> {
        let len = Self::ALL.len();
        let position = current.and_then(|value| Self::ALL.iter().position(|c| *c == value));
        match (position, forward) {
            (None, true) => Some(Self::ALL[0]),
            (None, false) => Some(Self::ALL[len - 1]),
            (Some(idx), true) if idx + 1 == len => None,
            (Some(idx), true) => Some(Self::ALL[idx + 1]),
            (Some(0), false) => None,
            (Some(idx), false) => Some(Self::ALL[idx - 1]),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("unknown category '{value}'"))
    }
}

pub fn category_label(category: Option<Category>) -> &'static str {
    category.map(Category::label).unwrap_or("Random")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub url: String,
    pub label: String,
    #[serde(default)]
    pub tags: Vec<Category>,
}

impl CatalogEntry {
    pub fn to_record(&self) -> CardRecord {
        CardRecord::new(self.id.as_str(), self.url.as_str(), self.label.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    pub cards: Vec<CatalogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_random() {
        assert_eq!(Category::cycle(None, true), Some(Category::Nature));
        assert_eq!(Category::cycle(Some(Category::Art), true), None);
        assert_eq!(Category::cycle(None, false), Some(Category::Art));
        assert_eq!(Category::cycle(Some(Category::Nature), false), None);
        assert_eq!(
            Category::cycle(Some(Category::Food), true),
            Some(Category::Travel)
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Space".parse::<Category>(), Ok(Category::Space));
        assert!("cars".parse::<Category>().is_err());
    }
}
