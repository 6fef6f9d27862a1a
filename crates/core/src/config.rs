use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const HARD_RESHUFFLE_SECS: NonZeroU32 = NonZeroU32::MIN.saturating_add(5);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Easy,
    Medium,
    Hard,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Easy, Stage::Medium, Stage::Hard];

    pub fn number(self) -> u8 {
        match self {
            Stage::Easy => 1,
            Stage::Medium => 2,
            Stage::Hard => 3,
        }
    }

    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(Stage::Easy),
            2 => Some(Stage::Medium),
            3 => Some(Stage::Hard),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(number) = value.parse::<u8>() {
            return Self::from_number(number);
        }
        match value.to_ascii_lowercase().as_str() {
            "easy" => Some(Stage::Easy),
            "medium" => Some(Stage::Medium),
            "hard" => Some(Stage::Hard),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Easy => "Easy",
            Stage::Medium => "Medium",
            Stage::Hard => "Hard",
        }
    }
}

/// Per-round parameters. `card_count` is an upper bound: a short card source
/// plays with whatever it supplied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundConfig {
    pub card_count: usize,
    #[serde(default)]
    pub per_click_timeout_secs: Option<u32>,
    #[serde(default)]
    pub auto_reshuffle_secs: Option<NonZeroU32>,
}

impl RoundConfig {
    pub fn untimed(card_count: usize) -> Self {
        Self {
            card_count,
            per_click_timeout_secs: None,
            auto_reshuffle_secs: None,
        }
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.per_click_timeout_secs = Some(seconds);
        self
    }

    pub fn with_auto_reshuffle(mut self, seconds: NonZeroU32) -> Self {
        self.auto_reshuffle_secs = Some(seconds);
        self
    }

    pub fn auto_reshuffle_period(&self) -> Option<Duration> {
        self.auto_reshuffle_secs
            .map(|secs| Duration::from_secs(u64::from(secs.get())))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageRule {
    pub stage: Stage,
    #[serde(flatten)]
    pub config: RoundConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTable {
    pub stages: Vec<StageRule>,
}

impl StageTable {
    pub fn builtin() -> Self {
        Self {
            stages: vec![
                StageRule {
                    stage: Stage::Easy,
                    config: RoundConfig::untimed(10),
                },
                StageRule {
                    stage: Stage::Medium,
                    config: RoundConfig::untimed(20).with_timeout(7),
                },
                StageRule {
                    stage: Stage::Hard,
                    config: RoundConfig::untimed(30)
                        .with_timeout(5)
                        .with_auto_reshuffle(HARD_RESHUFFLE_SECS),
                },
            ],
        }
    }

    pub fn rule(&self, stage: Stage) -> Option<&StageRule> {
        self.stages.iter().find(|rule| rule.stage == stage)
    }

    /// Falls back to the built-in preset when the table has no entry for `stage`.
    pub fn config_for(&self, stage: Stage) -> RoundConfig {
        if let Some(rule) = self.rule(stage) {
            return rule.config;
        }
        Self::builtin()
            .rule(stage)
            .map(|rule| rule.config)
            .unwrap_or_else(|| RoundConfig::untimed(10))
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::builtin()
    }
}
