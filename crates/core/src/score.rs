use crate::Event;
use serde::{Deserialize, Serialize};

/// Current/best score tracking fed from round events. The engine never
/// touches this; the driver applies drained events to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    current: u32,
    best: u32,
}

impl Scoreboard {
    pub fn with_best(best: u32) -> Self {
        Self { current: 0, best }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn reset_current(&mut self) {
        self.current = 0;
    }

    /// Returns true when the event raised the best score.
    pub fn apply(&mut self, event: &Event) -> bool {
        let Event::ScoreDelta(delta) = event else {
            return false;
        };
        self.current = self.current.saturating_add(*delta);
        if self.current > self.best {
            self.best = self.current;
            return true;
        }
        false
    }
}
