use crate::CardId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LossReason {
    RepeatClick,
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    /// A round could not start because no cards were supplied.
    NotReady,
    RoundStarted {
        cards: usize,
        timeout_secs: Option<u32>,
    },
    ScoreDelta(u32),
    Won { revealed: usize },
    Lost { reason: LossReason },
    TimeRemaining(Option<u32>),
    OrderChanged(Vec<CardId>),
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
