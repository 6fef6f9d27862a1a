//! Round engine: the authoritative state machine for one play attempt.
//!
//! All mutation goes through [`RoundEngine::start_round`], [`RoundEngine::click`],
//! [`RoundEngine::reset_round`], [`RoundEngine::advance`] and
//! [`RoundEngine::teardown`]. Outcomes are reported through the [`EventBus`];
//! losing is an event, never an error.

use crate::{
    CardId, CardRecord, ClockEvent, Event, EventBus, LossReason, RngState, RoundClock,
    RoundConfig, TimerHandle,
};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("no cards available; round not started")]
    NotReady,
    #[error("card count must be positive")]
    ZeroCardCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Revealed,
    Won,
    Lost,
}

/// Handles of the timers armed for the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockHandles {
    pub countdown: Option<TimerHandle>,
    pub reshuffle: Option<TimerHandle>,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    pub order: Vec<CardRecord>,
    pub revealed: HashSet<CardId>,
    pub phase: Phase,
    pub clock_handle: ClockHandles,
}

impl RoundState {
    fn idle() -> Self {
        Self {
            order: Vec::new(),
            revealed: HashSet::new(),
            phase: Phase::Idle,
            clock_handle: ClockHandles::default(),
        }
    }
}

#[derive(Debug)]
pub struct RoundEngine {
    rng: RngState,
    clock: RoundClock,
    state: RoundState,
    cards: Vec<CardRecord>,
    config: Option<RoundConfig>,
    auto_reshuffle: bool,
}

impl RoundEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(RngState::from_seed(seed))
    }

    pub fn with_rng(rng: RngState) -> Self {
        Self {
            rng,
            clock: RoundClock::new(),
            state: RoundState::idle(),
            cards: Vec::new(),
            config: None,
            auto_reshuffle: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn order(&self) -> &[CardRecord] {
        &self.state.order
    }

    pub fn revealed(&self) -> &HashSet<CardId> {
        &self.state.revealed
    }

    pub fn is_revealed(&self, id: &CardId) -> bool {
        self.state.revealed.contains(id)
    }

    pub fn config(&self) -> Option<&RoundConfig> {
        self.config.as_ref()
    }

    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.clock.remaining()
    }

    pub fn auto_reshuffle_enabled(&self) -> bool {
        self.auto_reshuffle
    }

    /// Supersedes any round in progress. An empty `cards` leaves the engine
    /// `Idle` and reports [`Event::NotReady`].
    pub fn start_round(
        &mut self,
        cards: Vec<CardRecord>,
        config: RoundConfig,
        events: &mut EventBus,
    ) -> Result<(), RoundError> {
        self.cards = cards;
        self.config = Some(config);
        self.begin(events)
    }

    /// Starts over with the last card set and config.
    pub fn reset_round(&mut self, events: &mut EventBus) -> Result<(), RoundError> {
        self.begin(events)
    }

    pub fn click(&mut self, id: &CardId, events: &mut EventBus) -> ClickOutcome {
        if self.state.phase != Phase::Active {
            return ClickOutcome::Ignored;
        }
        if !self.state.order.iter().any(|card| &card.id == id) {
            warn!(card = %id, "click on a card outside the round");
            return ClickOutcome::Ignored;
        }
        if self.state.revealed.contains(id) {
            debug!(card = %id, "repeat click");
            self.lose(LossReason::RepeatClick, events);
            return ClickOutcome::Lost;
        }

        self.state.revealed.insert(id.clone());
        events.push(Event::ScoreDelta(1));

        if self.state.revealed.len() == self.state.order.len() {
            self.disarm(events);
            self.state.phase = Phase::Won;
            debug!(revealed = self.state.revealed.len(), "round won");
            events.push(Event::Won {
                revealed: self.state.revealed.len(),
            });
            return ClickOutcome::Won;
        }

        self.reshuffle(events);
        self.arm_countdown(events);
        ClickOutcome::Revealed
    }

    /// Moves the round clock forward by `elapsed` and applies every timer that
    /// fires along the way, in time order.
    pub fn advance(&mut self, elapsed: Duration, events: &mut EventBus) {
        let until = self.clock.now() + elapsed;
        while let Some(fired) = self.clock.poll(until) {
            self.on_clock_event(fired, events);
        }
    }

    /// Driver toggle for the periodic reshuffle. Only has an effect on stages
    /// that configure an interval.
    pub fn set_auto_reshuffle(&mut self, enabled: bool) {
        self.auto_reshuffle = enabled;
        self.sync_reshuffle();
    }

    /// Cancels every timer and returns to `Idle`. The card set and config are
    /// kept so a later [`RoundEngine::reset_round`] can start again.
    pub fn teardown(&mut self, events: &mut EventBus) {
        self.disarm(events);
        if self.state.phase == Phase::Active {
            self.state.phase = Phase::Idle;
        }
    }

    fn begin(&mut self, events: &mut EventBus) -> Result<(), RoundError> {
        self.disarm(events);
        self.state = RoundState::idle();

        let Some(config) = self.config else {
            events.push(Event::NotReady);
            return Err(RoundError::NotReady);
        };
        if config.card_count == 0 {
            events.push(Event::NotReady);
            return Err(RoundError::ZeroCardCount);
        }
        if self.cards.is_empty() {
            events.push(Event::NotReady);
            return Err(RoundError::NotReady);
        }

        let take = config.card_count.min(self.cards.len());
        if take < config.card_count {
            debug!(
                requested = config.card_count,
                available = self.cards.len(),
                "card source short; truncating round"
            );
        }
        let mut order = self.cards[..take].to_vec();
        self.rng.shuffle(&mut order);
        self.state.order = order;
        self.state.phase = Phase::Active;
        debug!(cards = take, "round started");

        events.push(Event::RoundStarted {
            cards: take,
            timeout_secs: config.per_click_timeout_secs,
        });
        events.push(Event::OrderChanged(self.order_ids()));
        if !self.arm_countdown(events) {
            events.push(Event::TimeRemaining(None));
        }
        self.sync_reshuffle();
        Ok(())
    }

    fn on_clock_event(&mut self, fired: ClockEvent, events: &mut EventBus) {
        match fired {
            ClockEvent::Tick { handle, remaining } => {
                if self.state.clock_handle.countdown == Some(handle) {
                    events.push(Event::TimeRemaining(Some(remaining)));
                }
            }
            ClockEvent::Expired { handle } => {
                if self.state.clock_handle.countdown == Some(handle)
                    && self.state.phase == Phase::Active
                {
                    debug!("per-click timer expired");
                    self.lose(LossReason::TimedOut, events);
                }
            }
            ClockEvent::Reshuffle { handle } => {
                if self.state.clock_handle.reshuffle == Some(handle)
                    && self.state.phase == Phase::Active
                {
                    self.reshuffle(events);
                }
            }
        }
    }

    fn lose(&mut self, reason: LossReason, events: &mut EventBus) {
        self.disarm(events);
        self.state.phase = Phase::Lost;
        self.state.revealed.clear();
        self.reshuffle(events);
        debug!(?reason, "round lost");
        events.push(Event::Lost { reason });
    }

    fn reshuffle(&mut self, events: &mut EventBus) {
        self.rng.shuffle(&mut self.state.order);
        events.push(Event::OrderChanged(self.order_ids()));
    }

    /// Arms the per-click countdown from full duration when the config has one.
    fn arm_countdown(&mut self, events: &mut EventBus) -> bool {
        let Some(seconds) = self.config.and_then(|config| config.per_click_timeout_secs) else {
            return false;
        };
        let handle = self.clock.arm_countdown(seconds);
        self.state.clock_handle.countdown = Some(handle);
        events.push(Event::TimeRemaining(Some(seconds)));
        true
    }

    fn sync_reshuffle(&mut self) {
        let period = self
            .config
            .and_then(|config| config.auto_reshuffle_period())
            .filter(|_| self.auto_reshuffle && self.state.phase == Phase::Active);
        match period {
            Some(period) => {
                if self.state.clock_handle.reshuffle.is_none() {
                    self.state.clock_handle.reshuffle = Some(self.clock.arm_reshuffle(period));
                }
            }
            None => {
                self.clock.disarm_reshuffle();
                self.state.clock_handle.reshuffle = None;
            }
        }
    }

    /// An expired countdown is already gone from the clock but still recorded
    /// here, so the cleared display is reported for expiry as well.
    fn disarm(&mut self, events: &mut EventBus) {
        self.clock.disarm_all();
        if self.state.clock_handle.countdown.is_some() {
            events.push(Event::TimeRemaining(None));
        }
        self.state.clock_handle = ClockHandles::default();
    }

    fn order_ids(&self) -> Vec<CardId> {
        self.state.order.iter().map(|card| card.id.clone()).collect()
    }
}
