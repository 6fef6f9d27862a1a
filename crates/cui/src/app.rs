use crate::actions::dispatch;
use crate::input::InputAction;
use crate::persistence::{default_prefs_path, load_prefs, save_prefs, Preferences, Theme};
use crate::LaunchOptions;
use anyhow::{Context, Result};
use recall_core::{
    CardRecord, ClickOutcome, Event, EventBus, LossReason, Phase, RngState, RoundEngine,
    Scoreboard, Stage, StageTable,
};
use recall_data::{
    category_label, fetch_or_placeholder, load_stage_table, CardProvider, CatalogProvider,
    Category,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const GRID_COLUMNS: usize = 5;
const MAX_EVENT_LOG: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMove {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost(LossReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSource {
    Catalog,
    Unsplash,
}

impl CardSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "catalog" | "local" => Some(Self::Catalog),
            "unsplash" => Some(Self::Unsplash),
            _ => None,
        }
    }
}

pub struct App {
    pub stage: Stage,
    pub category: Option<Category>,
    pub theme: Theme,
    pub stages: StageTable,
    pub engine: RoundEngine,
    pub events: EventBus,
    pub score: Scoreboard,
    pub seed: u64,
    pub time_left: Option<u32>,
    pub cursor: usize,
    /// False while the start/stop gate holds the round.
    pub running: bool,
    pub outcome: Option<Outcome>,
    pub new_best: bool,
    pub load_error: Option<String>,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub show_menu: bool,
    pub should_quit: bool,
    provider: Box<dyn CardProvider>,
    prefs_path: Option<PathBuf>,
}

impl App {
    pub fn bootstrap(options: &LaunchOptions) -> Result<Self> {
        let stages = load_stage_table(&options.assets_dir)
            .with_context(|| format!("load stages from {}", options.assets_dir.display()))?;
        let stage = match options.stage.as_deref() {
            Some(value) => Stage::parse(value)
                .ok_or_else(|| anyhow::anyhow!("unknown stage `{value}` (easy|medium|hard)"))?,
            None => Stage::Easy,
        };
        let requested_category = options
            .category
            .as_deref()
            .map(parse_category_arg)
            .transpose()?;
        let seed = options
            .seed
            .unwrap_or_else(|| RngState::from_entropy().seed());
        let provider = build_provider(options, seed)?;

        let prefs_path = options.prefs_path.clone().or_else(default_prefs_path);
        let (prefs, prefs_error) = match prefs_path.as_deref() {
            Some(path) => match load_prefs(path) {
                Ok(prefs) => (prefs, None),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "ignoring saved preferences");
                    (Preferences::default(), Some(err))
                }
            },
            None => (Preferences::default(), None),
        };
        let category = requested_category.unwrap_or(prefs.category);

        let mut app = Self::with_parts(provider, stages, seed, stage, category, prefs.best_score);
        app.theme = prefs.theme;
        app.prefs_path = prefs_path;
        app.running = !options.gated;
        info!(seed, stage = stage.label(), "session started");

        app.new_round();
        if let Some(err) = prefs_error {
            app.push_status(format!("preferences reset: {err}"));
        } else if !app.running {
            app.push_status("stopped; press s to start");
        }
        Ok(app)
    }

    fn with_parts(
        provider: Box<dyn CardProvider>,
        stages: StageTable,
        seed: u64,
        stage: Stage,
        category: Option<Category>,
        best_score: u32,
    ) -> Self {
        Self {
            stage,
            category,
            theme: Theme::default(),
            stages,
            engine: RoundEngine::new(seed),
            events: EventBus::default(),
            score: Scoreboard::with_best(best_score),
            seed,
            time_left: None,
            cursor: 0,
            running: true,
            outcome: None,
            new_best: false,
            load_error: None,
            event_log: VecDeque::new(),
            status_line: String::new(),
            show_help: false,
            show_menu: false,
            should_quit: false,
            provider,
            prefs_path: None,
        }
    }

    pub fn cards(&self) -> &[CardRecord] {
        self.engine.order()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn category_label(&self) -> &'static str {
        category_label(self.category)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Refetches cards for the current stage and category and starts over
    /// from a zero score.
    pub fn new_round(&mut self) {
        self.clear_round_flags();
        let config = self.stages.config_for(self.stage);
        let report =
            fetch_or_placeholder(self.provider.as_mut(), config.card_count, self.category);
        self.load_error = report.error.clone();
        let started = self
            .engine
            .start_round(report.cards, config, &mut self.events);
        match (&started, &report.error) {
            (Err(err), Some(source)) => {
                self.push_status(format!("unable to load images ({source}); press r to try again"));
                warn!(error = %err, "round not started");
            }
            (Err(err), None) => {
                self.push_status(format!("{err}; press r to try again"));
            }
            (Ok(()), Some(source)) => {
                self.push_status(format!("using placeholder cards: {source}"));
            }
            (Ok(()), None) => {
                self.push_status(format!(
                    "{} | {} | {} cards",
                    self.stage.label(),
                    self.category_label(),
                    self.engine.order().len()
                ));
            }
        }
        if started.is_ok() && !self.running {
            self.engine.teardown(&mut self.events);
        }
        self.flush_events();
    }

    pub fn restart(&mut self) {
        self.new_round();
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.new_round();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.persist_prefs();
        self.new_round();
    }

    pub fn cycle_category(&mut self, forward: bool) {
        self.set_category(Category::cycle(self.category, forward));
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.persist_prefs();
        self.push_status(format!("theme: {}", self.theme.label()));
    }

    pub fn toggle_auto_reshuffle(&mut self) {
        let enabled = !self.engine.auto_reshuffle_enabled();
        self.engine.set_auto_reshuffle(enabled);
        let has_interval = self
            .engine
            .config()
            .and_then(|config| config.auto_reshuffle_period())
            .is_some();
        let state = if enabled { "on" } else { "off" };
        if has_interval {
            self.push_status(format!("auto reshuffle {state}"));
        } else {
            self.push_status(format!(
                "auto reshuffle {state} (no effect on {})",
                self.stage.label()
            ));
        }
    }

    /// Stop tears the round down and drops progress; Start begins a fresh
    /// round over the same cards.
    pub fn toggle_gate(&mut self) {
        if self.running {
            self.running = false;
            self.engine.teardown(&mut self.events);
            self.clear_round_flags();
            self.push_status("stopped; press s to start");
            self.flush_events();
            return;
        }
        self.running = true;
        self.clear_round_flags();
        if self.engine.reset_round(&mut self.events).is_err() {
            self.flush_events();
            self.new_round();
            return;
        }
        self.push_status("started");
        self.flush_events();
    }

    /// Enter/Space: click the card under the cursor, or retry after a
    /// finished or failed round.
    pub fn activate_primary(&mut self) {
        if self.show_menu || self.show_help {
            self.show_menu = false;
            self.show_help = false;
            return;
        }
        if !self.running {
            self.push_status("stopped; press s to start");
            return;
        }
        match self.engine.phase() {
            Phase::Won | Phase::Lost => self.restart(),
            Phase::Idle => self.new_round(),
            Phase::Active => {
                self.click_card(self.cursor);
            }
        }
    }

    pub fn click_card(&mut self, index: usize) -> ClickOutcome {
        if !self.running {
            return ClickOutcome::Ignored;
        }
        let Some(id) = self.engine.order().get(index).map(|card| card.id.clone()) else {
            return ClickOutcome::Ignored;
        };
        let outcome = self.engine.click(&id, &mut self.events);
        self.flush_events();
        outcome
    }

    pub fn move_cursor(&mut self, direction: GridMove) {
        let len = self.engine.order().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        match direction {
            GridMove::Left => move_index(&mut self.cursor, len, false),
            GridMove::Right => move_index(&mut self.cursor, len, true),
            GridMove::Down => {
                let next = self.cursor + GRID_COLUMNS;
                self.cursor = if next < len {
                    next
                } else {
                    self.cursor % GRID_COLUMNS
                };
            }
            GridMove::Up => {
                if self.cursor >= GRID_COLUMNS {
                    self.cursor -= GRID_COLUMNS;
                } else {
                    let mut idx = self.cursor;
                    while idx + GRID_COLUMNS < len {
                        idx += GRID_COLUMNS;
                    }
                    self.cursor = idx;
                }
            }
        }
    }

    /// Forwards elapsed wall time to the round clock.
    pub fn on_tick(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }
        self.engine.advance(elapsed, &mut self.events);
        self.flush_events();
    }

    /// Catches the clock up to the moment a key was read, then applies it.
    /// A click that arrives after the round already ended on time is dropped
    /// so it cannot start the next round.
    pub fn apply_input(&mut self, action: InputAction, elapsed: Duration) {
        let was_active = self.engine.phase() == Phase::Active;
        self.on_tick(elapsed);
        if action == InputAction::Click && was_active && self.engine.phase().is_terminal() {
            return;
        }
        dispatch(self, action);
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    fn clear_round_flags(&mut self) {
        self.outcome = None;
        self.new_best = false;
        self.time_left = None;
        self.score.reset_current();
    }

    fn flush_events(&mut self) {
        let drained: Vec<_> = self.events.drain().collect();
        let mut raised = false;
        for event in drained {
            raised |= self.score.apply(&event);
            match &event {
                Event::TimeRemaining(value) => {
                    self.time_left = *value;
                    continue;
                }
                Event::Won { .. } => self.outcome = Some(Outcome::Won),
                Event::Lost { reason } => self.outcome = Some(Outcome::Lost(*reason)),
                Event::RoundStarted { cards, .. } => {
                    if self.cursor >= *cards {
                        self.cursor = 0;
                    }
                }
                _ => {}
            }
            self.push_event_line(format_event(&event));
        }
        if raised {
            self.new_best = true;
            self.persist_prefs();
        }
    }

    fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }

    fn persist_prefs(&mut self) {
        let Some(path) = self.prefs_path.clone() else {
            return;
        };
        let prefs = Preferences {
            best_score: self.score.best(),
            theme: self.theme,
            category: self.category,
            ..Preferences::default()
        };
        if let Err(err) = save_prefs(&prefs, &path) {
            warn!(path = %path.display(), error = %err, "failed to save preferences");
            self.push_status(format!("save failed: {err}"));
        }
    }
}

fn build_provider(options: &LaunchOptions, seed: u64) -> Result<Box<dyn CardProvider>> {
    match options.source {
        CardSource::Catalog => {
            let provider = CatalogProvider::from_assets(&options.assets_dir, seed.rotate_left(17))
                .with_context(|| {
                    format!("load card catalog from {}", options.assets_dir.display())
                })?;
            Ok(Box::new(provider))
        }
        #[cfg(feature = "unsplash")]
        CardSource::Unsplash => Ok(Box::new(recall_data::UnsplashProvider::from_env())),
        #[cfg(not(feature = "unsplash"))]
        CardSource::Unsplash => {
            anyhow::bail!("this build has no unsplash support; rebuild with --features unsplash")
        }
    }
}

fn parse_category_arg(value: &str) -> Result<Option<Category>> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("random") || trimmed.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    trimmed
        .parse::<Category>()
        .map(Some)
        .map_err(|err| anyhow::anyhow!(err))
}

fn format_event(event: &Event) -> String {
    match event {
        Event::NotReady => "no cards available".to_string(),
        Event::RoundStarted {
            cards,
            timeout_secs,
        } => match timeout_secs {
            Some(secs) => format!("round started: {cards} cards, {secs}s per click"),
            None => format!("round started: {cards} cards, untimed"),
        },
        Event::ScoreDelta(delta) => format!("+{delta}"),
        Event::Won { revealed } => format!("won! all {revealed} cards found"),
        Event::Lost { reason } => match reason {
            LossReason::RepeatClick => "game over: card already clicked".to_string(),
            LossReason::TimedOut => "game over: time ran out".to_string(),
        },
        Event::TimeRemaining(Some(secs)) => format!("{secs}s left"),
        Event::TimeRemaining(None) => "timer off".to_string(),
        Event::OrderChanged(ids) => format!("shuffled {} cards", ids.len()),
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1) % len;
    } else if *value == 0 {
        *value = len - 1;
    } else {
        *value -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_data::{placeholder_cards, ProviderError};
    use std::collections::HashSet;

    struct Fixed;

    impl CardProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(
            &mut self,
            count: usize,
            _category: Option<Category>,
        ) -> Result<Vec<CardRecord>, ProviderError> {
            Ok(placeholder_cards(count))
        }
    }

    struct Unconfigured;

    impl CardProvider for Unconfigured {
        fn name(&self) -> &str {
            "unconfigured"
        }

        fn fetch(
            &mut self,
            _count: usize,
            _category: Option<Category>,
        ) -> Result<Vec<CardRecord>, ProviderError> {
            Err(ProviderError::NotConfigured("missing key".to_string()))
        }
    }

    fn app(stage: Stage) -> App {
        let mut app = App::with_parts(
            Box::new(Fixed),
            StageTable::builtin(),
            7,
            stage,
            None,
            0,
        );
        app.new_round();
        app
    }

    fn click_all_unique(app: &mut App) {
        let mut clicked = HashSet::new();
        while app.phase() == Phase::Active {
            let idx = app
                .cards()
                .iter()
                .position(|card| !clicked.contains(&card.id))
                .expect("an unclicked card");
            clicked.insert(app.cards()[idx].id.clone());
            app.click_card(idx);
        }
    }

    #[test]
    fn winning_raises_best_and_shows_banner() {
        let mut app = app(Stage::Easy);
        assert_eq!(app.cards().len(), 10);
        click_all_unique(&mut app);
        assert_eq!(app.outcome, Some(Outcome::Won));
        assert_eq!(app.score.current(), 10);
        assert_eq!(app.score.best(), 10);
        assert!(app.new_best);
    }

    #[test]
    fn repeat_click_shows_game_over_and_keeps_best() {
        let mut app = app(Stage::Easy);
        let first = app.cards()[0].id.clone();
        app.click_card(0);
        let again = app
            .cards()
            .iter()
            .position(|card| card.id == first)
            .expect("card still in round");
        assert_eq!(app.click_card(again), ClickOutcome::Lost);
        assert_eq!(app.outcome, Some(Outcome::Lost(LossReason::RepeatClick)));
        assert_eq!(app.score.current(), 1);
        assert_eq!(app.score.best(), 1);

        app.restart();
        assert_eq!(app.outcome, None);
        assert_eq!(app.score.current(), 0);
        assert_eq!(app.score.best(), 1);
        assert_eq!(app.phase(), Phase::Active);
    }

    #[test]
    fn tick_drives_countdown_to_timeout() {
        let mut app = app(Stage::Medium);
        assert_eq!(app.time_left, Some(7));
        app.on_tick(Duration::from_millis(3_500));
        assert_eq!(app.time_left, Some(4));
        app.on_tick(Duration::from_secs(4));
        assert_eq!(app.outcome, Some(Outcome::Lost(LossReason::TimedOut)));
        assert_eq!(app.time_left, None);
    }

    #[test]
    fn late_click_loses_to_the_countdown() {
        let mut app = app(Stage::Medium);
        app.on_tick(Duration::from_millis(6_900));
        assert_eq!(app.time_left, Some(1));
        app.apply_input(InputAction::Click, Duration::from_millis(150));
        assert_eq!(app.outcome, Some(Outcome::Lost(LossReason::TimedOut)));
        assert_eq!(app.phase(), Phase::Lost);
        assert_eq!(app.score.current(), 0);
    }

    #[test]
    fn click_rearms_from_the_moment_it_was_read() {
        let mut app = app(Stage::Medium);
        app.on_tick(Duration::from_millis(6_900));
        app.apply_input(InputAction::Click, Duration::from_millis(50));
        assert_eq!(app.phase(), Phase::Active);
        assert_eq!(app.score.current(), 1);
        assert_eq!(app.time_left, Some(7));
        app.on_tick(Duration::from_millis(999));
        assert_eq!(app.time_left, Some(7));
        app.on_tick(Duration::from_millis(1));
        assert_eq!(app.time_left, Some(6));
    }

    #[test]
    fn event_log_drops_oldest_lines_at_capacity() {
        let mut app = app(Stage::Easy);
        for idx in 0..MAX_EVENT_LOG + 5 {
            app.push_event_line(format!("line {idx}"));
        }
        assert_eq!(app.event_log.len(), MAX_EVENT_LOG);
        assert_eq!(app.event_log.front().map(String::as_str), Some("line 5"));
        assert_eq!(
            app.event_log.back().map(String::as_str),
            Some(format!("line {}", MAX_EVENT_LOG + 4).as_str())
        );
    }

    #[test]
    fn stage_change_resets_score_and_card_count() {
        let mut app = app(Stage::Easy);
        app.click_card(0);
        assert_eq!(app.score.current(), 1);
        app.set_stage(Stage::Hard);
        assert_eq!(app.score.current(), 0);
        assert_eq!(app.cards().len(), 30);
        assert_eq!(app.time_left, Some(5));
    }

    #[test]
    fn stopped_gate_blocks_clicks_and_time() {
        let mut app = app(Stage::Medium);
        app.toggle_gate();
        assert!(!app.running);
        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.click_card(0), ClickOutcome::Ignored);
        app.on_tick(Duration::from_secs(30));
        assert_eq!(app.outcome, None);

        app.toggle_gate();
        assert!(app.running);
        assert_eq!(app.phase(), Phase::Active);
        assert_eq!(app.time_left, Some(7));
    }

    #[test]
    fn missing_source_leaves_round_unstarted() {
        let mut app = App::with_parts(
            Box::new(Unconfigured),
            StageTable::builtin(),
            1,
            Stage::Easy,
            None,
            0,
        );
        app.new_round();
        assert_eq!(app.phase(), Phase::Idle);
        assert!(app.cards().is_empty());
        assert!(app.load_error.is_some());
        assert!(app.status_line.contains("unable to load images"));
    }

    #[test]
    fn cursor_wraps_around_grid() {
        let mut app = app(Stage::Easy);
        app.move_cursor(GridMove::Up);
        assert_eq!(app.cursor, 5);
        app.move_cursor(GridMove::Down);
        assert_eq!(app.cursor, 0);
        app.move_cursor(GridMove::Left);
        assert_eq!(app.cursor, 9);
        app.move_cursor(GridMove::Right);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn category_arg_accepts_random() {
        assert_eq!(parse_category_arg("random").expect("random"), None);
        assert_eq!(
            parse_category_arg("Space").expect("space"),
            Some(Category::Space)
        );
        assert!(parse_category_arg("lava").is_err());
    }
}
