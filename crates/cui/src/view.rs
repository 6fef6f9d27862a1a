use crate::app::{App, Outcome, GRID_COLUMNS};
use crate::persistence::Theme;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use recall_core::{LossReason, Phase, Stage};
use recall_data::Category;

#[derive(Debug, Clone, Copy)]
struct Palette {
    base: Style,
    accent: Color,
    muted: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                base: Style::default().fg(Color::Black).bg(Color::White),
                accent: Color::Blue,
                muted: Color::DarkGray,
            },
            Theme::Dark => Self {
                base: Style::default().fg(Color::White).bg(Color::Black),
                accent: Color::Yellow,
                muted: Color::Gray,
            },
        }
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    frame.render_widget(Block::default().style(palette.base), frame.area());

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app, palette);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(root[1]);

    draw_grid(frame, middle[0], app, palette);
    draw_side(frame, middle[1], app, palette);
    draw_events(frame, root[2], app, palette);

    if let Some(outcome) = app.outcome {
        draw_outcome_popup(frame, app, outcome, palette);
    }
    if app.show_menu {
        draw_menu_popup(frame, app, palette);
    }
    if app.show_help {
        draw_help_popup(frame, palette);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let title = format!(
        "Recall | {} | {} | source {}",
        app.stage.label(),
        app.category_label(),
        app.provider_name()
    );
    let lines = vec![
        Line::from(title.bold()),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(pane_block("Overview", false, palette));
    frame.render_widget(paragraph, area);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let block = pane_block("Cards", true, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cards = app.cards();
    if cards.is_empty() {
        let message = if app.load_error.is_some() {
            "Unable to load images. Press r to try again."
        } else {
            "No round in progress. Press r to start."
        };
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let rows = cards.len().div_ceil(GRID_COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(inner);
    let active = app.phase() == Phase::Active && app.running;
    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, GRID_COLUMNS as u32);
                GRID_COLUMNS
            ])
            .split(*row_area);
        for (col, cell) in cells.iter().enumerate() {
            let idx = row * GRID_COLUMNS + col;
            let Some(card) = cards.get(idx) else {
                continue;
            };
            let selected = idx == app.cursor;
            let mut style = Style::default();
            if !active {
                style = style.fg(palette.muted);
            }
            let mut block = Block::default().borders(Borders::ALL).style(style);
            if selected {
                block = block.border_style(
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                );
            }
            let lines = vec![
                Line::from(format!("#{}", idx + 1)).fg(palette.muted),
                Line::from(card.label.clone()),
            ];
            frame.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block),
                *cell,
            );
        }
    }
}

fn draw_side(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let timer = match app.time_left {
        Some(secs) => format!("{secs}s"),
        None => "-".to_string(),
    };
    let reshuffle = app
        .engine
        .config()
        .and_then(|config| config.auto_reshuffle_secs)
        .map(|secs| {
            if app.engine.auto_reshuffle_enabled() {
                format!("every {secs}s")
            } else {
                "off".to_string()
            }
        })
        .unwrap_or_else(|| "n/a".to_string());
    let timer_style = match app.time_left {
        Some(secs) if secs <= 2 => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };
    let lines = vec![
        Line::from(format!("Score: {}", app.score.current())).bold(),
        Line::from(format!("Best:  {}", app.score.best())),
        Line::from(vec!["Timer: ".into(), Span::styled(timer, timer_style)]),
        Line::from(format!(
            "Found: {}/{}",
            app.engine.revealed().len(),
            app.cards().len()
        )),
        Line::from(""),
        Line::from(format!("Phase: {}", phase_label(app.phase()))),
        Line::from(format!("Gate: {}", if app.running { "running" } else { "stopped" })),
        Line::from(format!("Reshuffle: {reshuffle}")),
        Line::from(format!("Theme: {}", app.theme.label())),
        Line::from(format!("Seed: {}", app.seed)),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(pane_block("Score", false, palette)),
        area,
    );
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .event_log
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|line| ListItem::new(line.as_str()))
        .collect();
    frame.render_widget(List::new(items).block(pane_block("Events", false, palette)), area);
}

fn draw_outcome_popup(frame: &mut Frame, app: &App, outcome: Outcome, palette: Palette) {
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);
    let (title, color, headline) = match outcome {
        Outcome::Won => ("Victory", Color::Green, "You found every card!".to_string()),
        Outcome::Lost(reason) => (
            "Game Over",
            Color::Red,
            match reason {
                LossReason::RepeatClick => "That card was already clicked.".to_string(),
                LossReason::TimedOut => "Time ran out.".to_string(),
            },
        ),
    };
    let mut lines = vec![
        Line::from(headline.bold()),
        Line::from(""),
        Line::from(format!("Score: {}", app.score.current())),
        Line::from(format!("Best:  {}", app.score.best())),
    ];
    if app.new_best {
        lines.push(Line::from("New best score!").fg(palette.accent));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Enter or r to play again").fg(palette.muted));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(palette.base);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_menu_popup(frame: &mut Frame, app: &App, palette: Palette) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);
    let mut lines = vec![Line::from("Stage".bold())];
    for stage in Stage::ALL {
        lines.push(option_line(
            format!("{} {}", stage.number(), stage.label()),
            stage == app.stage,
            palette,
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Category (c / C, 0 random)".bold()));
    lines.push(option_line(
        "Random".to_string(),
        app.category.is_none(),
        palette,
    ));
    for category in Category::ALL {
        lines.push(option_line(
            category.label().to_string(),
            app.category == Some(category),
            palette,
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "t theme ({}) | a auto reshuffle | m close",
        app.theme.label()
    )));
    let block = Block::default()
        .title("Menu")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(palette.base);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_help_popup(frame: &mut Frame, palette: Palette) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("Click every card exactly once. Cards reshuffle after each click."),
        Line::from(""),
        Line::from("arrows/hjkl move | enter/space click"),
        Line::from("1 easy | 2 medium | 3 hard"),
        Line::from("c next category | C previous | 0 random"),
        Line::from("t theme | a auto reshuffle | s start/stop"),
        Line::from("r restart | m menu | ? help | q quit"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(palette.base);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn option_line(label: String, selected: bool, palette: Palette) -> Line<'static> {
    if selected {
        Line::from(format!("> {label}")).fg(palette.accent).bold()
    } else {
        Line::from(format!("  {label}"))
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Active => "playing",
        Phase::Won => "won",
        Phase::Lost => "lost",
    }
}

fn pane_block(title: &str, focused: bool, palette: Palette) -> Block<'_> {
    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(palette.base);
    if focused {
        block = block.border_style(Style::default().fg(palette.accent));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
