use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use recall_core::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    ToggleMenu,
    Close,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Click,
    Restart,
    SelectStage(Stage),
    NextCategory,
    PrevCategory,
    RandomCategory,
    ToggleTheme,
    ToggleAutoReshuffle,
    ToggleGate,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Esc => InputAction::Close,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Left | KeyCode::Char('h') => InputAction::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => InputAction::MoveRight,
        KeyCode::Enter | KeyCode::Char(' ') => InputAction::Click,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char('m') => InputAction::ToggleMenu,
        KeyCode::Char('r') => InputAction::Restart,
        KeyCode::Char('1') => InputAction::SelectStage(Stage::Easy),
        KeyCode::Char('2') => InputAction::SelectStage(Stage::Medium),
        KeyCode::Char('3') => InputAction::SelectStage(Stage::Hard),
        KeyCode::Char('c') => InputAction::NextCategory,
        KeyCode::Char('C') => InputAction::PrevCategory,
        KeyCode::Char('0') => InputAction::RandomCategory,
        KeyCode::Char('t') => InputAction::ToggleTheme,
        KeyCode::Char('a') => InputAction::ToggleAutoReshuffle,
        KeyCode::Char('s') => InputAction::ToggleGate,
        _ => InputAction::None,
    }
}
