use crate::app::{App, GridMove};
use crate::input::InputAction;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::ToggleMenu => app.show_menu = !app.show_menu,
        InputAction::Close => {
            if app.show_help || app.show_menu {
                app.show_help = false;
                app.show_menu = false;
            }
        }
        InputAction::MoveUp => app.move_cursor(GridMove::Up),
        InputAction::MoveDown => app.move_cursor(GridMove::Down),
        InputAction::MoveLeft => app.move_cursor(GridMove::Left),
        InputAction::MoveRight => app.move_cursor(GridMove::Right),
        InputAction::Click => app.activate_primary(),
        InputAction::Restart => app.restart(),
        InputAction::SelectStage(stage) => app.set_stage(stage),
        InputAction::NextCategory => app.cycle_category(true),
        InputAction::PrevCategory => app.cycle_category(false),
        InputAction::RandomCategory => app.set_category(None),
        InputAction::ToggleTheme => app.toggle_theme(),
        InputAction::ToggleAutoReshuffle => app.toggle_auto_reshuffle(),
        InputAction::ToggleGate => app.toggle_gate(),
    }
}
