mod state;
mod ui;

pub use state::Settings;
pub use ui::show_settings_window;
