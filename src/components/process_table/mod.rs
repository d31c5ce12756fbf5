mod ui;

pub use ui::{short_name, show_process_table};
