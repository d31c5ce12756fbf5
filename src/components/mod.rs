pub mod charts;
pub mod controls;
pub mod process_table;
pub mod settings;
