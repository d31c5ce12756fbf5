mod state;
mod ui;

pub use state::{ControlInputs, StatusMessage};
