/// Outcome of the last command, shown under the inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// Text typed into the process-limit and terminate boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlInputs {
    pub limit_text: String,
    pub pid_text: String,
    pub status: Option<StatusMessage>,
}

impl ControlInputs {
    pub fn new(process_limit: usize) -> Self {
        Self {
            limit_text: process_limit.to_string(),
            pid_text: String::new(),
            status: None,
        }
    }
}
