use super::state::{ControlInputs, StatusMessage};
use crate::control::ControlChannel;

fn submitted(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
}

impl ControlInputs {
    /// Draws both inputs. Returns the new process limit when one was
    /// accepted this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, control: &ControlChannel) -> Option<usize> {
        let mut accepted = None;

        ui.horizontal(|ui| {
            ui.label("Processes:");
            let response =
                ui.add(egui::TextEdit::singleline(&mut self.limit_text).desired_width(32.0));
            if submitted(ui, &response) {
                accepted = self.apply_limit(control);
            }

            ui.add_space(24.0);

            ui.label("Terminate PID:");
            let response =
                ui.add(egui::TextEdit::singleline(&mut self.pid_text).desired_width(72.0));
            if submitted(ui, &response) || ui.button("Terminate").clicked() {
                self.apply_terminate(control);
            }
        });

        match &self.status {
            Some(StatusMessage::Info(msg)) => {
                ui.label(msg.as_str());
            }
            Some(StatusMessage::Error(msg)) => {
                ui.colored_label(ui.visuals().error_fg_color, msg.as_str());
            }
            None => {}
        }

        accepted
    }

    fn apply_limit(&mut self, control: &ControlChannel) -> Option<usize> {
        let result = control.set_process_limit(&self.limit_text);
        // Always show what the sampler is actually using.
        let limit = control.process_limit();
        self.limit_text = limit.to_string();
        match result {
            Ok(()) => {
                self.status = Some(StatusMessage::Info(format!("Showing top {limit} processes")));
                Some(limit)
            }
            Err(e) => {
                self.status = Some(StatusMessage::Error(e.to_string()));
                None
            }
        }
    }

    fn apply_terminate(&mut self, control: &ControlChannel) {
        self.status = Some(match control.terminate_pid(&self.pid_text) {
            Ok(()) => {
                let msg = format!("Termination requested for PID {}", self.pid_text.trim());
                self.pid_text.clear();
                StatusMessage::Info(msg)
            }
            Err(e) => StatusMessage::Error(e.to_string()),
        });
    }
}
