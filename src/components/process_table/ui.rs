use crate::metrics::ProcessInfo;

/// Display width of the name column.
const NAME_WIDTH: usize = 12;

/// First `max` characters of `name`.
pub fn short_name(name: &str, max: usize) -> String {
    name.chars().take(max).collect()
}

pub fn show_process_table(ui: &mut egui::Ui, processes: &[ProcessInfo]) {
    ui.heading("Top Processes");

    egui::Grid::new("process_table")
        .striped(true)
        .num_columns(4)
        .min_col_width(60.0)
        .show(ui, |ui| {
            for header in ["PID", "Name", "CPU%", "Mem%"] {
                ui.strong(header);
            }
            ui.end_row();

            for process in processes {
                ui.label(process.pid.to_string());
                ui.label(short_name(&process.name, NAME_WIDTH))
                    .on_hover_text(process.name.as_str());
                ui.label(format!("{:.1}", process.cpu_percent.unwrap_or(0.0)));
                ui.label(format!("{:.1}", process.mem_percent));
                ui.end_row();
            }
        });
}
