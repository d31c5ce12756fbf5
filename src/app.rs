use crate::components::charts::{cpu_bar_chart, cpu_pie_chart, history_plot};
use crate::components::controls::ControlInputs;
use crate::components::process_table::show_process_table;
use crate::components::settings::{show_settings_window, Settings};
use crate::config::SharedConfig;
use crate::control::ControlChannel;
use crate::metrics::{
    MetricSource, Sampler, SamplerHandle, Snapshot, SnapshotSlot, SysinfoSource, MAX_HISTORY,
};
use log::error;
use std::sync::Arc;

pub struct MonitorApp {
    settings: Settings,
    control: ControlChannel,
    inputs: ControlInputs,
    slot: SnapshotSlot,
    snapshot: Option<Snapshot>,
    // Dropping the handle stops and joins the sampler thread.
    _sampler: Option<SamplerHandle>,
}

impl MonitorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous settings (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let source: Arc<dyn MetricSource> = Arc::new(SysinfoSource::new());
        let config = SharedConfig::new(settings.configuration());
        let control = ControlChannel::new(config.clone(), source.clone());

        let ctx = cc.egui_ctx.clone();
        let slot = SnapshotSlot::with_waker(move || ctx.request_repaint());

        let sampler = Sampler::new(source, config);
        let sampler = match SamplerHandle::spawn(sampler, Arc::new(slot.clone())) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Could not start sampler thread: {e}");
                None
            }
        };

        Self {
            inputs: ControlInputs::new(control.process_limit()),
            settings,
            control,
            slot,
            snapshot: None,
            _sampler: sampler,
        }
    }

    fn show_snapshot(ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.columns(2, |columns| {
            show_process_table(&mut columns[0], &snapshot.top_processes);
            columns[1].heading("CPU Distribution");
            cpu_pie_chart(&mut columns[1], 160.0, &snapshot.top_processes);
        });

        ui.separator();

        ui.columns(2, |columns| {
            columns[0].heading("CPU Usage by Process");
            cpu_bar_chart(&mut columns[0], 180.0, &snapshot.top_processes);

            columns[1].heading("Memory Usage Trend");
            if let Some(current) = snapshot.memory_history.last() {
                columns[1].label(format!("Current: {current:.1}%"));
            }
            history_plot(
                &mut columns[1],
                "memory_plot",
                160.0,
                &[("Memory %", snapshot.memory_history.as_slice())],
                MAX_HISTORY,
                Some(100.0),
            );
        });

        ui.separator();

        ui.columns(2, |columns| {
            columns[0].heading("Disk I/O (MB/s)");
            history_plot(
                &mut columns[0],
                "disk_plot",
                140.0,
                &[
                    ("Read", snapshot.disk_read_history.as_slice()),
                    ("Write", snapshot.disk_write_history.as_slice()),
                ],
                MAX_HISTORY,
                None,
            );

            columns[1].heading("Network I/O (MB/s)");
            history_plot(
                &mut columns[1],
                "net_plot",
                140.0,
                &[
                    ("Sent", snapshot.net_sent_history.as_slice()),
                    ("Received", snapshot.net_recv_history.as_slice()),
                ],
                MAX_HISTORY,
                None,
            );
        });
    }
}

impl eframe::App for MonitorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.settings.apply(ctx);
        if let Some(snapshot) = self.slot.take() {
            self.snapshot = Some(snapshot);
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.add_space(16.0);
                egui::widgets::global_theme_preference_buttons(ui);

                ui.add_space(16.0);
                if ui.button("⚙").clicked() {
                    self.settings.show();
                }
            });

            if let Some(limit) = self.inputs.show(ui, &self.control) {
                self.settings.process_limit = limit;
            }
        });

        show_settings_window(ctx, &mut self.settings, &self.control);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Real-Time Task Manager");

            match &self.snapshot {
                Some(snapshot) => {
                    egui::ScrollArea::vertical().show(ui, |ui| Self::show_snapshot(ui, snapshot));
                }
                None => {
                    ui.spinner();
                }
            }
        });
    }
}
