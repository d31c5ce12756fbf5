use crate::components::process_table::short_name;
use crate::metrics::ProcessInfo;
use egui::{Color32, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};
use std::f32::consts::{FRAC_PI_2, TAU};

const PALETTE: [Color32; 10] = [
    Color32::from_rgb(0xFF, 0x6B, 0x6B),
    Color32::from_rgb(0x4D, 0x96, 0xFF),
    Color32::from_rgb(0x6B, 0xCB, 0x77),
    Color32::from_rgb(0xFF, 0xA3, 0x6C),
    Color32::from_rgb(0xC4, 0x7A, 0xFF),
    Color32::from_rgb(0xFF, 0xD7, 0x00),
    Color32::from_rgb(0x8A, 0x2B, 0xE2),
    Color32::from_rgb(0xFF, 0x45, 0x00),
    Color32::from_rgb(0x20, 0xB2, 0xAA),
    Color32::from_rgb(0xDC, 0x14, 0x3C),
];

/// Smallest slice drawn in the pie, so idle processes stay visible.
const MIN_PIE_SHARE: f32 = 0.1;

pub fn color(idx: usize) -> Color32 {
    PALETTE[idx % PALETTE.len()]
}

fn cpu(process: &ProcessInfo) -> f32 {
    process.cpu_percent.unwrap_or(0.0)
}

pub fn cpu_bar_chart(ui: &mut egui::Ui, height: f32, processes: &[ProcessInfo]) {
    let bars: Vec<Bar> = processes
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, cpu(p) as f64)
                .name(format!("{} (PID:{})", short_name(&p.name, 10), p.pid))
                .fill(color(i))
                .width(0.6)
        })
        .collect();
    let y_max = processes
        .iter()
        .map(|p| cpu(p) as f64 + 10.0)
        .reduce(f64::max)
        .unwrap_or(100.0);

    Plot::new("cpu_bars")
        .height(height)
        .include_y(0.0)
        .include_y(y_max)
        .y_axis_label("CPU Usage (%)")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

pub fn cpu_pie_chart(ui: &mut egui::Ui, size: f32, processes: &[ProcessInfo]) {
    if processes.is_empty() {
        return;
    }

    let shares: Vec<f32> = processes.iter().map(|p| cpu(p).max(MIN_PIE_SHARE)).collect();
    let total: f32 = shares.iter().sum();

    ui.horizontal(|ui| {
        let (response, painter) = ui.allocate_painter(Vec2::splat(size), egui::Sense::hover());
        let center = response.rect.center();
        let radius = size * 0.45;

        let mut start = -FRAC_PI_2;
        for (i, share) in shares.iter().enumerate() {
            let sweep = share / total * TAU;
            // Thin triangles keep every piece convex.
            let steps = ((sweep / 0.1).ceil() as usize).max(1);
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                painter.add(egui::Shape::convex_polygon(
                    vec![
                        center,
                        center + radius * Vec2::angled(a0),
                        center + radius * Vec2::angled(a1),
                    ],
                    color(i),
                    egui::Stroke::NONE,
                ));
            }
            start += sweep;
        }
        painter.circle_filled(center, radius * 0.4, ui.visuals().panel_fill);

        ui.vertical(|ui| {
            for (i, (process, share)) in processes.iter().zip(&shares).enumerate() {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, color(i));
                    ui.label(format!("{} ({:.1}%)", short_name(&process.name, 10), share));
                });
            }
        });
    });
}

/// Line plot of one or more rolling histories sharing an x axis of
/// `max_points` samples.
pub fn history_plot(
    ui: &mut egui::Ui,
    id: impl std::hash::Hash,
    height: f32,
    lines: &[(&str, &[f64])],
    max_points: usize,
    y_max: Option<f64>,
) {
    let mut plot = Plot::new(id)
        .height(height)
        .show_axes(true)
        .set_margin_fraction(Vec2::ZERO)
        .include_x(0.0)
        .include_x(max_points as f64)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false);
    if let Some(y_max) = y_max {
        plot = plot.include_y(y_max);
    }
    if lines.len() > 1 {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for (i, (name, history)) in lines.iter().enumerate() {
            let points: PlotPoints = history
                .iter()
                .enumerate()
                .map(|(x, y)| [x as f64, *y])
                .collect();
            let mut line = Line::new(points).name(name).color(color(i + 1));
            if lines.len() == 1 {
                line = line.fill(0.0);
            }
            plot_ui.line(line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(color(0), color(PALETTE.len()));
        assert_ne!(color(0), color(1));
    }
}
