use crate::config::{Configuration, DEFAULT_PROCESS_LIMIT, PROCESS_LIMIT_RANGE};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Update intervals offered by the settings window, in milliseconds.
pub const UPDATE_INTERVAL_MS_RANGE: RangeInclusive<u64> = 250..=5000;

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Settings {
    pub scale: f32,
    pub font_size: f32,
    pub update_interval_ms: u64,
    pub process_limit: usize,
    #[serde(skip)]
    show_window: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 1.2,
            font_size: 15.0,
            update_interval_ms: 1000,
            process_limit: DEFAULT_PROCESS_LIMIT,
            show_window: false,
        }
    }
}

impl Settings {
    pub fn show(&mut self) {
        self.show_window = true;
    }

    pub fn is_visible(&self) -> bool {
        self.show_window
    }

    pub fn hide(&mut self) {
        self.show_window = false;
    }

    /// Sampler configuration to start with. Values restored from an older
    /// or hand-edited state are clamped into range.
    pub fn configuration(&self) -> Configuration {
        Configuration {
            process_limit: self
                .process_limit
                .clamp(*PROCESS_LIMIT_RANGE.start(), *PROCESS_LIMIT_RANGE.end()),
            sampling_interval: Duration::from_millis(self.update_interval_ms.clamp(
                *UPDATE_INTERVAL_MS_RANGE.start(),
                *UPDATE_INTERVAL_MS_RANGE.end(),
            )),
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_pixels_per_point(self.scale);

        let mut style = (*ctx.style()).clone();
        style.text_styles = [
            (
                egui::TextStyle::Heading,
                egui::FontId::new(self.font_size + 4.0, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Body,
                egui::FontId::new(self.font_size, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Monospace,
                egui::FontId::new(self.font_size, egui::FontFamily::Monospace),
            ),
            (
                egui::TextStyle::Button,
                egui::FontId::new(self.font_size, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Small,
                egui::FontId::new(self.font_size - 2.0, egui::FontFamily::Proportional),
            ),
        ]
        .into();
        ctx.set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restored_values_are_clamped() {
        let settings = Settings {
            process_limit: 40,
            update_interval_ms: 0,
            ..Default::default()
        };
        let config = settings.configuration();
        assert_eq!(config.process_limit, 9);
        assert_eq!(config.sampling_interval, Duration::from_millis(250));

        let slow = Settings {
            update_interval_ms: 60_000,
            ..Default::default()
        };
        assert_eq!(slow.configuration().sampling_interval, Duration::from_millis(5000));
    }

    #[test]
    fn defaults_match_sampler_defaults() {
        assert_eq!(Settings::default().configuration(), Configuration::default());
    }
}
