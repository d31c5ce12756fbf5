mod ui;

pub use ui::{color, cpu_bar_chart, cpu_pie_chart, history_plot};
