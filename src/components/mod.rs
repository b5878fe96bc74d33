pub mod app;
pub mod controls_panel;
pub mod legend;
pub mod time_display;
