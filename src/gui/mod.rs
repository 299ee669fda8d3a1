pub mod log_panel;
pub mod plot_view;
pub mod toolbar;
