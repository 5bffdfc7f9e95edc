pub mod form_view;
pub mod help;
pub mod input;
pub mod log_view;
pub mod preview_view;
pub mod theme;
pub mod util;
