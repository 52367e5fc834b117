//! UI layer: the eframe app shell and the widget ids it draws with.

pub mod app;
pub mod element_ids;

pub use app::CrudDesktopApp;
