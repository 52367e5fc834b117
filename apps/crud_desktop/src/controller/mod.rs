//! Controller layer: UI events, rendering, modal forms, feedback, and command orchestration.

pub mod events;
pub mod forms;
pub mod notifications;
pub mod orchestration;
pub mod render;
