//! Terminal rendering and the event loop.

pub mod runtime;
pub mod text_input;
pub mod theme;
pub mod view;
