//! Event model and verbosity-gated reporting (console, JSON lines, memory).

pub mod events;
pub mod reporter;
