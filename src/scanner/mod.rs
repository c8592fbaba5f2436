//! Directory cleaner: extension registry, classification, correlation, deletion.

pub mod classifier;
pub mod cleaner;
pub mod correlation;
pub mod deletion;
pub mod fs;
pub mod garbage;
pub mod registry;
