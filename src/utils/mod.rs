// Utilities

pub mod format;
pub mod logging;
