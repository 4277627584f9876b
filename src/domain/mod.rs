// Domain layer - models, options, policy rules, and error classes

pub mod errors;
pub mod model;
pub mod options;
pub mod rules;
