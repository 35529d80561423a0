//! Infrastructure configuration modules.

pub mod logging;
pub mod partner;
pub mod settings;

pub use settings::Config;
