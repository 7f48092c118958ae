pub mod definitions;
pub mod keyvalues;
pub mod levels;
mod settings;

pub use definitions::{ApplyReport, Definitions, DefinitionsLoader};
pub use levels::{LevelsFile, load_flag_letters, parse_flag_letters};
pub use settings::CacheSettings;
