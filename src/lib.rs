use pretty_env_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn _setup_pretty_env_logger_default() {
    INIT.call_once(|| {
        pretty_env_logger::init();
    });
}

pub use catalog::{VariableCatalog, LAND_BINARY_MASK, ROMS_VARIABLE_MAPPING};
pub use query::{DomainNormalizer, Query, QueryNormalizer};
pub use reader::{Extraction, ExtractionError, RomsReader, RomsReaderBuilder};
pub mod catalog;
pub mod grid;
pub mod query;
pub mod reader;
pub mod source;
pub mod time;
pub mod transforms;
