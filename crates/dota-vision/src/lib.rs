pub mod color;
pub mod config;
pub mod draft;
pub mod error;
pub mod geometry;
pub mod isolate;
pub mod name_matcher;
pub mod slot;
pub mod text_reader;

pub use color::{DominantColor, MaskSelector, MeanColor, SaturatedMode};
pub use config::EngineConfig;
pub use draft::{identify, DraftReader};
pub use error::{ConfigError, GeometryError};
pub use geometry::Rect;
pub use isolate::Isolation;
pub use name_matcher::{NameMatch, NameMatcher};
pub use slot::{PreValidator, Recognizer, SlotReading};
pub use text_reader::TesseractReader;
