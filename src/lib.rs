//! Extracts MIDI control change curves and their annotations from
//! Standard MIDI Files, for driving animations and plotting.

pub mod easing;
pub mod error;
pub mod extractor;
pub mod formatter;
pub mod layout;
pub mod metadata;
pub mod timeline;

pub use error::{Error, Result};
pub use extractor::{extract_bytes, extract_file, Extraction, Extractor};
pub use metadata::{CcKey, Metadata};
pub use timeline::{CcPoint, Snapshot, Timeline};
