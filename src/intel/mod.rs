//! Intelligence extraction over message text

mod extractor;

pub use extractor::{ArtifactHit, IntelExtractor};
