pub mod autocomplete;
pub mod crop;
pub mod debounce;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod form;
pub mod preview;
pub mod sidecar;
pub mod source;
pub mod tags;

pub use debounce::{PreviewDebouncer, PreviewEvent};
pub use error::{Error, Result};
pub use fetch::{CoverBytes, CoverFetcher, HttpCoverFetcher};
pub use form::{Field, FormState};
pub use preview::{PreviewPhase, PreviewSlot, RawPreview};
pub use tags::{Cover, TagFields};
