//! Events API harvesting: a retrying JSON session, a lazy paginated event
//! stream, normalization of raw payloads into [`EventRecord`]s and the
//! harvest pipeline that produces dataset pairs.
//!
//! [`EventRecord`]: newsgen_core::EventRecord

pub mod error;
pub mod harvest;
pub mod normalize;
pub mod pipeline;
mod retry;
pub mod session;
pub mod types;

pub use error::HarvestError;
pub use harvest::{EventHarvester, EventQuery, DEFAULT_EVENTS_URL};
pub use normalize::{
    normalize_event, normalize_timestamp, pick_best_date_range, strip_html, NormalizeOptions,
};
pub use pipeline::{harvest_dataset, HarvestedDataset};
pub use session::{ApiResponse, ApiSession, SessionConfig};
pub use types::RawEvent;
