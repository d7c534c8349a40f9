//! Bar data model.
//!
//! - **constant**: frame, market, venue, provider and imbalance enums
//! - **object**: `Bar`, `BarBatch` and the stored `BarRecord` mapping
//! - **schema**: request validation with per-field error paths

pub mod constant;
pub mod object;
pub mod schema;

pub use constant::{FrameType, ImbalanceDir, MarketType, Provider, VenueId, KNOWN_PROVIDERS, KNOWN_VENUES};
pub use object::{Bar, BarBatch, BarRecord};
pub use schema::{BarSchema, FieldError};
