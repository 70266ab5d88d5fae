//! Show records as stored, the create/edit form, and list filtering.

pub mod form;
pub mod listing;
pub mod record;

pub use form::{PlaceSelection, ShowForm};
pub use listing::{ArtistTab, MoneyTotals, ShowFilter, ShowListing};
pub use record::{loose_enum, parse_show_date, Act, MoneyFields, ShowPayload, ShowRecord, ShowType};
