pub mod crosswalk;
pub mod error;
pub mod ids;
pub mod rate;

pub use crosswalk::{CrosswalkEntry, WorkSectionMapping};
pub use error::{ModelError, Result};
pub use ids::{GroupCode, UNCLASSIFIED_SECTION, is_range_hint, section_of};
pub use rate::{Classification, CostTotals, MatchConfidence, Rate};
