pub mod error;
pub mod filter;
pub mod progress;
pub mod recommendation;
pub mod service;

pub use error::{CoreError, CoreResult};
pub use filter::{FacetValues, FilterCriteria, FilterSummary};
pub use progress::{summarize_partners, PartnerSummary, PARTNER_DISPLAY_LIMIT};
pub use recommendation::{
    attribution_list, classify, find_by_external_id, merge_recommendation, recommended_entry, RecommendationStatus,
};
pub use service::{RecommendOutcome, SearchHit, WatchlistService};
