//! Search orchestration: query localization, the task plan, provider fan-out and aggregation.

pub(crate) mod aggregate;
pub(crate) mod backend;
pub(crate) mod localize;
pub(crate) mod plan;
mod result;
mod time;

pub use aggregate::HarvestSource;
pub use backend::{Providers, SearchBackend, dispatch};
pub use localize::{LOCALES, LocalizedQueries, translate};
pub use plan::build_plan;
pub use result::{Category, SearchResult};
pub use time::TimeFilter;
