pub mod search;
pub use search::{SearchError, SearchRequest, SearchResult, SearchService};

pub mod batch;
pub use batch::{BatchEntry, BatchResult, BatchSearchRequest, BatchSearchService};
