pub mod destinations;
pub mod filter;
pub mod resolver;

pub use destinations::{DestinationFeed, FeedState};
pub use filter::apply_filters;
pub use resolver::{SearchResolver, SearchState};
