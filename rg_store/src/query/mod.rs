mod fetch;
mod filter;

pub use fetch::ComponentSet;
pub use fetch::Fetch;
pub use fetch::Query;
pub use filter::Filter;
