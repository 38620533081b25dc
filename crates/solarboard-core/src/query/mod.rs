// Query layer: keys, cache entries, the cache itself and mutation descriptors.

mod cache;
mod entry;
pub mod key;
mod mutation;

pub use cache::QueryCache;
pub use entry::FetchStatus;
pub(crate) use entry::{AnyValue, EntryState};
pub use key::{AuthKeys, DashboardKeys, Filters, KeySegment, QueryKey, ResourceKeys, keys};
pub use mutation::MutationDescriptor;
