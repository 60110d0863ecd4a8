pub mod memory;
pub mod notion;
pub mod pager;
pub mod record;
pub mod transport;

pub use memory::MemoryTransport;
pub use notion::HttpTransport;
pub use pager::Pager;
pub use transport::{
    RetryPolicy, Transport, UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse,
};
