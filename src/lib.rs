//! Core library for the block-browser web viewer backend.
//! Exposes replica-liveness selection and resilient block-range streaming;
//! HTML rendering, auth, and pagination live in the calling layer.

pub mod block;
pub mod nodes;
pub mod params;
pub mod select;
pub mod stream;
pub mod timeouts;
pub mod util;
pub mod wire;

pub use block::{AccessToken, BlockDescriptor, ReadRange, ReplicaEndpoint};
pub use nodes::{sort_node_list, SortField, SortOrder, StorageNodeInfo};
pub use select::{LivenessProbe, ReplicaSelector, SelectError, TcpProbe};
pub use stream::{
    BlockLine, RangeSession, RangeStreamer, SessionTransport, StreamError, TcpTransport,
};
pub use util::error::BlockViewError;
