pub mod aggregator;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod traits;

pub use aggregator::{ConfigAggregator, FailurePolicy, MAX_REQUEST_TIMEOUT};
pub use error::{PanelError, Result};
pub use memory::{MemoryStore, StaticKeyIssuer};
pub use resolver::{HostnameResolver, RoomAndGroup, MIN_HOSTNAME_LEN};
pub use traits::{KeyIssuer, MappingSource, RoomConfigSource};
