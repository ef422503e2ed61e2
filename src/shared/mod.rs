pub mod errors;
pub mod locks;
pub mod shutdown;
pub mod time;

pub use errors::*;
pub use locks::ResourceLocks;
pub use shutdown::ShutdownSignal;
pub use time::parse_timestamp;
