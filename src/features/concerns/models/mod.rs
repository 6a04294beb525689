mod concern;
mod status;

pub use concern::{Concern, ConcernChanges, NewConcern};
pub use status::{ConcernStatus, ConcernStatuses};
