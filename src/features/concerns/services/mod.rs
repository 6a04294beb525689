mod concern_store;
mod intake_service;
mod notification_service;
mod resolution_service;

pub use concern_store::{ConcernStore, PgConcernStore};
pub use intake_service::IntakeService;
pub use notification_service::NotificationService;
pub use resolution_service::ResolutionService;
