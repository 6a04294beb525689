//! Privacy concern reporting and review.
//!
//! Visitors report a concern about the page they are viewing; resolvers are
//! mailed about it and staff with the `concerns:change` permission triage it
//! through a configurable status workflow.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/concerns/report` | Optional | Report a concern |
//! | GET | `/api/concerns` | `concerns:change` | List concerns, unresolved first |
//! | GET | `/api/concerns/{id}` | `concerns:change` | Concern detail |
//! | POST/PUT | `/api/concerns/{id}` | `concerns:change` | Update status and resolution |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::ConcernsState;
pub use services::{
    ConcernStore, IntakeService, NotificationService, PgConcernStore, ResolutionService,
};
