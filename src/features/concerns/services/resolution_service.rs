//! Resolution Service - review list, detail and status updates
//!
//! Callers are expected to have passed the access gate already.

use std::borrow::Cow;
use std::sync::Arc;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::concerns::dtos::ResolveConcernDto;
use crate::features::concerns::models::{Concern, ConcernChanges, ConcernStatuses};
use crate::features::concerns::services::ConcernStore;
use crate::shared::types::PaginationQuery;

/// Service for reviewing and resolving concerns
pub struct ResolutionService {
    store: Arc<dyn ConcernStore>,
    statuses: ConcernStatuses,
}

impl ResolutionService {
    pub fn new(store: Arc<dyn ConcernStore>, statuses: ConcernStatuses) -> Self {
        Self { store, statuses }
    }

    /// One page of concerns in review order, plus the total count
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<Concern>, i64)> {
        self.store
            .list(pagination.limit(), pagination.offset())
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Concern> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Concern #{} not found", id)))
    }

    /// Apply a resolution update made by `resolver`.
    ///
    /// Nothing is written when the payload is invalid. The resolver on the
    /// stored concern is always the acting user.
    pub async fn resolve(
        &self,
        id: i64,
        resolver: &AuthenticatedUser,
        dto: ResolveConcernDto,
    ) -> Result<Concern> {
        self.get(id).await?;

        let changes = self.validate(dto, resolver)?;
        let status = changes.status.clone();

        let concern = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Concern #{} not found", id)))?;

        tracing::info!(
            "Concern {} updated: status={}, resolved={}, resolver={}",
            concern.id,
            status,
            concern.resolved,
            resolver.account_id
        );

        Ok(concern)
    }

    fn validate(
        &self,
        dto: ResolveConcernDto,
        resolver: &AuthenticatedUser,
    ) -> Result<ConcernChanges> {
        let mut errors = match dto.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let status = match self.statuses.parse(&dto.status) {
            Ok(status) => Some(status),
            Err(e) => {
                // length problems are already reported for this field
                if !errors.field_errors().contains_key("status") {
                    let mut error = ValidationError::new("choice");
                    error.message = Some(Cow::from(format!("Select a valid choice. {}", e)));
                    errors.add("status", error);
                }
                None
            }
        };

        match status {
            Some(status) if errors.is_empty() => Ok(ConcernChanges {
                status,
                resolved: dto.resolved,
                resolution: dto.resolution,
                comment: dto.comment,
                document: dto.document,
                resolver: resolver.account_id.clone(),
            }),
            _ => Err(AppError::FieldValidation(errors)),
        }
    }
}
