use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::Request, http::HeaderMap, middleware::Next, Router};
use chrono::Utc;

use crate::core::config::{ConcernsConfig, ResolverContact};
use crate::core::error::Result;
use crate::core::extractor::RequestMeta;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::AccessGate;
use crate::features::concerns::dtos::ResolveConcernDto;
use crate::features::concerns::models::{Concern, ConcernChanges, ConcernStatuses, NewConcern};
use crate::features::concerns::routes::{routes, ConcernsState};
use crate::features::concerns::services::{
    ConcernStore, IntakeService, NotificationService, ResolutionService,
};
use crate::modules::mail::{MailError, MailTransport, OutgoingMail};
use crate::shared::constants::{PERMISSION_CHANGE_CONCERNS, ROLE_SUPER_ADMIN};

// =============================================================================
// IDENTITIES
// =============================================================================

pub fn create_super_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "admin-account".to_string(),
        sub: "admin-sub".to_string(),
        roles: vec![ROLE_SUPER_ADMIN.to_string()],
        permissions: vec![],
    }
}

pub fn create_concern_manager() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "manager-account".to_string(),
        sub: "manager-sub".to_string(),
        roles: vec![],
        permissions: vec![PERMISSION_CHANGE_CONCERNS.to_string()],
    }
}

pub fn create_plain_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "plain-account".to_string(),
        sub: "plain-sub".to_string(),
        roles: vec![],
        permissions: vec![],
    }
}

/// Put `user` into every request, the way the identity middleware does for a
/// valid token
pub fn with_identity(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

pub fn anonymous_meta() -> RequestMeta {
    RequestMeta {
        user: None,
        headers: HeaderMap::new(),
        remote_addr: Some(SocketAddr::from(([192, 0, 2, 10], 40000))),
        is_secure: false,
        path: "/api/concerns/report".to_string(),
    }
}

// =============================================================================
// CONCERNS
// =============================================================================

pub fn test_concerns_config() -> ConcernsConfig {
    ConcernsConfig {
        site_name: "example.com".to_string(),
        statuses: ConcernStatuses::default(),
        resolvers: vec![ResolverContact {
            name: "John Doe".to_string(),
            address: "jdoe@example.com".to_string(),
        }],
        email_subject: "Concern Reported for {site}".to_string(),
    }
}

pub fn sample_new_concern() -> NewConcern {
    NewConcern {
        reporter: None,
        ip: Some("127.0.0.1".to_string()),
        headers: Some("Accept: */*".to_string()),
        document: Some("<html><body>Profile page</body></html>".to_string()),
        comment: Some("I have a concern".to_string()),
        status: ConcernStatuses::default().default_status(),
    }
}

pub fn sample_concern(id: i64) -> Concern {
    let now = Utc::now();
    Concern {
        id,
        reporter: None,
        ip: Some("127.0.0.1".to_string()),
        headers: Some("Accept: */*".to_string()),
        document: None,
        comment: Some("I have a concern".to_string()),
        status: "New".to_string(),
        resolved: false,
        resolution: None,
        resolver: None,
        created: now,
        modified: now,
    }
}

pub fn resolve_dto(status: &str, resolved: bool, resolution: Option<&str>) -> ResolveConcernDto {
    ResolveConcernDto {
        status: status.to_string(),
        resolved,
        resolution: resolution.map(str::to_string),
        comment: None,
        document: None,
    }
}

/// In-memory store with the same ordering and update rules as the
/// PostgreSQL one
#[derive(Default)]
pub struct MemoryConcernStore {
    concerns: Mutex<Vec<Concern>>,
}

impl MemoryConcernStore {
    pub fn insert(&self, new: NewConcern) -> Concern {
        let mut concerns = self.concerns.lock().unwrap();
        let now = Utc::now();
        let concern = Concern {
            id: concerns.len() as i64 + 1,
            reporter: new.reporter,
            ip: new.ip,
            headers: new.headers,
            document: new.document,
            comment: new.comment,
            status: new.status.as_str().to_string(),
            resolved: false,
            resolution: None,
            resolver: None,
            created: now,
            modified: now,
        };
        concerns.push(concern.clone());
        concern
    }

    pub fn snapshot(&self, id: i64) -> Option<Concern> {
        self.concerns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.concerns.lock().unwrap().len()
    }

    pub fn mark_resolved(&self, id: i64) {
        let mut concerns = self.concerns.lock().unwrap();
        if let Some(concern) = concerns.iter_mut().find(|c| c.id == id) {
            concern.resolved = true;
            concern.status = "Closed".to_string();
        }
    }
}

#[async_trait]
impl ConcernStore for MemoryConcernStore {
    async fn create(&self, concern: NewConcern) -> Result<Concern> {
        Ok(self.insert(concern))
    }

    async fn get(&self, id: i64) -> Result<Option<Concern>> {
        Ok(self.snapshot(id))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Concern>, i64)> {
        let mut concerns = self.concerns.lock().unwrap().clone();
        let total = concerns.len() as i64;
        concerns.sort_by_key(|c| (c.resolved, c.created, c.id));
        let page = concerns
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: i64, changes: ConcernChanges) -> Result<Option<Concern>> {
        let mut concerns = self.concerns.lock().unwrap();
        let Some(concern) = concerns.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        concern.status = changes.status.as_str().to_string();
        concern.resolved = changes.resolved;
        concern.resolution = changes.resolution;
        if let Some(comment) = changes.comment {
            concern.comment = Some(comment);
        }
        if let Some(document) = changes.document {
            concern.document = Some(document);
        }
        concern.resolver = Some(changes.resolver);
        concern.modified = Utc::now();

        Ok(Some(concern.clone()))
    }
}

// =============================================================================
// MAIL
// =============================================================================

/// Keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailTransport {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailTransport {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Behaves like an unreachable mail relay
pub struct FailingMailTransport;

#[async_trait]
impl MailTransport for FailingMailTransport {
    async fn send(&self, _mail: &OutgoingMail) -> std::result::Result<(), MailError> {
        Err(MailError::RequestFailed("connection refused".to_string()))
    }
}

// =============================================================================
// SERVICES & APP
// =============================================================================

fn notifier(transport: Arc<dyn MailTransport>) -> Arc<NotificationService> {
    Arc::new(
        NotificationService::new(
            transport,
            &test_concerns_config(),
            "webmaster@localhost".to_string(),
        )
        .unwrap(),
    )
}

pub fn intake_fixture() -> (
    IntakeService,
    Arc<MemoryConcernStore>,
    Arc<RecordingMailTransport>,
) {
    let store = Arc::new(MemoryConcernStore::default());
    let transport = Arc::new(RecordingMailTransport::default());
    let service = IntakeService::new(
        store.clone(),
        ConcernStatuses::default(),
        notifier(transport.clone()),
    );
    (service, store, transport)
}

pub fn intake_service_with_failing_mail(store: Arc<MemoryConcernStore>) -> IntakeService {
    IntakeService::new(
        store,
        ConcernStatuses::default(),
        notifier(Arc::new(FailingMailTransport)),
    )
}

pub fn resolution_fixture() -> (ResolutionService, Arc<MemoryConcernStore>) {
    let store = Arc::new(MemoryConcernStore::default());
    let service = ResolutionService::new(store.clone(), ConcernStatuses::default());
    (service, store)
}

/// Concern routes over in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryConcernStore>,
    pub transport: Arc<RecordingMailTransport>,
}

pub fn test_app(user: Option<AuthenticatedUser>) -> TestApp {
    let store = Arc::new(MemoryConcernStore::default());
    let transport = Arc::new(RecordingMailTransport::default());
    let statuses = ConcernStatuses::default();

    let state = ConcernsState {
        intake: Arc::new(IntakeService::new(
            store.clone(),
            statuses.clone(),
            notifier(transport.clone()),
        )),
        resolution: Arc::new(ResolutionService::new(store.clone(), statuses)),
        gate: Arc::new(AccessGate::new("/accounts/login/")),
    };

    let router = match user {
        Some(user) => with_identity(routes(state), user),
        None => routes(state),
    };

    TestApp {
        router,
        store,
        transport,
    }
}
