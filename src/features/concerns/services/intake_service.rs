//! Intake Service - turns a submission into a stored concern
//!
//! Reporters may be anonymous. Whatever the request carries about identity,
//! origin and headers is captured on a best-effort basis; nothing about it can
//! make the submission fail.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::RequestMeta;
use crate::features::concerns::dtos::ReportConcernDto;
use crate::features::concerns::models::{Concern, ConcernStatuses, NewConcern};
use crate::features::concerns::services::{ConcernStore, NotificationService};
use crate::shared::validation::IPV4_PREFIX_REGEX;

/// Service for accepting concern reports
pub struct IntakeService {
    store: Arc<dyn ConcernStore>,
    statuses: ConcernStatuses,
    notifier: Arc<NotificationService>,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn ConcernStore>,
        statuses: ConcernStatuses,
        notifier: Arc<NotificationService>,
    ) -> Self {
        Self {
            store,
            statuses,
            notifier,
        }
    }

    /// Store a new concern and notify the resolvers.
    ///
    /// The concern starts in the default status, unresolved and without a
    /// resolver. The notification outcome does not affect the result.
    pub async fn submit(&self, meta: &RequestMeta, dto: ReportConcernDto) -> Result<Concern> {
        dto.validate()?;

        let new_concern = NewConcern {
            reporter: meta.user.as_ref().map(|u| u.account_id.clone()),
            ip: client_ip(meta.forwarded_for().as_deref(), meta.remote_addr),
            headers: Some(capture_headers(&meta.headers)),
            document: dto.document,
            comment: dto.comment,
            status: self.statuses.default_status(),
        };

        let concern = self.store.create(new_concern).await?;

        tracing::info!(
            "Concern reported: id={}, reporter={}, ip={}",
            concern.id,
            concern.reporter.as_deref().unwrap_or("anonymous"),
            concern.ip.as_deref().unwrap_or("-")
        );

        self.notifier.notify(meta, &concern, None).await;

        Ok(concern)
    }
}

/// Origin address of a request: the forwarded-for header when present,
/// otherwise the peer address. Only a dotted-quad at the very start is kept;
/// anything else yields `None`. A present but blank header still wins over the
/// peer address.
pub fn client_ip(forwarded_for: Option<&str>, remote_addr: Option<SocketAddr>) -> Option<String> {
    let candidate = match forwarded_for {
        Some(value) => value.to_string(),
        None => remote_addr?.ip().to_string(),
    };

    IPV4_PREFIX_REGEX
        .find(&candidate)
        .map(|m| m.as_str().to_string())
}

/// Serialize request headers as sorted `Name: value` lines, leaving out the
/// cookie header. Repeated headers are joined with a comma.
pub fn capture_headers(headers: &HeaderMap) -> String {
    let mut captured: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        if *name == header::COOKIE {
            continue;
        }
        captured
            .entry(title_case(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    captured
        .into_iter()
        .map(|(name, values)| format!("{}: {}", name, values.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `x-forwarded-for` -> `X-Forwarded-For`: a letter is upper-cased when it
/// follows a non-letter and lower-cased otherwise
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut after_letter = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}
