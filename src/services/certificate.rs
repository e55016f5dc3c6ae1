//! Boundary to the certificate renderer.
//!
//! Rendering itself lives outside this crate. Callers hand a
//! [`CertificateRenderer`] a request and get back an outcome; failures are
//! reported, never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{HistoryRecord, ManuscriptRecord};

/// What a certificate needs to say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    pub reviewer_name: String,
    pub manuscript_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manuscript_id: Option<String>,
}

impl CertificateRequest {
    /// Request thanking the reviewer of `event` for reviewing `manuscript`.
    pub fn for_review(manuscript: &ManuscriptRecord, event: &HistoryRecord) -> Self {
        Self {
            reviewer_name: event.reviewer_name.clone(),
            manuscript_title: manuscript.title.clone(),
            manuscript_id: Some(manuscript.manuscript_id.clone()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Certificate rendering failed: {0}")]
    Render(String),

    #[error("Certificate service unavailable: {0}")]
    Unavailable(String),
}

/// Renders a certificate document.
#[async_trait]
pub trait CertificateRenderer: Send + Sync {
    async fn render(&self, request: &CertificateRequest) -> Result<Vec<u8>, CertificateError>;
}

/// Result of one certificate request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertificateOutcome {
    pub success: bool,
    #[serde(skip)]
    pub document: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ask `renderer` for one certificate.
pub async fn issue_certificate<R>(renderer: &R, request: &CertificateRequest) -> CertificateOutcome
where
    R: CertificateRenderer + ?Sized,
{
    match renderer.render(request).await {
        Ok(document) => {
            info!(
                "Rendered certificate for {} ({} bytes)",
                request.reviewer_name,
                document.len()
            );
            CertificateOutcome {
                success: true,
                document: Some(document),
                error: None,
            }
        }
        Err(e) => {
            warn!("Certificate for {} failed: {}", request.reviewer_name, e);
            CertificateOutcome {
                success: false,
                document: None,
                error: Some(e.to_string()),
            }
        }
    }
}
