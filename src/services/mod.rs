//! Domain services built on top of the repository.

pub mod certificate;
pub mod date_detection;
pub mod report;

pub use certificate::{
    issue_certificate, CertificateError, CertificateOutcome, CertificateRenderer,
    CertificateRequest,
};
pub use date_detection::{normalize_date, DateEstimate, DateStrategy, NormalizedDate};
pub use report::report_text;
