//! ghes-owners - an organization owner report for GitHub Enterprise Server.
//!
//! This library checks that an instance is new enough to query, walks every
//! organization through the GraphQL API, looks up each organization's owners
//! and writes one CSV row per owner.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use ghes_owners::{CsvReportSink, EnterpriseClient, ReportOptions, run_report};
//!
//! let client = EnterpriseClient::new("ghe.example.com", &token, DEFAULT_TIMEOUT)?;
//! let summary = run_report(
//!     &client,
//!     &ReportOptions::default(),
//!     || CsvReportSink::create(Path::new("dist/ghes-owners.csv")),
//!     None,
//! )
//! .await?;
//! println!("{} rows", summary.rows);
//! ```

pub mod client;
pub mod collect;
pub mod error;
pub mod http;
pub mod organizations;
pub mod owners;
pub mod pagination;
pub mod progress;
pub mod report;
pub mod version;

pub use client::{DEFAULT_TIMEOUT, EnterpriseClient, normalize_host};
pub use collect::{
    RESERVED_ORGANIZATION, ReportOptions, RunSummary, collect_owners, is_reserved, run_report,
};
pub use error::{OutputError, QueryError, ReportError, VersionError, short_error_message};
pub use http::{HttpError, HttpTransport, ReqwestTransport};
pub use organizations::Organization;
pub use owners::{DEFAULT_ENTERPRISE_SLUG, Member};
pub use progress::{ProgressCallback, ReportProgress};
pub use report::{CsvReportSink, HEADER, ReportRow, ReportSink};
pub use version::{InstanceMetadata, MIN_SUPPORTED_VERSION};
