//! Report orchestration.
//!
//! A run checks the instance version, lists every organization, then looks
//! up owners one organization at a time. Each organization's rows are
//! written and flushed before the next lookup starts, so the report on disk
//! always ends on an organization boundary.

use std::time::{Duration, Instant};

use semver::Version;

use crate::client::EnterpriseClient;
use crate::error::{OutputError, ReportError};
use crate::owners::DEFAULT_ENTERPRISE_SLUG;
use crate::progress::{ProgressCallback, ReportProgress, emit};
use crate::report::{ReportSink, rows_for};
use crate::version::MIN_SUPPORTED_VERSION;

/// Organization every instance creates for itself. It is never reported.
pub const RESERVED_ORGANIZATION: &str = "github-enterprise";

/// Options for a report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Oldest instance version the run accepts.
    pub minimum_version: Version,
    /// Enterprise account whose members are queried.
    pub enterprise_slug: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            minimum_version: MIN_SUPPORTED_VERSION,
            enterprise_slug: DEFAULT_ENTERPRISE_SLUG.to_string(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Organizations whose owners were looked up.
    pub organizations: usize,
    /// Organizations skipped without a lookup.
    pub skipped: usize,
    /// Data rows written, header excluded.
    pub rows: usize,
    pub elapsed: Duration,
}

/// Whether an organization is excluded from the report.
pub fn is_reserved(login: &str) -> bool {
    login == RESERVED_ORGANIZATION
}

/// Run the full report: version gate, then collection.
///
/// `open_sink` is only called once the version gate passes, so a rejected
/// instance leaves any existing report untouched.
pub async fn run_report<S, F>(
    client: &EnterpriseClient,
    options: &ReportOptions,
    open_sink: F,
    on_progress: Option<&ProgressCallback>,
) -> Result<RunSummary, ReportError>
where
    S: ReportSink,
    F: FnOnce() -> Result<S, OutputError>,
{
    let started = Instant::now();

    client
        .check_minimum_version(&options.minimum_version, on_progress)
        .await?;

    let mut sink = open_sink()?;
    let mut summary =
        collect_owners(client, &options.enterprise_slug, &mut sink, on_progress).await?;
    summary.elapsed = started.elapsed();

    Ok(summary)
}

/// List organizations and write one block of rows per organization.
///
/// The header is written and flushed before anything is queried, so the sink
/// holds a valid report prefix whichever step fails.
///
/// Organizations are processed strictly in the order listed. The lookup for
/// the next organization starts only after the previous organization's rows
/// have been flushed. The first error stops the run; rows flushed before it
/// stay in the sink.
pub async fn collect_owners<S: ReportSink + ?Sized>(
    client: &EnterpriseClient,
    enterprise_slug: &str,
    sink: &mut S,
    on_progress: Option<&ProgressCallback>,
) -> Result<RunSummary, ReportError> {
    let started = Instant::now();
    let mut summary = RunSummary::default();

    sink.write_header()?;
    sink.flush()?;

    let organizations = client.list_organizations(on_progress).await?;

    let total = organizations.len();
    for (index, organization) in organizations.iter().enumerate() {
        let login = organization.login.as_str();

        if is_reserved(login) {
            tracing::debug!(organization = login, "Skipping reserved organization");
            summary.skipped += 1;
            emit(
                on_progress,
                ReportProgress::SkippedOrganization {
                    organization: login.to_string(),
                },
            );
            continue;
        }

        emit(
            on_progress,
            ReportProgress::ResolvingOwners {
                organization: login.to_string(),
                position: index + 1,
                total,
            },
        );

        let owners = client
            .list_owners(enterprise_slug, login, on_progress)
            .await?;
        let owner_count = owners.len();

        let rows = rows_for(login, owners);
        for row in &rows {
            sink.write_row(row)?;
        }
        sink.flush()?;

        summary.organizations += 1;
        summary.rows += rows.len();

        tracing::info!(
            organization = login,
            owners = owner_count,
            rows = rows.len(),
            "Resolved owners"
        );
        emit(
            on_progress,
            ReportProgress::OwnersResolved {
                organization: login.to_string(),
                owners: owner_count,
                rows: rows.len(),
            },
        );
    }

    summary.elapsed = started.elapsed();
    emit(
        on_progress,
        ReportProgress::ReportComplete {
            organizations: summary.organizations,
            skipped: summary.skipped,
            rows: summary.rows,
        },
    );

    Ok(summary)
}
