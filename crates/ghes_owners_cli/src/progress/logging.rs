use ghes_owners::ReportProgress;

use super::organization_url;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter {
    host: String,
}

impl LoggingReporter {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
        }
    }

    pub fn handle(&self, event: ReportProgress) {
        match event {
            ReportProgress::CheckingVersion { host, minimum } => {
                tracing::info!(host = %host, minimum = %minimum, "Checking instance version");
            }

            ReportProgress::VersionAccepted { installed, minimum } => {
                tracing::info!(installed = %installed, minimum = %minimum, "Instance version supported");
            }

            ReportProgress::FetchingOrganizations => {
                tracing::info!("Fetching organizations");
            }

            ReportProgress::FetchedPage {
                scope,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(scope = %scope, page, count, total_so_far, "Fetched page");
            }

            ReportProgress::OrganizationsListed { total } => {
                tracing::info!(total, "Fetched organizations");
            }

            ReportProgress::ResolvingOwners {
                organization,
                position,
                total,
            } => {
                tracing::debug!(organization = %organization, position, total, "Looking up owners");
            }

            ReportProgress::SkippedOrganization { organization } => {
                tracing::info!(organization = %organization, "Skipping reserved organization");
            }

            ReportProgress::OwnersResolved {
                organization,
                owners,
                rows,
            } => {
                tracing::info!(
                    url = %organization_url(&self.host, &organization),
                    owners,
                    rows,
                    "Looked up owners"
                );
            }

            ReportProgress::ReportComplete {
                organizations,
                skipped,
                rows,
            } => {
                tracing::info!(organizations, skipped, rows, "Report complete");
            }

            _ => {}
        }
    }
}
