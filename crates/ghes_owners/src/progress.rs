//! Progress events emitted while a report is collected.
//!
//! The library never prints. Callers that want feedback pass a
//! [`ProgressCallback`] and render the events however they like.

/// Progress events emitted during an owner report run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ReportProgress {
    /// About to query instance metadata.
    CheckingVersion {
        /// Instance host name.
        host: String,
        /// Minimum version the run requires.
        minimum: String,
    },

    /// The instance version satisfied the minimum.
    VersionAccepted {
        /// Version reported by the instance.
        installed: String,
        /// Minimum version the run requires.
        minimum: String,
    },

    /// Starting to page through organizations.
    FetchingOrganizations,

    /// Fetched one page of a cursor-paginated connection.
    FetchedPage {
        /// What is being paged: `organizations`, or the organization whose
        /// owners are being listed.
        scope: String,
        /// Page number (1-indexed).
        page: u32,
        /// Number of nodes on this page.
        count: usize,
        /// Running total of nodes fetched so far.
        total_so_far: usize,
    },

    /// The organization list is complete.
    OrganizationsListed {
        /// Number of organizations on the instance, reserved one included.
        total: usize,
    },

    /// Starting owner lookup for one organization.
    ResolvingOwners {
        organization: String,
        /// Position of this organization in the list (1-indexed).
        position: usize,
        /// Number of organizations in the list.
        total: usize,
    },

    /// An organization was skipped without a lookup.
    SkippedOrganization { organization: String },

    /// Rows for one organization were written and flushed.
    OwnersResolved {
        organization: String,
        /// Number of owners found.
        owners: usize,
        /// Number of rows written, `max(1, owners)`.
        rows: usize,
    },

    /// The report is complete.
    ReportComplete {
        /// Organizations processed, not counting skipped ones.
        organizations: usize,
        /// Organizations skipped.
        skipped: usize,
        /// Data rows written.
        rows: usize,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(ReportProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: ReportProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
