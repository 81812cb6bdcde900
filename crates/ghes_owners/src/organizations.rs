//! Organization enumeration.

use serde::Deserialize;

use crate::client::EnterpriseClient;
use crate::error::QueryError;
use crate::pagination::{Connection, PAGE_SIZE, paginate};
use crate::progress::{ProgressCallback, ReportProgress, emit};

const ORGANIZATIONS_QUERY: &str = r#"
query($first: Int!, $cursor: String) {
  organizations(first: $first, after: $cursor) {
    nodes {
      login
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}
"#;

/// An organization on the instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationsData {
    organizations: Connection<Organization>,
}

impl EnterpriseClient {
    /// List every organization on the instance in API page order.
    ///
    /// The whole list is materialized before returning; a failure on any page
    /// fails the call.
    pub async fn list_organizations(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Organization>, QueryError> {
        emit(on_progress, ReportProgress::FetchingOrganizations);

        let organizations = paginate(
            "organizations",
            "organizations",
            move |cursor| async move {
                let data: OrganizationsData = self
                    .graphql(
                        ORGANIZATIONS_QUERY,
                        serde_json::json!({ "first": PAGE_SIZE, "cursor": cursor }),
                    )
                    .await?;
                Ok(data.organizations)
            },
            on_progress,
        )
        .await?;

        tracing::info!(total = organizations.len(), "Listed organizations");
        emit(
            on_progress,
            ReportProgress::OrganizationsListed {
                total: organizations.len(),
            },
        );

        Ok(organizations)
    }
}
