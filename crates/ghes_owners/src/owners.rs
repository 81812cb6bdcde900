//! Owner lookup for a single organization.

use serde::Deserialize;

use crate::client::EnterpriseClient;
use crate::error::QueryError;
use crate::pagination::{Connection, PAGE_SIZE, paginate};
use crate::progress::ProgressCallback;

/// Slug of the default enterprise account on a GitHub Enterprise Server
/// instance.
pub const DEFAULT_ENTERPRISE_SLUG: &str = "github";

const OWNERS_QUERY: &str = r#"
query($slug: String!, $login: String!, $first: Int!, $cursor: String) {
  enterprise(slug: $slug) {
    members(organizationLogins: [$login], role: OWNER, first: $first, after: $cursor) {
      nodes {
        ... on User {
          login
          name
          email
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

/// An organization owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub login: String,
    pub name: String,
    pub email: String,
}

/// A node of the enterprise members connection.
///
/// Only `User` nodes carry fields; other account types come back as `{}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MemberNode {
    login: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

impl MemberNode {
    fn into_member(self) -> Option<Member> {
        Some(Member {
            login: self.login?,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwnersData {
    enterprise: Option<EnterpriseMembers>,
}

#[derive(Debug, Deserialize)]
struct EnterpriseMembers {
    members: Connection<MemberNode>,
}

impl EnterpriseClient {
    /// List the owners of one organization in API page order.
    ///
    /// Each call walks the members connection from an absent cursor, so
    /// nothing carries over from a previous organization. An organization
    /// without owners yields an empty list.
    pub async fn list_owners(
        &self,
        enterprise_slug: &str,
        organization: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Member>, QueryError> {
        let nodes = paginate(
            "members",
            organization,
            move |cursor| async move {
                let data: OwnersData = self
                    .graphql(
                        OWNERS_QUERY,
                        serde_json::json!({
                            "slug": enterprise_slug,
                            "login": organization,
                            "first": PAGE_SIZE,
                            "cursor": cursor,
                        }),
                    )
                    .await?;
                data.enterprise
                    .map(|enterprise| enterprise.members)
                    .ok_or_else(|| QueryError::EnterpriseNotFound {
                        slug: enterprise_slug.to_string(),
                    })
            },
            on_progress,
        )
        .await?;

        let total_nodes = nodes.len();
        let owners: Vec<Member> = nodes
            .into_iter()
            .filter_map(MemberNode::into_member)
            .collect();
        if owners.len() < total_nodes {
            tracing::debug!(
                organization,
                ignored = total_nodes - owners.len(),
                "Ignored member nodes that are not users"
            );
        }

        Ok(owners)
    }
}
