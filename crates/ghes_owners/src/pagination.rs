//! Cursor pagination over GraphQL connections.
//!
//! Each call to [`paginate`] owns its cursor and accumulator. Pages are
//! requested strictly in sequence because page K+1 needs page K's
//! `endCursor`.

use std::future::Future;

use serde::Deserialize;

use crate::error::QueryError;
use crate::progress::{ProgressCallback, ReportProgress, emit};

/// Nodes requested per page.
pub const PAGE_SIZE: u32 = 100;

/// GraphQL `PageInfo`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// One page of a GraphQL connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

/// Walk a connection from the first page to the last.
///
/// `fetch_page` receives the cursor for the page to fetch (`None` for the
/// first page). The walk stops at the first page whose `hasNextPage` is
/// false and returns every node in page order. A page that claims a
/// successor but carries no cursor fails with [`QueryError::MissingCursor`]
/// instead of refetching the first page forever.
pub async fn paginate<T, F, Fut>(
    connection: &'static str,
    scope: &str,
    mut fetch_page: F,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<T>, QueryError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Connection<T>, QueryError>>,
{
    let mut items: Vec<T> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 0u32;

    loop {
        page += 1;
        let Connection { nodes, page_info } = fetch_page(cursor.take()).await?;
        let count = nodes.len();
        items.extend(nodes);

        tracing::debug!(
            connection,
            scope,
            page,
            count,
            total_so_far = items.len(),
            has_next_page = page_info.has_next_page,
            "Fetched page"
        );
        emit(
            on_progress,
            ReportProgress::FetchedPage {
                scope: scope.to_string(),
                page,
                count,
                total_so_far: items.len(),
            },
        );

        if !page_info.has_next_page {
            break;
        }

        match page_info.end_cursor {
            Some(next) => cursor = Some(next),
            None => return Err(QueryError::MissingCursor { connection }),
        }
    }

    Ok(items)
}
