//! Pagination walker
//!
//! Drives a cursor-paginated listing to exhaustion. Pages are fetched strictly
//! one after another since each cursor comes from the previous response.

use std::fmt::Debug;
use std::future::Future;

use crate::error::{DnsError, Result};
use crate::types::Page;

/// Fetch every page starting at `start` and return all items in page order.
///
/// The first error aborts the walk; items from earlier pages are discarded.
/// A page whose continuation cursor equals the cursor it was fetched with is
/// treated as a malformed response, since following it would never end.
pub async fn walk_pages<T, C, F, Fut>(start: Option<C>, mut fetch: F) -> Result<Vec<T>>
where
    C: Clone + PartialEq + Debug,
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<Page<T, C>>>,
{
    let mut items = Vec::new();
    let mut cursor = start;
    let mut pages = 0_usize;

    loop {
        let page = fetch(cursor.clone()).await?;
        pages += 1;
        log::debug!(
            "Fetched page {pages} ({} items, more: {})",
            page.items.len(),
            page.next.is_some()
        );
        items.extend(page.items);

        match page.next {
            None => break,
            Some(next) if cursor.as_ref() == Some(&next) => {
                return Err(DnsError::Parse {
                    provider: "pagination".to_string(),
                    detail: format!("continuation cursor did not advance: {next:?}"),
                });
            }
            Some(next) => cursor = Some(next),
        }
    }

    Ok(items)
}
