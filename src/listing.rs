//! Lazy, paginated listing of folder children.

use futures::stream::{self, Stream, TryStreamExt};

use crate::api::{ChildQuery, Corpora, DriveApi};
use crate::error::{DriveError, Result};
use crate::models::FileMetadata;

/// Items requested per files.list page (the API maximum).
pub const PAGE_SIZE: u32 = 1000;

/// Pagination state between two page requests.
enum Cursor {
    Start,
    Next(String),
    Done,
}

async fn next_page<A: DriveApi>(
    api: &A,
    corpora: &Corpora,
    query: &ChildQuery,
    cursor: Cursor,
) -> Result<Option<(Vec<FileMetadata>, Cursor)>> {
    let page_token = match cursor {
        Cursor::Start => None,
        Cursor::Next(token) => Some(token),
        Cursor::Done => return Ok(None),
    };

    let page = api.list_page(corpora, query, page_token.as_deref()).await?;
    let cursor = match page.next_page_token {
        Some(token) if !token.is_empty() => Cursor::Next(token),
        _ => Cursor::Done,
    };
    Ok(Some((page.files, cursor)))
}

/// Stream every item matching `query`, following continuation tokens.
///
/// Pages are fetched on demand. A failed request yields one error and ends
/// the stream; calling again starts over from the first page.
pub fn list_children<'a, A: DriveApi>(
    api: &'a A,
    corpora: &'a Corpora,
    query: &'a ChildQuery,
) -> impl Stream<Item = Result<FileMetadata>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| {
        next_page(api, corpora, query, cursor)
    })
    .map_ok(|files| stream::iter(files.into_iter().map(Ok::<_, DriveError>)))
    .try_flatten()
}

/// Collect a whole listing, failing if any page fails.
pub async fn collect_children<A: DriveApi>(
    api: &A,
    corpora: &Corpora,
    query: &ChildQuery,
) -> Result<Vec<FileMetadata>> {
    list_children(api, corpora, query).try_collect().await
}
