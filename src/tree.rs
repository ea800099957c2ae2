//! Hierarchical folder listing with sizes and creation dates.

use std::io::Write;

use tracing::warn;

use crate::api::{ChildQuery, DriveApi, Parent};
use crate::error::Result;
use crate::models::{format_size, FileMetadata};
use crate::session::Session;
use crate::size::folder_size_report;

/// Width the folder name column is padded to.
const NAME_WIDTH: usize = 40;

/// Width the size column is right-aligned to.
const SIZE_WIDTH: usize = 10;

/// Counters from one tree walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub folders: usize,
    pub total_bytes: u64,
    /// Folders whose subfolders could not be listed and were not expanded.
    pub truncated: Vec<String>,
    /// Sizes that are partial because part of the subtree was unreadable.
    pub partial_sizes: usize,
}

/// One output line: indented name, size, creation date.
pub fn format_tree_line(depth: usize, name: &str, size: &str, created: &str) -> String {
    format!(
        "{}{:<name_w$} | {:>size_w$} | {}",
        "  ".repeat(depth),
        name,
        size,
        created,
        name_w = NAME_WIDTH,
        size_w = SIZE_WIDTH,
    )
}

/// Print every folder below `parent_id` (the session root when `None`),
/// depth-first with siblings in name order, starting at `depth`.
///
/// Failing to list `parent_id` itself is an error. Failing to list a folder
/// further down only stops the walk below that folder; it is logged and
/// reported in [`TreeSummary::truncated`].
pub async fn print_tree<A, W>(
    session: &Session<A>,
    parent_id: Option<&str>,
    depth: usize,
    out: &mut W,
) -> Result<TreeSummary>
where
    A: DriveApi,
    W: Write,
{
    let mut summary = TreeSummary::default();

    let top = session
        .children(&ChildQuery::subfolders(session.parent_or_root(parent_id)))
        .await?;
    let base_depth = depth;
    let mut stack: Vec<(FileMetadata, usize)> = Vec::new();
    push_children(&mut stack, top, base_depth);

    while let Some((folder, depth)) = stack.pop() {
        let size = folder_size_report(session, &folder.id).await;
        if !size.is_complete() {
            summary.partial_sizes += 1;
        }
        if depth == base_depth {
            summary.total_bytes += size.bytes;
        }

        writeln!(
            out,
            "{}",
            format_tree_line(depth, &folder.name, &format_size(size.bytes), folder.created_date())
        )?;
        summary.folders += 1;

        let query = ChildQuery::subfolders(Parent::Id(folder.id.clone()));
        match session.children(&query).await {
            Ok(children) => push_children(&mut stack, children, depth + 1),
            Err(e) => {
                warn!(folder = %folder.id, error = %e, "cannot list subfolders, skipping subtree");
                summary.truncated.push(folder.id);
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

/// Push siblings so that the first in name order is popped first.
fn push_children(stack: &mut Vec<(FileMetadata, usize)>, children: Vec<FileMetadata>, depth: usize) {
    stack.extend(children.into_iter().rev().map(|child| (child, depth)));
}
