//! Recursive folder size aggregation.

use tracing::{debug, warn};

use crate::api::{ChildQuery, DriveApi, Parent};
use crate::session::Session;

/// Outcome of a size walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeReport {
    /// Sum of file sizes under the folder, nested folders included.
    pub bytes: u64,
    /// Folders whose children were listed successfully.
    pub folders_scanned: usize,
    /// Folders that could not be listed; their subtrees count as zero.
    pub unreadable: Vec<String>,
}

impl SizeReport {
    /// Whether every folder in the subtree was counted.
    pub fn is_complete(&self) -> bool {
        self.unreadable.is_empty()
    }
}

/// Total bytes stored under `folder_id`.
///
/// Folders that fail to list contribute zero, so a small result may be
/// partial; use [`folder_size_report`] to tell.
pub async fn folder_size<A: DriveApi>(session: &Session<A>, folder_id: &str) -> u64 {
    folder_size_report(session, folder_id).await.bytes
}

/// Walk the subtree under `folder_id` depth-first, summing file sizes.
///
/// Every folder is listed once per call; nothing is cached between calls.
pub async fn folder_size_report<A: DriveApi>(session: &Session<A>, folder_id: &str) -> SizeReport {
    let mut report = SizeReport::default();
    let mut pending = vec![folder_id.to_string()];

    while let Some(current) = pending.pop() {
        let query = ChildQuery::children(Parent::Id(current.clone()));
        let children = match session.children(&query).await {
            Ok(children) => children,
            Err(e) => {
                warn!(folder = %current, error = %e, "cannot list folder, counting it as empty");
                report.unreadable.push(current);
                continue;
            }
        };

        report.folders_scanned += 1;
        for child in children {
            if child.is_folder() {
                pending.push(child.id);
            } else {
                report.bytes += child.size_bytes();
            }
        }
    }

    debug!(folder = %folder_id, bytes = report.bytes, scanned = report.folders_scanned, "size computed");
    report
}
