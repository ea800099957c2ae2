//! The remote API surface the folder engine is written against.
//!
//! [`DriveClient`](crate::client::DriveClient) implements [`DriveApi`] over
//! HTTP; tests plug in an in-memory drive instead.

use crate::error::Result;
use crate::models::{Drive, FileListResponse, FileMetadata, FOLDER_MIME_TYPE};

/// Where a listing looks for items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpora {
    /// The signed-in user's My Drive.
    User,
    /// A single shared drive.
    Drive(String),
    /// Everything the user can see, including shared drives.
    AllDrives,
}

/// Parent constraint of a listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// Direct children of the My Drive root.
    Root,
    /// Direct children of the given folder (or shared drive) id.
    Id(String),
    /// No parent constraint.
    Any,
}

impl Parent {
    pub fn from_id(id: Option<&str>) -> Self {
        match id {
            Some(id) => Parent::Id(id.to_string()),
            None => Parent::Root,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFilter {
    FoldersOnly,
    All,
}

/// A files.list query. Trashed items are always excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildQuery {
    pub parent: Parent,
    pub filter: ChildFilter,
    pub name: Option<String>,
    pub order_by_name: bool,
}

impl ChildQuery {
    /// Every non-trashed child of `parent`, files and folders alike.
    pub fn children(parent: Parent) -> Self {
        Self {
            parent,
            filter: ChildFilter::All,
            name: None,
            order_by_name: false,
        }
    }

    /// Child folders of `parent`, sorted by name.
    pub fn subfolders(parent: Parent) -> Self {
        Self {
            parent,
            filter: ChildFilter::FoldersOnly,
            name: None,
            order_by_name: true,
        }
    }

    /// Folders named exactly `name` under `parent`.
    pub fn folders_named(name: &str, parent: Parent) -> Self {
        Self {
            parent,
            filter: ChildFilter::FoldersOnly,
            name: Some(name.to_string()),
            order_by_name: false,
        }
    }

    /// Render the Drive query language string (the `q` parameter).
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::new();

        if let Some(name) = &self.name {
            clauses.push(format!("name = '{}'", escape(name)));
        }

        match &self.parent {
            Parent::Root => clauses.push("'root' in parents".to_string()),
            Parent::Id(id) => clauses.push(format!("'{}' in parents", escape(id))),
            Parent::Any => {}
        }

        if self.filter == ChildFilter::FoldersOnly {
            clauses.push(format!("mimeType = '{}'", FOLDER_MIME_TYPE));
        }

        clauses.push("trashed = false".to_string());
        clauses.join(" and ")
    }
}

/// Escape a value for use inside a single-quoted query literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Operations the folder engine needs from the remote service.
#[allow(async_fn_in_trait)]
pub trait DriveApi {
    /// Fetch one page of a files.list query.
    async fn list_page(
        &self,
        corpora: &Corpora,
        query: &ChildQuery,
        page_token: Option<&str>,
    ) -> Result<FileListResponse>;

    async fn get_file(&self, file_id: &str) -> Result<FileMetadata>;

    /// Create a folder; without a parent the remote places it in My Drive's root.
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FileMetadata>;

    async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<FileMetadata>;

    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// All shared drives visible to the user.
    async fn list_drives(&self) -> Result<Vec<Drive>>;
}
