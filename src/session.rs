//! The per-run working context: an API handle plus the chosen drive root.

use std::fmt;

use crate::api::{ChildQuery, Corpora, DriveApi, Parent};
use crate::error::Result;
use crate::listing;
use crate::models::FileMetadata;

/// Where folder operations are anchored for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveRoot {
    MyDrive,
    SharedDrive(String),
    Folder(String),
}

impl DriveRoot {
    pub fn corpora(&self) -> Corpora {
        match self {
            DriveRoot::MyDrive => Corpora::User,
            DriveRoot::SharedDrive(id) => Corpora::Drive(id.clone()),
            DriveRoot::Folder(_) => Corpora::AllDrives,
        }
    }

    /// Folder id acting as the top of the tree; `None` is the My Drive root.
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            DriveRoot::MyDrive => None,
            DriveRoot::SharedDrive(id) | DriveRoot::Folder(id) => Some(id.as_str()),
        }
    }
}

impl fmt::Display for DriveRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveRoot::MyDrive => write!(f, "My Drive"),
            DriveRoot::SharedDrive(id) => write!(f, "shared drive {}", id),
            DriveRoot::Folder(id) => write!(f, "folder {}", id),
        }
    }
}

/// API handle and drive root, passed explicitly to every operation.
pub struct Session<A> {
    api: A,
    root: DriveRoot,
    corpora: Corpora,
}

impl<A: DriveApi> Session<A> {
    pub fn new(api: A, root: DriveRoot) -> Self {
        let corpora = root.corpora();
        Self { api, root, corpora }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn root(&self) -> &DriveRoot {
        &self.root
    }

    pub fn corpora(&self) -> &Corpora {
        &self.corpora
    }

    /// The explicit parent when given, otherwise the root of the session.
    pub fn parent_or_root(&self, parent_id: Option<&str>) -> Parent {
        Parent::from_id(parent_id.or(self.root.folder_id()))
    }

    /// Run a listing query in this session's search space.
    pub async fn children(&self, query: &ChildQuery) -> Result<Vec<FileMetadata>> {
        listing::collect_children(&self.api, &self.corpora, query).await
    }
}
