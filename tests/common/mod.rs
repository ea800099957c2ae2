//! In-memory drive used by the engine and operation tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use drive_tree::api::{ChildFilter, ChildQuery, Corpora, DriveApi, Parent};
use drive_tree::models::{Drive, FileListResponse, FileMetadata, FOLDER_MIME_TYPE};
use drive_tree::{DriveError, Result};

pub struct FakeDrive {
    items: RefCell<Vec<FileMetadata>>,
    drives: Vec<Drive>,
    failing: RefCell<HashSet<String>>,
    trashed: RefCell<HashSet<String>>,
    page_size: usize,
    next_id: Cell<usize>,
    pub list_calls: Cell<usize>,
    pub queries: RefCell<Vec<String>>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            drives: Vec::new(),
            failing: RefCell::new(HashSet::new()),
            trashed: RefCell::new(HashSet::new()),
            page_size: 1000,
            next_id: Cell::new(1),
            list_calls: Cell::new(0),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Serve listings in pages of `page_size` items.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_drives(mut self, drives: &[(&str, &str)]) -> Self {
        self.drives = drives
            .iter()
            .map(|(id, name)| Drive {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn folder(&self, id: &str, name: &str, parent: &str) -> &Self {
        self.folder_created(id, name, parent, "2024-01-15T08:30:00.000Z")
    }

    pub fn folder_created(&self, id: &str, name: &str, parent: &str, created: &str) -> &Self {
        self.items.borrow_mut().push(FileMetadata {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            created_time: Some(created.to_string()),
            parents: vec![parent.to_string()],
            ..Default::default()
        });
        self
    }

    pub fn file(&self, id: &str, parent: &str, size: u64) -> &Self {
        self.items.borrow_mut().push(FileMetadata {
            id: id.to_string(),
            name: format!("{}.bin", id),
            mime_type: Some("application/octet-stream".to_string()),
            size: Some(size),
            parents: vec![parent.to_string()],
            ..Default::default()
        });
        self
    }

    /// A Google Doc: listed, but without a size.
    pub fn document(&self, id: &str, parent: &str) -> &Self {
        self.items.borrow_mut().push(FileMetadata {
            id: id.to_string(),
            name: id.to_string(),
            mime_type: Some("application/vnd.google-apps.document".to_string()),
            parents: vec![parent.to_string()],
            ..Default::default()
        });
        self
    }

    pub fn trash(&self, id: &str) -> &Self {
        self.trashed.borrow_mut().insert(id.to_string());
        self
    }

    /// Make listings of this folder's children fail.
    pub fn fail_listing(&self, parent: &str) -> &Self {
        self.failing.borrow_mut().insert(parent.to_string());
        self
    }

    pub fn exists(&self, id: &str) -> bool {
        self.items.borrow().iter().any(|item| item.id == id)
    }

    pub fn get_file_name(&self, id: &str) -> String {
        self.item(id).name
    }

    pub fn get_file_parents(&self, id: &str) -> Vec<String> {
        self.item(id).parents
    }

    fn item(&self, id: &str) -> FileMetadata {
        self.items
            .borrow()
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("no item {}", id))
    }

    fn parent_key(parent: &Parent) -> Option<String> {
        match parent {
            Parent::Root => Some("root".to_string()),
            Parent::Id(id) => Some(id.clone()),
            Parent::Any => None,
        }
    }

    fn not_found(id: &str) -> DriveError {
        DriveError::ApiError {
            status: 404,
            message: format!("File not found: {}", id),
        }
    }
}

impl DriveApi for FakeDrive {
    async fn list_page(
        &self,
        _corpora: &Corpora,
        query: &ChildQuery,
        page_token: Option<&str>,
    ) -> Result<FileListResponse> {
        self.list_calls.set(self.list_calls.get() + 1);
        let q = query.to_query_string();
        self.queries.borrow_mut().push(q.clone());

        let parent = Self::parent_key(&query.parent);
        if let Some(parent) = &parent {
            if self.failing.borrow().contains(parent) {
                return Err(DriveError::ApiError {
                    status: 500,
                    message: format!("backend error listing {}", parent),
                });
            }
        }

        // Trashed items are only hidden when the query asks for it, like the real API.
        let hide_trashed = q.contains("trashed = false");
        let trashed = self.trashed.borrow();
        let mut matching: Vec<FileMetadata> = self
            .items
            .borrow()
            .iter()
            .filter(|item| !(hide_trashed && trashed.contains(&item.id)))
            .filter(|item| parent.as_ref().map_or(true, |p| item.parents.contains(p)))
            .filter(|item| query.filter == ChildFilter::All || item.is_folder())
            .filter(|item| query.name.as_ref().map_or(true, |n| &item.name == n))
            .cloned()
            .collect();

        if query.order_by_name {
            matching.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let start: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let end = (start + self.page_size).min(matching.len());
        Ok(FileListResponse {
            files: matching[start..end].to_vec(),
            next_page_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn get_file(&self, file_id: &str) -> Result<FileMetadata> {
        self.items
            .borrow()
            .iter()
            .find(|item| item.id == file_id)
            .cloned()
            .ok_or_else(|| Self::not_found(file_id))
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FileMetadata> {
        let id = format!("new-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let folder = FileMetadata {
            id,
            name: name.to_string(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            created_time: Some("2025-06-01T00:00:00.000Z".to_string()),
            parents: vec![parent_id.unwrap_or("root").to_string()],
            ..Default::default()
        };
        self.items.borrow_mut().push(folder.clone());
        Ok(folder)
    }

    async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<FileMetadata> {
        let mut items = self.items.borrow_mut();
        let item = items
            .iter_mut()
            .find(|item| item.id == file_id)
            .ok_or_else(|| Self::not_found(file_id))?;
        item.name = new_name.to_string();
        Ok(item.clone())
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let mut items = self.items.borrow_mut();
        let before = items.len();
        items.retain(|item| item.id != file_id);
        if items.len() == before {
            return Err(Self::not_found(file_id));
        }
        Ok(())
    }

    async fn list_drives(&self) -> Result<Vec<Drive>> {
        Ok(self.drives.clone())
    }
}
