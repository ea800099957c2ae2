//! Google Drive v3 HTTP client.

use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::debug;

use crate::api::{ChildQuery, Corpora, DriveApi};
use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::listing::PAGE_SIZE;
use crate::models::{
    ApiErrorResponse, Drive, DriveList, FileListResponse, FileMetadata, FOLDER_MIME_TYPE,
};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for every file resource.
const FILE_FIELDS: &str = "id, name, mimeType, size, createdTime, parents";

/// Client for the Drive files and drives endpoints.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, DRIVE_API_BASE)
    }

    /// Create a client against another endpoint (a proxy or a test server).
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token and send.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.auth.get_access_token().await?;
        let response = request.bearer_auth(&token).send().await?;
        check_status(response).await
    }
}

/// Turn a non-success response into `DriveError::ApiError`, decoding the
/// Google error envelope when there is one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

fn corpora_params(corpora: &Corpora) -> Vec<(&'static str, String)> {
    match corpora {
        Corpora::User => vec![("corpora", "user".to_string())],
        Corpora::Drive(drive_id) => vec![
            ("corpora", "drive".to_string()),
            ("driveId", drive_id.clone()),
            ("includeItemsFromAllDrives", "true".to_string()),
            ("supportsAllDrives", "true".to_string()),
        ],
        Corpora::AllDrives => vec![
            ("corpora", "allDrives".to_string()),
            ("includeItemsFromAllDrives", "true".to_string()),
            ("supportsAllDrives", "true".to_string()),
        ],
    }
}

impl DriveApi for DriveClient {
    async fn list_page(
        &self,
        corpora: &Corpora,
        query: &ChildQuery,
        page_token: Option<&str>,
    ) -> Result<FileListResponse> {
        let q = query.to_query_string();
        let page_size = PAGE_SIZE.to_string();
        let fields = format!("nextPageToken, files({})", FILE_FIELDS);
        debug!(%q, ?page_token, "listing files");

        let mut request = self
            .http
            .get(self.url("/files"))
            .query(&[
                ("q", q.as_str()),
                ("pageSize", page_size.as_str()),
                ("fields", fields.as_str()),
            ])
            .query(&corpora_params(corpora));

        if query.order_by_name {
            request = request.query(&[("orderBy", "name")]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn get_file(&self, file_id: &str) -> Result<FileMetadata> {
        let request = self
            .http
            .get(self.url(&format!("/files/{}", file_id)))
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)]);

        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FileMetadata> {
        let mut metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
        });
        if let Some(parent_id) = parent_id {
            metadata["parents"] = json!([parent_id]);
        }

        let request = self
            .http
            .post(self.url("/files"))
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .json(&metadata);

        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<FileMetadata> {
        let request = self
            .http
            .patch(self.url(&format!("/files/{}", file_id)))
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .json(&json!({ "name": new_name }));

        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.url(&format!("/files/{}", file_id)))
            .query(&[("supportsAllDrives", "true")]);

        self.send(request).await?;
        Ok(())
    }

    async fn list_drives(&self) -> Result<Vec<Drive>> {
        let mut all_drives = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url("/drives"))
                .query(&[("pageSize", "100"), ("fields", "nextPageToken, drives(id, name)")]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let list: DriveList = self.send(request).await?.json().await?;
            all_drives.extend(list.drives);

            match list.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_drives)
    }
}
