//! drive_tree - folder sizes and folder management for Google Drive.
//!
//! This library provides functionality to:
//! - Authenticate with an installed-app OAuth client and cache the token
//! - Compute the total size of a folder, nested folders included
//! - Print the folder tree with sizes and creation dates
//! - Create, rename and delete folders
//!
//! # Example
//!
//! ```no_run
//! use drive_tree::auth::{load_or_authenticate, StaticCode};
//! use drive_tree::{print_tree, DriveClient, DriveRoot, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut prompt = StaticCode("4/one-time-code".to_string());
//!     let auth = load_or_authenticate("credentials.json", "token.json", &mut prompt).await?;
//!     let session = Session::new(DriveClient::new(auth), DriveRoot::MyDrive);
//!
//!     print_tree(&session, None, 0, &mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod console;
pub mod error;
pub mod listing;
pub mod menu;
pub mod models;
pub mod ops;
pub mod session;
pub mod size;
pub mod tree;
pub mod url_parser;

// Re-exports for convenience
pub use api::{ChildFilter, ChildQuery, Corpora, DriveApi, Parent};
pub use auth::{load_or_authenticate, Authenticator, CodePrompt};
pub use client::DriveClient;
pub use console::{Console, Prompter, Terminal};
pub use error::{DriveError, Result};
pub use models::{format_size, FileMetadata};
pub use ops::{create_folder, delete_folder, find_folder_by_name, rename_folder};
pub use session::{DriveRoot, Session};
pub use size::{folder_size, folder_size_report, SizeReport};
pub use tree::{print_tree, TreeSummary};
pub use url_parser::extract_id;
