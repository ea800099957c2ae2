//! Folder create, lookup, rename and delete.

use tracing::{debug, info};

use crate::api::{ChildQuery, DriveApi, Parent};
use crate::console::Prompter;
use crate::error::{DriveError, Result};
use crate::models::FileMetadata;
use crate::session::{DriveRoot, Session};

/// Names before and after a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub old_name: String,
    pub new_name: String,
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DriveError::InvalidInput("folder name must not be empty".to_string()));
    }
    Ok(name)
}

/// Create a folder under `parent_id`, or under the session root.
pub async fn create_folder<A: DriveApi>(
    session: &Session<A>,
    name: &str,
    parent_id: Option<&str>,
) -> Result<FileMetadata> {
    let name = require_name(name)?;
    let parent_id = parent_id.or(session.root().folder_id());

    let folder = session.api().create_folder(name, parent_id).await?;
    info!(id = %folder.id, name = %folder.name, "created folder");
    Ok(folder)
}

/// Resolve a folder id from its exact name.
///
/// With `parent_id` only its direct children are searched. Without it the
/// search covers the session root: the whole drive for My Drive and shared
/// drives, or the subtree below the root folder.
///
/// Several folders can share a name; the operator then picks one from a
/// list shown in the order the folders were found.
pub async fn find_folder_by_name<A, P>(
    session: &Session<A>,
    prompter: &mut P,
    name: &str,
    parent_id: Option<&str>,
) -> Result<String>
where
    A: DriveApi,
    P: Prompter,
{
    let name = require_name(name)?;
    let mut matches = match (parent_id, session.root()) {
        (Some(id), _) => {
            let query = ChildQuery::folders_named(name, Parent::Id(id.to_string()));
            session.children(&query).await?
        }
        (None, DriveRoot::Folder(root_id)) => folders_named_below(session, name, root_id).await?,
        (None, _) => session.children(&ChildQuery::folders_named(name, Parent::Any)).await?,
    };

    match matches.len() {
        0 => Err(DriveError::FolderNotFound(name.to_string())),
        1 => Ok(matches.remove(0).id),
        count => {
            prompter.say(format!("Found {} folders named '{}':", count, name))?;
            let labels: Vec<String> = matches.iter().map(ToString::to_string).collect();
            let choice = prompter.choose("Choose a folder", &labels)?;
            Ok(matches.swap_remove(choice).id)
        }
    }
}

/// Folders named `name` anywhere below `top`, in the order they are reached.
async fn folders_named_below<A: DriveApi>(
    session: &Session<A>,
    name: &str,
    top: &str,
) -> Result<Vec<FileMetadata>> {
    let mut found = Vec::new();
    let mut pending = vec![top.to_string()];

    while let Some(current) = pending.pop() {
        let subfolders = session
            .children(&ChildQuery::subfolders(Parent::Id(current)))
            .await?;
        for folder in subfolders.iter().rev() {
            pending.push(folder.id.clone());
        }
        found.extend(subfolders.into_iter().filter(|folder| folder.name == name));
    }

    debug!(%name, %top, matches = found.len(), "searched folder subtree");
    Ok(found)
}

/// Give a folder a new name.
pub async fn rename_folder<A: DriveApi>(
    session: &Session<A>,
    folder_id: &str,
    new_name: &str,
) -> Result<Renamed> {
    let new_name = require_name(new_name)?;
    let current = session.api().get_file(folder_id).await?;
    let updated = session.api().rename_file(folder_id, new_name).await?;

    info!(id = %folder_id, from = %current.name, to = %updated.name, "renamed folder");
    Ok(Renamed {
        old_name: current.name,
        new_name: updated.name,
    })
}

/// Delete a folder and return the name it had.
///
/// The remote call is unconditional; confirmation is the caller's job.
pub async fn delete_folder<A: DriveApi>(session: &Session<A>, folder_id: &str) -> Result<String> {
    let current = session.api().get_file(folder_id).await?;
    session.api().delete_file(folder_id).await?;

    info!(id = %folder_id, name = %current.name, "deleted folder");
    Ok(current.name)
}
