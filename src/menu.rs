//! Interactive folder manager.

use crate::api::DriveApi;
use crate::console::Prompter;
use crate::error::{DriveError, Result};
use crate::models::format_size;
use crate::ops::{create_folder, delete_folder, find_folder_by_name, rename_folder};
use crate::session::{DriveRoot, Session};
use crate::size::folder_size_report;
use crate::tree::print_tree;
use crate::url_parser::extract_id;

/// Header printed above tree listings.
pub fn tree_header() -> String {
    format!(
        "{}\n{}",
        crate::tree::format_tree_line(0, "FOLDER", "SIZE", "CREATED"),
        "-".repeat(80)
    )
}

/// Ask the operator which drive root to work in.
///
/// Any invalid answer here is an error; there is nothing sensible to fall
/// back to before a root is chosen.
pub async fn select_root<A, P>(api: &A, console: &mut P) -> Result<DriveRoot>
where
    A: DriveApi,
    P: Prompter,
{
    let choice = console.pick(
        "Choose where to work:",
        &[("1", "My Drive"), ("2", "A shared drive"), ("3", "A folder by ID or link")],
    )?;

    match choice.as_str() {
        "1" => Ok(DriveRoot::MyDrive),
        "2" => {
            let drives = api.list_drives().await?;
            if drives.is_empty() {
                return Err(DriveError::InvalidSelection("no shared drives available".to_string()));
            }
            let labels: Vec<String> = drives
                .iter()
                .map(|drive| format!("{} ({})", drive.name, drive.id))
                .collect();
            let choice = console.choose("Shared drive", &labels)?;
            Ok(DriveRoot::SharedDrive(drives[choice].id.clone()))
        }
        "3" => {
            let input = console.prompt("Folder ID or link")?;
            Ok(DriveRoot::Folder(extract_id(&input)?))
        }
        other => Err(DriveError::InvalidSelection(format!("unknown root choice {:?}", other))),
    }
}

const MENU_OPTIONS: [(&str, &str); 6] = [
    ("1", "List folders"),
    ("2", "Create folder"),
    ("3", "Rename folder"),
    ("4", "Delete folder"),
    ("5", "Show folder size"),
    ("0", "Exit"),
];

/// Run the menu loop until the operator exits or input ends.
///
/// Failed operations are reported and the loop carries on.
pub async fn run_menu<A, P>(session: &Session<A>, console: &mut P) -> Result<()>
where
    A: DriveApi,
    P: Prompter,
{
    loop {
        let choice = match console.pick(
            &format!("\n=== DRIVE FOLDER MANAGER: {} ===", session.root()),
            &MENU_OPTIONS,
        ) {
            Ok(choice) => choice,
            Err(DriveError::Prompt(_)) => break,
            Err(e) => return Err(e),
        };

        let outcome = match choice.as_str() {
            "1" => list_folders(session, console).await,
            "2" => create_interactive(session, console).await,
            "3" => rename_interactive(session, console).await,
            "4" => delete_interactive(session, console).await,
            "5" => size_interactive(session, console).await,
            "0" => break,
            other => console.say(format!("Unknown choice {:?}", other)),
        };

        if let Err(e) = outcome {
            console.say(format!("Error: {}", e))?;
        }
    }

    console.say("Bye.")
}

async fn list_folders<A, P>(session: &Session<A>, console: &mut P) -> Result<()>
where
    A: DriveApi,
    P: Prompter,
{
    console.say(tree_header())?;
    let summary = print_tree(session, None, 0, console.output()).await?;

    if summary.folders == 0 {
        console.say("No folders found.")?;
    }
    if !summary.truncated.is_empty() {
        console.say(format!(
            "Note: {} folder(s) could not be expanded.",
            summary.truncated.len()
        ))?;
    }
    Ok(())
}

async fn create_interactive<A, P>(session: &Session<A>, console: &mut P) -> Result<()>
where
    A: DriveApi,
    P: Prompter,
{
    let name = console.prompt("New folder name")?;
    let parent = console.prompt("Parent folder name (empty for the root)")?;
    let parent_id = if parent.is_empty() {
        None
    } else {
        Some(find_folder_by_name(session, console, &parent, None).await?)
    };

    let folder = create_folder(session, &name, parent_id.as_deref()).await?;
    console.say(format!("Created folder '{}' (ID: {})", folder.name, folder.id))
}

async fn rename_interactive<A, P>(session: &Session<A>, console: &mut P) -> Result<()>
where
    A: DriveApi,
    P: Prompter,
{
    let name = console.prompt("Folder to rename")?;
    let folder_id = find_folder_by_name(session, console, &name, None).await?;
    let new_name = console.prompt("New name")?;

    let renamed = rename_folder(session, &folder_id, &new_name).await?;
    console.say(format!("Renamed '{}' -> '{}'", renamed.old_name, renamed.new_name))
}

async fn delete_interactive<A, P>(session: &Session<A>, console: &mut P) -> Result<()>
where
    A: DriveApi,
    P: Prompter,
{
    let name = console.prompt("Folder to delete")?;
    let folder_id = find_folder_by_name(session, console, &name, None).await?;

    if !console.confirm(&format!("Delete folder '{}' and everything in it?", name))? {
        return console.say("Cancelled.");
    }

    let deleted = delete_folder(session, &folder_id).await?;
    console.say(format!("Deleted folder '{}'", deleted))
}

async fn size_interactive<A, P>(session: &Session<A>, console: &mut P) -> Result<()>
where
    A: DriveApi,
    P: Prompter,
{
    let name = console.prompt("Folder name")?;
    let folder_id = find_folder_by_name(session, console, &name, None).await?;

    let report = folder_size_report(session, &folder_id).await;
    console.say(format!("Size of '{}': {}", name, format_size(report.bytes)))?;
    if !report.is_complete() {
        console.say(format!(
            "Partial result: {} folder(s) could not be read.",
            report.unreadable.len()
        ))?;
    }
    Ok(())
}
