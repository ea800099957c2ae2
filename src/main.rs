//! drive_tree CLI - folder sizes and folder management for Google Drive.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_tree::auth::{load_or_authenticate, StaticCode};
use drive_tree::menu::{run_menu, select_root, tree_header};
use drive_tree::{
    extract_id, folder_size_report, format_size, print_tree, Console, DriveClient, DriveRoot,
    Prompter, Session, Terminal,
};

/// Folder sizes and folder management for Google Drive.
#[derive(Parser)]
#[command(name = "drive_tree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the OAuth client secret JSON downloaded from the cloud console.
    #[arg(long, env = "DRIVE_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,

    /// Path of the cached session token.
    #[arg(long, env = "DRIVE_TOKEN", default_value = "token.json")]
    token: PathBuf,

    /// Authorization code to use instead of prompting, when no token is cached.
    #[arg(long, env = "DRIVE_AUTH_CODE", hide_env_values = true)]
    auth_code: Option<String>,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct RootArgs {
    /// Work inside this shared drive (URL or ID).
    #[arg(long, env = "SHARED_DRIVE_ID", conflicts_with = "folder")]
    drive_id: Option<String>,

    /// Work inside this folder (URL or ID).
    #[arg(long, env = "DRIVE_FOLDER")]
    folder: Option<String>,
}

impl RootArgs {
    fn resolve(&self) -> Result<Option<DriveRoot>> {
        if let Some(drive) = &self.drive_id {
            let id = extract_id(drive).with_context(|| format!("Invalid shared drive: {}", drive))?;
            return Ok(Some(DriveRoot::SharedDrive(id)));
        }
        if let Some(folder) = &self.folder {
            let id = extract_id(folder).with_context(|| format!("Invalid folder: {}", folder))?;
            return Ok(Some(DriveRoot::Folder(id)));
        }
        Ok(None)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whole folder tree with sizes and creation dates.
    Tree {
        #[command(flatten)]
        root: RootArgs,
    },

    /// Print the total size of one folder.
    Size {
        /// Folder URL or ID.
        folder: String,
    },

    /// Interactive folder manager (the default).
    Menu {
        #[command(flatten)]
        root: RootArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let auth = match &cli.auth_code {
        Some(code) => {
            let mut prompt = StaticCode(code.clone());
            load_or_authenticate(&cli.credentials, &cli.token, &mut prompt).await
        }
        None if std::io::stdin().is_terminal() => {
            load_or_authenticate(&cli.credentials, &cli.token, &mut Terminal::new()).await
        }
        None => load_or_authenticate(&cli.credentials, &cli.token, &mut Console::stdio()).await,
    }
    .with_context(|| format!("Failed to authenticate with {:?}", cli.credentials))?;

    let client = DriveClient::new(auth);
    let command = cli.command.unwrap_or(Commands::Menu {
        root: RootArgs::default(),
    });

    match command {
        Commands::Tree { root } => {
            let root = root.resolve()?.unwrap_or(DriveRoot::MyDrive);
            let session = Session::new(client, root);

            println!("=== GOOGLE DRIVE FOLDERS: {} ===", session.root());
            println!("{}", tree_header());

            let summary = print_tree(&session, None, 0, &mut std::io::stdout())
                .await
                .context("Failed to list folders")?;

            println!("{}", "-".repeat(80));
            println!(
                "{} folder(s), {} in top-level folders",
                summary.folders,
                format_size(summary.total_bytes)
            );
            if !summary.truncated.is_empty() {
                eprintln!(
                    "Warning: {} folder(s) could not be expanded.",
                    summary.truncated.len()
                );
            }
            if summary.partial_sizes > 0 {
                eprintln!(
                    "Warning: {} size(s) are partial because some folders could not be read.",
                    summary.partial_sizes
                );
            }
        }

        Commands::Size { folder } => {
            let folder_id = extract_id(&folder)
                .with_context(|| format!("Invalid folder URL or ID: {}", folder))?;
            let session = Session::new(client, DriveRoot::Folder(folder_id.clone()));

            let report = folder_size_report(&session, &folder_id).await;
            println!("{} ({} bytes)\t{}", format_size(report.bytes), report.bytes, folder_id);
            if !report.is_complete() {
                eprintln!(
                    "Warning: partial result, {} folder(s) could not be read.",
                    report.unreadable.len()
                );
            }
        }

        Commands::Menu { root } => {
            let root = root.resolve()?;
            if std::io::stdin().is_terminal() {
                interactive(client, root, &mut Terminal::new()).await?;
            } else {
                interactive(client, root, &mut Console::stdio()).await?;
            }
        }
    }

    Ok(())
}

/// Choose the root when none was given on the command line, then run the menu.
async fn interactive<P: Prompter>(
    client: DriveClient,
    root: Option<DriveRoot>,
    prompter: &mut P,
) -> Result<()> {
    let root = match root {
        Some(root) => root,
        None => select_root(&client, prompter)
            .await
            .context("Invalid drive root selection")?,
    };

    let session = Session::new(client, root);
    run_menu(&session, prompter).await?;
    Ok(())
}
