use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wfm_core::{WorkspaceConfig, WorkspaceService};

#[derive(Parser)]
#[command(name = "wfm")]
#[command(about = "WFM workspace file manager CLI")]
struct Cli {
    /// Workspace root directory (falls back to WFM_WORKSPACE_DIR, then "workspace")
    #[arg(long)]
    workspace_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workspace files
    List,
    /// List workspace files with size and last-modified time
    Info,
    /// Print a file's content
    Cat {
        /// Relative path inside the workspace
        filename: String,
    },
    /// Create a file (overwrites if it exists)
    Create {
        /// Relative path inside the workspace
        filename: String,
        /// File content (empty if omitted)
        #[arg(default_value = "")]
        content: String,
    },
    /// Overwrite an existing file
    Update {
        /// Relative path inside the workspace
        filename: String,
        content: String,
    },
    /// Delete a file
    Delete {
        /// Relative path inside the workspace
        filename: String,
    },
    /// Copy a local file into the workspace under a relative path
    Upload {
        /// Local file to read
        source: PathBuf,
        /// Relative destination path (directories created as needed)
        dest: String,
    },
    /// Copy a workspace file out to a local path
    Download {
        /// Relative path inside the workspace
        filename: String,
        /// Local destination file
        dest: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let workspace_dir = cli
        .workspace_dir
        .or_else(|| std::env::var("WFM_WORKSPACE_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("workspace"));

    let service = WorkspaceService::new(WorkspaceConfig::new(workspace_dir)?);

    match cli.command {
        Some(Commands::List) => {
            let files = service.list()?;
            if files.is_empty() {
                println!("No files found.");
            } else {
                for file in files {
                    println!("{}", file);
                }
            }
        }
        Some(Commands::Info) => {
            for info in service.list_with_info()? {
                println!("{}\t{} bytes\t{}", info.name, info.size, info.mtime);
            }
        }
        Some(Commands::Cat { filename }) => {
            print!("{}", service.read(&filename)?);
        }
        Some(Commands::Create { filename, content }) => {
            service.create(&filename, &content)?;
            println!("Created {}", filename);
        }
        Some(Commands::Update { filename, content }) => {
            service.update(&filename, &content)?;
            println!("Updated {}", filename);
        }
        Some(Commands::Delete { filename }) => {
            service.delete(&filename)?;
            println!("Deleted {}", filename);
        }
        Some(Commands::Upload { source, dest }) => {
            let bytes = std::fs::read(&source)?;
            service.store_upload(&dest, &bytes)?;
            println!("Uploaded {} -> {}", source.display(), dest);
        }
        Some(Commands::Download { filename, dest }) => {
            let bytes = service.read_bytes(&filename)?;
            std::fs::write(&dest, bytes)?;
            println!("Downloaded {} -> {}", filename, dest.display());
        }
        None => {
            println!("Use 'wfm --help' for commands");
        }
    }

    Ok(())
}
