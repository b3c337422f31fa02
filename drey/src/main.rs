use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drey_core::{Identity, Repository, TreeBuilder};
use std::path::{Path, PathBuf};

mod output;

use output::{
    CaptureOutput, CatOutput, DestroyOutput, ExistsOutput, FindOutput, InitOutput, OutputWriter,
    StatusOutput,
};

/// Drey - a content-addressed snapshot store
#[derive(Parser)]
#[command(name = "drey")]
#[command(about = "Content-addressed directory snapshots using BLAKE3", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository root (defaults to DREY_ROOT env var or the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new repository
    Init,

    /// Capture a file or directory into the object store
    Capture {
        /// Path relative to the repository root
        path: String,

        /// Record tree entries in the staging index alongside blob entries
        #[arg(long)]
        trees: bool,
    },

    /// Print an object's text to stdout
    Cat {
        /// Identity of the object
        identity: String,
    },

    /// Check whether an object exists
    Exists {
        /// Identity of the object
        identity: String,
    },

    /// List the staging index
    Status,

    /// Find a file by name in the work tree
    Find {
        /// File name to search for
        name: String,
    },

    /// Delete the repository, its objects, and its work tree
    Destroy {
        /// Confirm the deletion
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.json);

    // Determine repository root: CLI arg > DREY_ROOT env var > current directory
    let root = cli
        .root
        .or_else(|| std::env::var("DREY_ROOT").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let result = match cli.command {
        Commands::Init => cmd_init(&root, &writer),
        Commands::Capture { path, trees } => cmd_capture(&root, &writer, &path, trees),
        Commands::Cat { identity } => cmd_cat(&root, &writer, &identity),
        Commands::Exists { identity } => cmd_exists(&root, &writer, &identity),
        Commands::Status => cmd_status(&root, &writer),
        Commands::Find { name } => cmd_find(&root, &writer, &name),
        Commands::Destroy { force } => cmd_destroy(&root, &writer, force),
    };

    if let Err(err) = result {
        writer.write_error(&err);
        std::process::exit(1);
    }
}

fn open_repository(root: &Path) -> Result<Repository> {
    Repository::open(root)
        .with_context(|| format!("Failed to open repository at {}", root.display()))
}

fn cmd_init(root: &Path, writer: &OutputWriter) -> Result<()> {
    let repo = Repository::init(root)
        .with_context(|| format!("Failed to initialize repository at {}", root.display()))?;

    writer.write(
        &InitOutput {
            success: true,
            root: root.display().to_string(),
            algorithm: repo.algorithm().as_str().to_string(),
        },
        || {
            format!(
                "Initialized repository at {}\nAlgorithm: {}\n",
                root.display(),
                repo.algorithm().as_str()
            )
        },
    )
}

fn cmd_capture(root: &Path, writer: &OutputWriter, path: &str, trees: bool) -> Result<()> {
    let repo = open_repository(root)?;
    let store = repo.objects()?;
    let index = repo.index()?;
    let builder = TreeBuilder::new(&store, &index, repo.root()).index_trees(trees);

    let staged_before = index.entries()?.len();

    let target = repo.root().join(path);
    let identity = if target.is_dir() {
        builder.build(path)
    } else {
        builder.capture_file(path)
    }
    .with_context(|| format!("Failed to capture {}", path))?;

    let staged = index.entries()?.len() - staged_before;

    writer.write(
        &CaptureOutput {
            success: true,
            identity,
            path: path.to_string(),
            staged,
        },
        || format!("{} {}\n", identity, path),
    )
}

fn cmd_cat(root: &Path, writer: &OutputWriter, identity: &str) -> Result<()> {
    let repo = open_repository(root)?;
    let id = Identity::from_hex(identity).with_context(|| format!("Invalid identity: {}", identity))?;

    let text = repo
        .objects()?
        .get(&id)
        .with_context(|| format!("Failed to read object {}", id))?;

    writer.write(
        &CatOutput {
            success: true,
            identity: id,
            text: text.clone(),
        },
        || text,
    )
}

fn cmd_exists(root: &Path, writer: &OutputWriter, identity: &str) -> Result<()> {
    let repo = open_repository(root)?;
    let id = Identity::from_hex(identity).with_context(|| format!("Invalid identity: {}", identity))?;

    let exists = repo.objects()?.exists(&id)?;

    writer.write(
        &ExistsOutput {
            success: true,
            identity: id,
            exists,
        },
        || format!("{}\n", if exists { "exists" } else { "missing" }),
    )
}

fn cmd_status(root: &Path, writer: &OutputWriter) -> Result<()> {
    let repo = open_repository(root)?;
    let entries = repo.index()?.entries().context("Failed to read staging index")?;

    writer.write(
        &StatusOutput {
            success: true,
            entries: entries.clone(),
        },
        || {
            if entries.is_empty() {
                "Staging index is empty\n".to_string()
            } else {
                let mut text = String::new();
                for entry in &entries {
                    text.push_str(&entry.to_line());
                    text.push('\n');
                }
                text
            }
        },
    )
}

fn cmd_find(root: &Path, writer: &OutputWriter, name: &str) -> Result<()> {
    let repo = open_repository(root)?;
    let found = repo.find_file(name)?;

    writer.write(
        &FindOutput {
            success: true,
            name: name.to_string(),
            path: found.as_ref().map(|p| p.display().to_string()),
        },
        || match &found {
            Some(path) => format!("{}\n", path.display()),
            None => format!("{} not found\n", name),
        },
    )
}

fn cmd_destroy(root: &Path, writer: &OutputWriter, force: bool) -> Result<()> {
    if !force {
        anyhow::bail!(
            "refusing to delete {}; pass --force to confirm",
            root.display()
        );
    }

    let repo = open_repository(root)?;
    repo.destroy()
        .with_context(|| format!("Failed to destroy repository at {}", root.display()))?;

    writer.write(
        &DestroyOutput {
            success: true,
            root: root.display().to_string(),
        },
        || format!("Destroyed repository at {}\n", root.display()),
    )
}
