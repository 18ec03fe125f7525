use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use std::path::{Path, PathBuf};
use surge::areas::config::RepositoryConfig;
use surge::areas::refs::HeadTarget;
use surge::areas::repository::Repository;
use surge::artifacts::core::PagerWriter;
use surge::artifacts::diff::patch::FilePatch;
use surge::artifacts::objects::commit::Commit;
use surge::artifacts::objects::object_id::ObjectId;
use surge::artifacts::remote::LocalTransport;
use surge::artifacts::status::file_change::{FileChangeType, WorkspaceChangeType};
use surge::artifacts::status::status_info::StatusReport;
use surge::commands::porcelain::commit::CommitOptions;
use surge::commands::porcelain::merge::MergeOutcome;
use surge::commands::porcelain::reset::ResetMode;
use surge::errors::Error;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "SURGE_LOG";

#[derive(Parser)]
#[command(
    name = "surge",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A content-addressed version-control engine",
    long_about = "surge tracks snapshots of a directory as content-addressed objects, \
    with branches, three-way merges and object exchange between repositories.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short = 'C', long = "directory", global = true, help = "Run as if started in this directory")]
    directory: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Log debug output to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage files or directories for the next commit")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "rm", about = "Stop tracking files and delete them from the working copy")]
    Rm {
        #[arg(long, help = "Keep the files in the working copy")]
        cached: bool,
        #[arg(index = 1, required = true, help = "Files or directories to remove")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
        #[arg(long, help = "Allow the first commit to record no files")]
        allow_empty_root: bool,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(short, long, help = "Give the output in the short format")]
        short: bool,
    },
    #[command(name = "diff", about = "Show changes between two revisions")]
    Diff {
        #[arg(index = 1, help = "The old revision")]
        from: String,
        #[arg(index = 2, default_value = "HEAD", help = "The new revision")]
        to: String,
    },
    #[command(name = "log", about = "Show commit history")]
    Log {
        #[arg(index = 1, default_value = "HEAD", help = "The revision to start from")]
        revision: String,
        #[arg(long, help = "One line per commit")]
        oneline: bool,
        #[arg(long, help = "Follow every parent of merge commits")]
        all_parents: bool,
    },
    #[command(name = "branch", about = "Create, delete or list branches")]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },
    #[command(name = "checkout", about = "Switch branches or detach HEAD at a commit")]
    Checkout {
        #[arg(index = 1, help = "A branch name or any other revision")]
        target: String,
    },
    #[command(name = "merge", about = "Merge another branch into the current one")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
        #[arg(long, help = "Merge edits to separate regions of the same file automatically")]
        auto_resolve: bool,
    },
    #[command(name = "reset", about = "Move the current branch to another commit")]
    Reset {
        #[arg(index = 1, default_value = "HEAD", help = "The commit to reset to")]
        target: String,
        #[arg(long, conflicts_with_all = ["mixed", "hard"], help = "Move the branch only")]
        soft: bool,
        #[arg(long, conflicts_with = "hard", help = "Also clear the index (default)")]
        mixed: bool,
        #[arg(long, help = "Also discard working-copy changes")]
        hard: bool,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database",
        long_about = "This command hashes a file as a blob and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the id (or an abbreviation of it) to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object id to print")]
        sha: String,
    },
    #[command(name = "push", about = "Send a branch to another repository")]
    Push {
        #[arg(index = 1, help = "Path to the other repository")]
        remote: PathBuf,
        #[arg(index = 2, help = "The branch to push; the current branch by default")]
        branch: Option<String>,
        #[arg(long, default_value = "origin", help = "Name to record the remote under")]
        name: String,
    },
    #[command(name = "fetch", about = "Copy a branch from another repository")]
    Fetch {
        #[arg(index = 1, help = "Path to the other repository")]
        remote: PathBuf,
        #[arg(index = 2, help = "The branch to fetch")]
        branch: String,
        #[arg(long, default_value = "origin", help = "Name to record the remote under")]
        name: String,
    },
}

#[derive(Subcommand)]
enum BranchAction {
    #[command(about = "Create a branch")]
    Create {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2, help = "Start point; HEAD by default")]
        start: Option<String>,
    },
    #[command(about = "Delete a branch")]
    Delete {
        #[arg(index = 1)]
        name: String,
    },
    #[command(about = "List branches")]
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pwd = match &cli.directory {
        Some(directory) => directory.clone(),
        None => std::env::current_dir().context("unable to read the current directory")?,
    };
    let config = RepositoryConfig::from_env().context("invalid configuration")?;

    if let Commands::Init { path } = &cli.command {
        let path = path.as_ref().map(|path| pwd.join(path)).unwrap_or_else(|| pwd.clone());
        let repository = Repository::init(&path, config)?;
        println!("Initialized empty surge repository in {}", repository.surge_path().display());
        return Ok(());
    }

    let repository = Repository::open(&pwd, config)?;
    run(&repository, cli.command).await.map_err(explain)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// merge conflicts deserve more than a one-line error
fn explain(error: Error) -> anyhow::Error {
    if let Error::ManualResolutionRequired { paths } = &error {
        for path in paths {
            eprintln!("CONFLICT (content): merge conflict in {}", path.display());
        }
        eprintln!("Fix the conflicts, add the files and commit the result.");
    }

    error.into()
}

async fn run(repository: &Repository, command: Commands) -> surge::errors::Result<()> {
    let mut stdout = std::io::stdout();

    match command {
        Commands::Init { .. } => {}
        Commands::Add { paths } => {
            repository.add_files(&paths).await?;
        }
        Commands::Rm { cached, paths } => {
            for path in repository.remove_files(&paths, cached).await? {
                println!("rm '{}'", path.display());
            }
        }
        Commands::Commit {
            message,
            allow_empty_root,
        } => {
            let author = repository.config().author()?;
            let is_root = repository.refs().read_head()?.is_none();
            let oid = repository
                .commit_with_options(&message, author, CommitOptions { allow_empty_root })
                .await?;
            let root = if is_root { "(root-commit) " } else { "" };
            println!("[{root}{}] {}", oid.to_short_oid(), message.lines().next().unwrap_or_default());
        }
        Commands::Status { short } => {
            let report = repository.status()?;
            if short {
                print_short_status(&report);
            } else {
                print_long_status(repository, &report)?;
            }
        }
        Commands::Diff { from, to } => {
            for patch in repository.diff(&from, &to)? {
                print_patch(&patch);
            }
        }
        Commands::Log {
            revision,
            oneline,
            all_parents,
        } => {
            let (mut writer, pager) = log_writer();
            if all_parents {
                for entry in repository.walk_all(&revision)? {
                    let (oid, commit) = entry?;
                    write_commit(&mut writer, &oid, &commit, oneline)?;
                }
            } else {
                for entry in repository.walk_history(&revision)? {
                    let (oid, commit) = entry?;
                    write_commit(&mut writer, &oid, &commit, oneline)?;
                }
            }
            drop(writer);
            if let Some(pager) = pager {
                minus::page_all(pager).map_err(|error| Error::rejected(format!("pager failed: {error}")))?;
            }
        }
        Commands::Branch { action } => match action {
            BranchAction::Create { name, start } => {
                repository.create_branch(&name, start.as_deref()).await?;
            }
            BranchAction::Delete { name } => {
                let oid = repository.delete_branch(&name).await?;
                let was = oid.map(|oid| oid.to_short_oid()).unwrap_or_else(|| "unborn".to_string());
                println!("Deleted branch {name} (was {was}).");
            }
            BranchAction::List => {
                let current = repository.refs().current_branch()?;
                for branch in repository.list_branches()? {
                    let oid = branch.oid.as_ref().map(ObjectId::to_short_oid).unwrap_or_default();
                    if current.as_ref() == Some(&branch.name) {
                        println!("* {} {}", branch.name.to_string().green(), oid);
                    } else {
                        println!("  {} {}", branch.name, oid);
                    }
                }
            }
        },
        Commands::Checkout { target } => match repository.checkout(&target).await? {
            HeadTarget::Branch(branch) => eprintln!("Switched to branch '{branch}'"),
            HeadTarget::Detached(oid) => eprintln!("HEAD is now at {}", oid.to_short_oid()),
        },
        Commands::Merge { branch, auto_resolve } => {
            let author = repository.config().author()?;
            match repository.merge(&branch, auto_resolve, author).await? {
                MergeOutcome::AlreadyUpToDate => println!("Already up to date."),
                MergeOutcome::Merged(oid) => println!("Merge made by the 'three-way' strategy: {}", oid.to_short_oid()),
            }
        }
        Commands::Reset {
            target,
            soft,
            mixed: _,
            hard,
        } => {
            let mode = match (soft, hard) {
                (true, _) => ResetMode::Soft,
                (_, true) => ResetMode::Hard,
                _ => ResetMode::Mixed,
            };
            let oid = repository.reset(&target, mode).await?;
            println!("HEAD is now at {}", oid.to_short_oid());
        }
        Commands::HashObject { write, file } => {
            println!("{}", repository.hash_object(&file, write)?);
        }
        Commands::CatFile { sha } => {
            let (_, object) = repository.cat_file(&sha)?;
            let _ = writeln!(stdout, "{}", object.display());
        }
        Commands::Push { remote, branch, name } => {
            let transport = LocalTransport::open(name, &absolute(repository.path(), &remote))?;
            let oid = repository.push(&transport, branch.as_deref()).await?;
            println!("To {}: {}", transport.root().display(), oid.to_short_oid());
        }
        Commands::Fetch { remote, branch, name } => {
            let transport = LocalTransport::open(name, &absolute(repository.path(), &remote))?;
            let oid = repository.fetch(&transport, &branch).await?;
            println!("From {}: {branch} -> {}", transport.root().display(), oid.to_short_oid());
        }
    }

    Ok(())
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
}

// page through minus only when a human is watching
fn log_writer() -> (Box<dyn Write>, Option<Pager>) {
    if std::io::stdout().is_terminal() {
        let pager = Pager::new();
        (Box::new(PagerWriter::new(pager.clone())), Some(pager))
    } else {
        (Box::new(std::io::stdout()), None)
    }
}

fn write_commit(writer: &mut dyn Write, oid: &ObjectId, commit: &Commit, oneline: bool) -> surge::errors::Result<()> {
    let io_error = |source| Error::Io {
        context: "unable to write log output".to_string(),
        source,
    };

    if oneline {
        return writeln!(writer, "{} {}", oid.to_short_oid().yellow(), commit.short_message()).map_err(io_error);
    }

    let mut text = format!("{}\n", format!("commit {oid}").yellow());
    if commit.is_merge() {
        let parents = commit.parents().iter().map(ObjectId::to_short_oid).collect::<Vec<_>>();
        text.push_str(&format!("Merge: {}\n", parents.join(" ")));
    }
    text.push_str(&format!("Author: {}\n", commit.author().display_name()));
    text.push_str(&format!("Date:   {}\n\n", commit.author().readable_timestamp()));
    for line in commit.message().lines() {
        text.push_str(&format!("    {line}\n"));
    }

    writeln!(writer, "{text}").map_err(io_error)
}

fn print_patch(patch: &FilePatch) {
    for line in patch.render().lines() {
        if line.starts_with("diff ") || line.starts_with("--- ") || line.starts_with("+++ ") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}

fn print_short_status(report: &StatusReport) {
    for (path, changes) in report.changes() {
        let mut code = [' ', ' '];
        for change in &changes {
            let mut chars = change.short_code().chars();
            if let (Some(index), Some(workspace)) = (chars.next(), chars.next()) {
                if index != ' ' {
                    code[0] = index;
                }
                if workspace != ' ' {
                    code[1] = workspace;
                }
            }
        }
        println!("{}{} {}", code[0], code[1], path.display());
    }
}

fn print_long_status(repository: &Repository, report: &StatusReport) -> surge::errors::Result<()> {
    match repository.refs().read_head_target()? {
        HeadTarget::Branch(branch) => println!("On branch {branch}"),
        HeadTarget::Detached(oid) => println!("HEAD detached at {}", oid.to_short_oid()),
    }
    if repository.refs().read_merge_head()?.is_some() {
        println!("You have unmerged paths.");
    }

    if report.is_clean() {
        println!("nothing to commit, working tree clean");
        return Ok(());
    }

    let section = |title: &str, entries: Vec<(FileChangeType, &PathBuf)>| {
        if entries.is_empty() {
            return;
        }
        println!("\n{title}");
        for (change, path) in entries {
            println!("{change}{}", path.display());
        }
    };

    section(
        "Unmerged paths:",
        report.conflicted.iter().map(|path| (FileChangeType::Conflicted, path)).collect(),
    );
    section(
        "Changes to be committed:",
        report
            .staged
            .iter()
            .map(|(path, change)| (FileChangeType::Index(*change), path))
            .collect(),
    );
    section(
        "Changes not staged for commit:",
        report
            .modified
            .iter()
            .map(|path| (FileChangeType::Workspace(WorkspaceChangeType::Modified), path))
            .chain(
                report
                    .deleted
                    .iter()
                    .map(|path| (FileChangeType::Workspace(WorkspaceChangeType::Deleted), path)),
            )
            .collect(),
    );
    section(
        "Untracked files:",
        report
            .untracked
            .iter()
            .map(|path| (FileChangeType::Workspace(WorkspaceChangeType::Untracked), path))
            .collect(),
    );

    Ok(())
}
