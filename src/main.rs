//! Promptvault CLI entry point.
//!
//! Drives the prompt library from a terminal: every subcommand maps onto one
//! repository or workspace operation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use promptvault::application::workspace;
use promptvault::domain::{
    ModelKind, ModelSettings, NewFolder, NewProject, NewPrompt, NewTag, Prompt,
};
use promptvault::infra::db::Database;

#[derive(Parser, Debug)]
#[command(name = "promptvault")]
#[command(version)]
#[command(
    about = "Local prompt library: projects, folders, versioned prompts and tags",
    long_about = None
)]
struct Args {
    /// Use this database file instead of the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage folders
    #[command(subcommand)]
    Folder(FolderCommand),
    /// Manage prompts and their versions
    #[command(subcommand)]
    Prompt(PromptCommand),
    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommand),
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// List projects (creates the default project in an empty library)
    List,
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "bg-blue-500")]
        color: String,
    },
    /// Delete a project with all of its folders, prompts and versions
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum FolderCommand {
    List {
        /// Only folders of this project
        #[arg(short, long)]
        project: Option<String>,
    },
    Create { project: String, name: String },
    /// Move a folder under another folder, or to the top level without --parent
    Move {
        id: String,
        #[arg(short, long)]
        parent: Option<String>,
    },
    Rename { id: String, name: String },
    Favorite { id: String },
    /// Delete a folder; its subfolders and prompts are kept
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum PromptCommand {
    List {
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long, conflicts_with = "project")]
        folder: Option<String>,
        /// Only prompts carrying this tag id
        #[arg(short, long)]
        tag: Option<String>,
    },
    Show { id: String },
    Create {
        project: String,
        title: String,
        content: String,
        #[arg(short, long)]
        folder: Option<String>,
        /// Tag id to attach; repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Record new content as the next version
    Edit {
        id: String,
        content: String,
        /// gemini-2.5-flash, gpt-4 or claude-3
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f64>,
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    Favorite { id: String },
    Tag { id: String, tag: String },
    Untag { id: String, tag: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    List,
    Create {
        name: String,
        #[arg(short, long, default_value = "gray")]
        color: String,
    },
    Delete { id: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let db = match args.db {
        Some(path) => {
            let config = promptvault::infra::app_config::load_config();
            Database::open_at(path.clone())
                .with_context(|| format!("Failed to open database at {}", path.display()))?
                .with_default_model(config.default_model)
        }
        None => Database::open().context("Failed to open database")?,
    };

    match args.command {
        Commands::Project(cmd) => run_project(&db, cmd),
        Commands::Folder(cmd) => run_folder(&db, cmd),
        Commands::Prompt(cmd) => run_prompt(&db, cmd),
        Commands::Tag(cmd) => run_tag(&db, cmd),
    }
}

fn run_project(db: &Database, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::List => {
            for project in workspace::ensure_default_project(db)? {
                println!(
                    "{}  {}  [{}]  {}",
                    project.id, project.name, project.color, project.description
                );
            }
        }
        ProjectCommand::Create {
            name,
            description,
            color,
        } => {
            let project = db
                .project_repo()
                .create(&NewProject::new(name, description, color))?;
            println!("{}", project.id);
        }
        ProjectCommand::Delete { id } => {
            let report = db
                .project_repo()
                .delete(&id)
                .with_context(|| format!("Failed to delete project {}", id))?;
            if report.is_empty() {
                println!("No project {}", id);
            } else {
                println!(
                    "Deleted project {} ({} folders, {} prompts, {} versions)",
                    id, report.folders, report.prompts, report.versions
                );
            }
        }
    }
    Ok(())
}

fn run_folder(db: &Database, cmd: FolderCommand) -> Result<()> {
    let repo = db.folder_repo();
    match cmd {
        FolderCommand::List { project } => {
            let folders = match project {
                Some(project_id) => repo.list_by_project(&project_id)?,
                None => repo.list_all()?,
            };
            for folder in folders {
                println!(
                    "{}  {}{}  project={} parent={}",
                    folder.id,
                    if folder.is_favorite { "* " } else { "" },
                    folder.name,
                    folder.project_id,
                    folder.parent_folder_id.as_deref().unwrap_or("-")
                );
            }
        }
        FolderCommand::Create { project, name } => {
            let folder = repo.create(&NewFolder::new(project, name))?;
            println!("{}", folder.id);
        }
        FolderCommand::Move { id, parent } => {
            repo.move_to(&id, parent.as_deref())?;
        }
        FolderCommand::Rename { id, name } => {
            workspace::rename_folder(db, &id, &name)?;
        }
        FolderCommand::Favorite { id } => {
            let folder = workspace::toggle_folder_favorite(db, &id)?;
            println!("favorite={}", folder.is_favorite);
        }
        FolderCommand::Delete { id } => {
            repo.delete(&id)?;
        }
    }
    Ok(())
}

fn run_prompt(db: &Database, cmd: PromptCommand) -> Result<()> {
    let repo = db.prompt_repo();
    match cmd {
        PromptCommand::List {
            project,
            folder,
            tag,
        } => {
            let prompts = match (project, folder) {
                (Some(project_id), _) => repo.list_by_project(&project_id)?,
                (None, Some(folder_id)) => repo.list_by_folder(&folder_id)?,
                (None, None) => repo.list_all()?,
            };
            for prompt in with_tag(prompts, tag.as_deref()) {
                let version = prompt.current_version().map_or(0, |v| v.version_number);
                println!(
                    "{}  {}{}  v{}",
                    prompt.id,
                    if prompt.is_favorite { "* " } else { "" },
                    prompt.title,
                    version
                );
            }
        }
        PromptCommand::Show { id } => {
            let prompt = repo
                .find_by_id(&id)?
                .with_context(|| format!("No prompt {}", id))?;
            print_prompt(&prompt);
        }
        PromptCommand::Create {
            project,
            title,
            content,
            folder,
            tags,
        } => {
            let mut new_prompt = NewPrompt::new(project, title, content).with_tags(tags);
            if let Some(folder_id) = folder {
                new_prompt = new_prompt.in_folder(folder_id);
            }
            let prompt = repo.create(&new_prompt)?;
            println!("{}", prompt.id);
        }
        PromptCommand::Edit {
            id,
            content,
            model,
            temperature,
            max_tokens,
        } => {
            let settings = if model.is_some() || temperature.is_some() || max_tokens.is_some() {
                let base = repo
                    .find_by_id(&id)?
                    .and_then(|p| p.current_version().map(|v| v.model_settings))
                    .unwrap_or_else(|| db.default_model());
                Some(ModelSettings {
                    model: match model {
                        Some(name) => ModelKind::from_str(&name).map_err(anyhow::Error::msg)?,
                        None => base.model,
                    },
                    temperature: temperature.unwrap_or(base.temperature),
                    max_tokens: max_tokens.unwrap_or(base.max_tokens),
                })
            } else {
                None
            };
            let prompt = repo.add_version(&id, &content, settings)?;
            println!("v{}", prompt.latest_version_number());
        }
        PromptCommand::Favorite { id } => {
            let prompt = workspace::toggle_prompt_favorite(db, &id)?;
            println!("favorite={}", prompt.is_favorite);
        }
        PromptCommand::Tag { id, tag } => {
            workspace::attach_tag(db, &id, &tag)?;
        }
        PromptCommand::Untag { id, tag } => {
            workspace::detach_tag(db, &id, &tag)?;
        }
        PromptCommand::Delete { id } => {
            repo.delete(&id)?;
        }
    }
    Ok(())
}

fn run_tag(db: &Database, cmd: TagCommand) -> Result<()> {
    let repo = db.tag_repo();
    match cmd {
        TagCommand::List => {
            for tag in repo.list_all()? {
                println!("{}  {}  [{}]", tag.id, tag.name, tag.color);
            }
        }
        TagCommand::Create { name, color } => {
            let tag = repo.create(&NewTag::new(name, color))?;
            println!("{}", tag.id);
        }
        TagCommand::Delete { id } => {
            repo.delete(&id)?;
        }
    }
    Ok(())
}

/// Keep the prompts carrying `tag`, or all of them when no tag is given.
fn with_tag(prompts: Vec<Prompt>, tag: Option<&str>) -> Vec<Prompt> {
    match tag {
        Some(tag_id) => prompts.into_iter().filter(|p| p.has_tag(tag_id)).collect(),
        None => prompts,
    }
}

fn print_prompt(prompt: &Prompt) {
    println!("{}  {}", prompt.id, prompt.title);
    println!("  project: {}", prompt.project_id);
    println!("  folder:  {}", prompt.folder_id.as_deref().unwrap_or("-"));
    println!("  tags:    {}", prompt.tags.join(", "));
    println!("  created: {}", prompt.created_at);
    for version in &prompt.versions {
        let marker = if version.id == prompt.current_version_id {
            "*"
        } else {
            " "
        };
        println!(
            "{} v{} [{} t={} max={}] {}",
            marker,
            version.version_number,
            version.model_settings.model,
            version.model_settings.temperature,
            version.model_settings.max_tokens,
            version.created_at
        );
        for line in version.content.lines() {
            println!("    {}", line);
        }
    }
}
