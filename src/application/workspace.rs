//! Startup bootstrap and read-modify-write helpers over the repositories.
//!
//! None of the helpers here lock across their read and write: two racing
//! toggles on the same record resolve as last write wins.

use crate::domain::{EntityKind, Folder, NewProject, Project, Prompt, StoreError, StoreResult};
use crate::infra::db::Database;

/// List projects, creating the default project first if the library is empty.
pub fn ensure_default_project(db: &Database) -> StoreResult<Vec<Project>> {
    let repo = db.project_repo();
    let projects = repo.list()?;
    if !projects.is_empty() {
        return Ok(projects);
    }

    let project = repo.create(&NewProject::default_project())?;
    log::info!("Created default project {}", project.id);
    Ok(vec![project])
}

pub fn toggle_folder_favorite(db: &Database, folder_id: &str) -> StoreResult<Folder> {
    let repo = db.folder_repo();
    let mut folder = repo
        .find_by_id(folder_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Folder, folder_id))?;
    folder.is_favorite = !folder.is_favorite;
    repo.update(&folder)?;
    Ok(folder)
}

pub fn rename_folder(db: &Database, folder_id: &str, name: &str) -> StoreResult<Folder> {
    let repo = db.folder_repo();
    let mut folder = repo
        .find_by_id(folder_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Folder, folder_id))?;
    folder.name = name.to_string();
    repo.update(&folder)?;
    Ok(folder)
}

pub fn toggle_prompt_favorite(db: &Database, prompt_id: &str) -> StoreResult<Prompt> {
    edit_prompt(db, prompt_id, |prompt| {
        prompt.is_favorite = !prompt.is_favorite
    })
}

/// Add a tag id to a prompt. Attaching an already attached tag changes nothing.
pub fn attach_tag(db: &Database, prompt_id: &str, tag_id: &str) -> StoreResult<Prompt> {
    edit_prompt(db, prompt_id, |prompt| {
        if !prompt.has_tag(tag_id) {
            prompt.tags.push(tag_id.to_string());
        }
    })
}

pub fn detach_tag(db: &Database, prompt_id: &str, tag_id: &str) -> StoreResult<Prompt> {
    edit_prompt(db, prompt_id, |prompt| prompt.tags.retain(|t| t != tag_id))
}

fn edit_prompt(
    db: &Database,
    prompt_id: &str,
    edit: impl FnOnce(&mut Prompt),
) -> StoreResult<Prompt> {
    let repo = db.prompt_repo();
    let mut prompt = repo
        .find_by_id(prompt_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Prompt, prompt_id))?;
    edit(&mut prompt);
    repo.update(&prompt)?;
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewFolder, NewPrompt, NewTag};

    #[test]
    fn test_default_project_created_once() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;

        let first = ensure_default_project(&db)?;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "My First Project");
        assert_eq!(first[0].description, "A default project");
        assert_eq!(first[0].color, "bg-blue-500");

        let second = ensure_default_project(&db)?;
        assert_eq!(second, first);
        assert_eq!(db.project_repo().list()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_existing_projects_suppress_default() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;
        db.project_repo()
            .create(&NewProject::new("Work", "Day job", "bg-red-500"))?;

        let projects = ensure_default_project(&db)?;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Work");
        Ok(())
    }

    #[test]
    fn test_toggle_folder_favorite() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;
        let project = db.project_repo().create(&NewProject::default_project())?;
        let folder = db
            .folder_repo()
            .create(&NewFolder::new(&project.id, "Drafts"))?;

        assert!(toggle_folder_favorite(&db, &folder.id)?.is_favorite);
        assert!(!toggle_folder_favorite(&db, &folder.id)?.is_favorite);

        let renamed = rename_folder(&db, &folder.id, "Ideas")?;
        assert_eq!(db.folder_repo().find_by_id(&folder.id)?, Some(renamed));

        let err = toggle_folder_favorite(&db, "missing").unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Folder,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_attach_and_detach_tags() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;
        let project = db.project_repo().create(&NewProject::default_project())?;
        let prompt = db
            .prompt_repo()
            .create(&NewPrompt::new(&project.id, "Summary", "Summarize this"))?;
        let tag = db.tag_repo().create(&NewTag::new("urgent", "red"))?;

        attach_tag(&db, &prompt.id, &tag.id)?;
        let tagged = attach_tag(&db, &prompt.id, &tag.id)?;
        assert_eq!(tagged.tags, vec![tag.id.clone()]);

        let stored = db.prompt_repo().find_by_id(&prompt.id)?.unwrap();
        assert_eq!(stored.tags, vec![tag.id.clone()]);
        assert_eq!(stored.versions.len(), 1);

        let untagged = detach_tag(&db, &prompt.id, &tag.id)?;
        assert!(untagged.tags.is_empty());

        let favorite = toggle_prompt_favorite(&db, &prompt.id)?;
        assert!(favorite.is_favorite);
        Ok(())
    }
}
