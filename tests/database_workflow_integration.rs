//! Integration tests for the database functionality
//! These tests verify that the repositories and workspace helpers work together correctly

use promptvault::application::workspace;
use promptvault::domain::{NewFolder, NewProject, NewPrompt, NewTag};
use promptvault::infra::db::Database;
use tempfile::tempdir;

fn shared_address() -> promptvault::domain::StoreResult<usize> {
    Database::shared().map(|db| db as *const Database as usize)
}

#[test]
fn test_full_database_workflow() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;

    let p1 = db
        .project_repo()
        .create(&NewProject::new("P1", "Scenario project", "bg-blue-500"))?;
    let f1 = db.folder_repo().create(&NewFolder::new(&p1.id, "F1"))?;
    let r1 = db
        .prompt_repo()
        .create(&NewPrompt::new(&p1.id, "R1", "hello").in_folder(&f1.id))?;
    let t1 = db.tag_repo().create(&NewTag::new("urgent", "red"))?;
    workspace::attach_tag(&db, &r1.id, &t1.id)?;

    assert_eq!(db.folder_repo().list_by_project(&p1.id)?, vec![f1.clone()]);
    let prompts = db.prompt_repo().list_by_project(&p1.id)?;
    assert_eq!(prompts.len(), 1);
    let stored = &prompts[0];
    assert_eq!(stored.id, r1.id);
    assert!(stored.tags.contains(&t1.id));
    assert_eq!(stored.versions.len(), 1);
    assert_eq!(stored.versions[0].content, "hello");

    let report = db.project_repo().delete(&p1.id)?;
    assert_eq!(report.projects, 1);
    assert_eq!(report.folders, 1);
    assert_eq!(report.prompts, 1);
    assert_eq!(report.versions, 1);

    assert!(db.project_repo().list()?.iter().all(|p| p.id != p1.id));
    assert!(db.folder_repo().list_by_project(&p1.id)?.is_empty());
    assert!(db.prompt_repo().list_by_project(&p1.id)?.is_empty());
    assert!(db.prompt_repo().list_by_folder(&f1.id)?.is_empty());
    assert!(db.version_repo().list_by_prompt(&r1.id)?.is_empty());

    // Tags are labels, not owned records.
    assert_eq!(db.tag_repo().find_by_id(&t1.id)?, Some(t1));

    // A second delete changes nothing and does not fail.
    assert!(db.project_repo().delete(&p1.id)?.is_empty());

    Ok(())
}

#[test]
fn test_versions_survive_reopen() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("library").join("db.sqlite");

    let (project_id, prompt_id) = {
        let db = Database::open_at(path.clone())?;
        let project = workspace::ensure_default_project(&db)?.remove(0);
        let prompt = db
            .prompt_repo()
            .create(&NewPrompt::new(&project.id, "Review", "Review this diff"))?;
        db.prompt_repo()
            .add_version(&prompt.id, "Review this diff carefully", None)?;
        (project.id, prompt.id)
    };

    let db = Database::open_at(path)?;
    assert_eq!(workspace::ensure_default_project(&db)?.len(), 1);

    let prompt = db
        .prompt_repo()
        .find_by_id(&prompt_id)?
        .expect("prompt persisted");
    assert_eq!(prompt.project_id, project_id);
    assert_eq!(prompt.versions.len(), 2);
    let current = prompt.current_version().expect("current version");
    assert_eq!(current.version_number, 2);
    assert_eq!(current.content, "Review this diff carefully");
    Ok(())
}

#[test]
fn test_shared_handle_is_reused() -> anyhow::Result<()> {
    let dir = tempdir()?;
    // Only this test touches the process-wide handle, so setting the path here is safe.
    unsafe {
        std::env::set_var("PROMPTVAULT_DB_PATH", dir.path().join("shared.sqlite"));
    }

    let handles: Vec<usize> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4).map(|_| scope.spawn(shared_address)).collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("worker panicked"))
            .collect::<Result<Vec<_>, _>>()
    })?;

    assert!(handles.windows(2).all(|pair| pair[0] == pair[1]));

    let db = Database::shared()?;
    db.project_repo()
        .create(&NewProject::new("Shared", "", ""))?;
    assert_eq!(db.project_repo().list()?.len(), 1);

    unsafe {
        std::env::remove_var("PROMPTVAULT_DB_PATH");
    }
    Ok(())
}
