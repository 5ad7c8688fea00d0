//! Task command handlers.
//!
//! Each handler is one pass through the synchronizer: register the
//! operation on the board, dispatch it, apply the completion event, and
//! render the reconciled state.

use anyhow::Result;
use taskdeck_core::api::ApiClient;
use taskdeck_core::auth::{self, TokenStore};
use taskdeck_core::config::Config;
use taskdeck_core::session::Route;
use taskdeck_core::tasks::{OpKind, Priority, SyncOutcome, Task, TaskBoard, ops};

/// Arguments for `tasks add`.
pub struct AddArgs {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: String,
}

/// Arguments for `tasks edit`; unset fields keep their current value.
pub struct EditArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// Route gate for the protected task surface.
fn require_tasks_route() -> Result<()> {
    let store = TokenStore::new();
    match Route::resolve(Some(Route::Tasks), auth::is_authenticated(&store)) {
        Route::Tasks => Ok(()),
        _ => anyhow::bail!("Not signed in. Run `taskdeck login` first."),
    }
}

fn parse_priority(value: &str) -> Result<Priority> {
    value.parse::<Priority>().map_err(|e| anyhow::anyhow!(e))
}

/// Loads the board from the server, or bails with the appropriate notice.
async fn load_board(client: &ApiClient) -> Result<TaskBoard> {
    let mut board = TaskBoard::new();
    let ticket = board.begin(OpKind::Load);
    let event = ops::load(client, &ticket).await;
    match board.apply(event) {
        SyncOutcome::Applied => Ok(board),
        SyncOutcome::SessionExpired => bail_session_expired(),
        SyncOutcome::Failed(f) => anyhow::bail!("Failed to load tasks: {f}"),
        SyncOutcome::Stale => unreachable!("single-shot load cannot be superseded"),
    }
}

fn bail_session_expired<T>() -> Result<T> {
    // The fetch layer already cleared the credential.
    anyhow::bail!("Session expired. Please sign in again with `taskdeck login`.")
}

fn render_task(task: &Task) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{:>4}  {} {:<6} {}",
        task.id, mark, task.priority, task.title
    );
    if !task.description.is_empty() {
        line.push_str(&format!(" - {}", task.description));
    }
    line
}

pub async fn list(config: &Config, json: bool) -> Result<()> {
    require_tasks_route()?;
    let client = super::api_client(config)?;
    let board = load_board(&client).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(board.tasks())?);
        return Ok(());
    }

    if board.tasks().is_empty() {
        println!("No tasks yet.");
        return Ok(());
    }

    for task in board.tasks() {
        println!("{}", render_task(task));
    }
    let completed = board.tasks().iter().filter(|t| t.completed).count();
    println!("{} tasks, {completed} completed", board.tasks().len());
    Ok(())
}

pub async fn add(config: &Config, args: AddArgs) -> Result<()> {
    require_tasks_route()?;
    let client = super::api_client(config)?;
    let priority = parse_priority(&args.priority)?;

    let mut board = TaskBoard::new();
    board.open_editor(None);
    {
        let draft = board
            .draft_mut()
            .expect("editor was just opened");
        draft.title = args.title;
        draft.description = args.description;
        draft.completed = args.completed;
        draft.priority = priority;
    }

    let Some(save) = board.begin_save() else {
        anyhow::bail!("Nothing to save: title and description are both empty.");
    };

    let event = ops::save(&client, &save).await;
    match board.apply(event) {
        SyncOutcome::Applied => {
            let task = board.tasks().last().expect("create appended an entry");
            println!("Created task {}.", task.id);
            Ok(())
        }
        SyncOutcome::SessionExpired => bail_session_expired(),
        SyncOutcome::Failed(f) => anyhow::bail!("Failed to create task: {f}"),
        SyncOutcome::Stale => unreachable!("single-shot create cannot be superseded"),
    }
}

pub async fn edit(config: &Config, id: i64, args: EditArgs) -> Result<()> {
    require_tasks_route()?;
    let client = super::api_client(config)?;
    let priority = args.priority.as_deref().map(parse_priority).transpose()?;

    let mut board = load_board(&client).await?;
    let Some(existing) = board.tasks().iter().find(|t| t.id == id).cloned() else {
        anyhow::bail!("Task {id} not found.");
    };

    board.open_editor(Some(&existing));
    {
        let draft = board.draft_mut().expect("editor was just opened");
        if let Some(title) = args.title {
            draft.title = title;
        }
        if let Some(description) = args.description {
            draft.description = description;
        }
        if let Some(completed) = args.completed {
            draft.completed = completed;
        }
        if let Some(priority) = priority {
            draft.priority = priority;
        }
    }

    let Some(save) = board.begin_save() else {
        anyhow::bail!("Nothing to save: title and description are both empty.");
    };

    let event = ops::save(&client, &save).await;
    match board.apply(event) {
        SyncOutcome::Applied => {
            let task = board
                .tasks()
                .iter()
                .find(|t| t.id == id)
                .expect("updated entry stays in the list");
            println!("Updated task {}.", task.id);
            println!("{}", render_task(task));
            Ok(())
        }
        SyncOutcome::SessionExpired => bail_session_expired(),
        SyncOutcome::Failed(f) => anyhow::bail!("Failed to update task {id}: {f}"),
        SyncOutcome::Stale => unreachable!("single-shot update cannot be superseded"),
    }
}

pub async fn done(config: &Config, id: i64) -> Result<()> {
    edit(
        config,
        id,
        EditArgs {
            title: None,
            description: None,
            completed: Some(true),
            priority: None,
        },
    )
    .await
}

pub async fn rm(config: &Config, id: i64) -> Result<()> {
    require_tasks_route()?;
    let client = super::api_client(config)?;

    let mut board = load_board(&client).await?;
    if !board.tasks().iter().any(|t| t.id == id) {
        anyhow::bail!("Task {id} not found.");
    }

    let ticket = board.begin(OpKind::Delete);
    let event = ops::delete(&client, &ticket, id).await;
    match board.apply(event) {
        SyncOutcome::Applied => {
            println!("Deleted task {id}.");
            Ok(())
        }
        SyncOutcome::SessionExpired => bail_session_expired(),
        SyncOutcome::Failed(f) => anyhow::bail!("Failed to delete task {id}: {f}"),
        SyncOutcome::Stale => unreachable!("single-shot delete cannot be superseded"),
    }
}
