//! Mutation core for lists and tasks.
//!
//! Every command checks its inputs before touching `data`, so a command that
//! returns an error leaves the collection exactly as it found it.

use super::errors::TasksError;
use super::helpers::{
    find_list_mut, find_task_mut, locate_task, normalize_tags, validate_description,
    validate_list_name, validate_tag, validate_title,
};
use super::types::*;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn new_list(name: String) -> TaskList {
    TaskList {
        id: new_id(),
        name,
        tasks: Vec::new(),
    }
}

/// The list an empty store is seeded with.
pub fn default_list() -> TaskList {
    new_list(DEFAULT_LIST_NAME.to_string())
}

pub fn list_create(data: &mut TasksData, name: &str) -> Result<TaskList, TasksError> {
    let name = validate_list_name(name)?;
    let list = new_list(name);

    data.lists.push(list.clone());
    tracing::info!(target: "tasks", list_id = %list.id, "List created: {}", list.name);

    Ok(list)
}

pub fn list_rename(data: &mut TasksData, id: &str, name: &str) -> Result<(), TasksError> {
    let list = find_list_mut(data, id).ok_or_else(|| TasksError::list_not_found(id))?;
    list.name = validate_list_name(name)?;
    tracing::info!(target: "tasks", list_id = %id, "List renamed: {}", list.name);

    Ok(())
}

/// Removes the list together with every task it owns.
pub fn list_delete(data: &mut TasksData, id: &str) -> Result<TaskList, TasksError> {
    let index = data
        .lists
        .iter()
        .position(|l| l.id == id)
        .ok_or_else(|| TasksError::list_not_found(id))?;

    let removed = data.lists.remove(index);
    tracing::info!(
        target: "tasks",
        list_id = %id,
        tasks_removed = removed.tasks.len(),
        "List deleted: {}",
        removed.name
    );

    Ok(removed)
}

pub fn task_create(
    data: &mut TasksData,
    list_id: &str,
    input: NewTask,
) -> Result<Task, TasksError> {
    let list = find_list_mut(data, list_id).ok_or_else(|| TasksError::list_not_found(list_id))?;

    let title = validate_title(&input.title)?;
    let description = validate_description(input.description.as_deref())?;

    let task = Task {
        id: new_id(),
        title,
        description,
        due_date: input.due_date,
        completed: false,
        priority: input.priority,
        tags: normalize_tags(&input.tags),
        list_id: list.id.clone(),
    };

    list.tasks.push(task.clone());
    tracing::info!(target: "tasks", task_id = %task.id, list_id = %list_id, "Task created");

    Ok(task)
}

/// Applies `patch` in a single pass. A `list_id` naming another list moves
/// the task to the end of that list; the other fields land in the same step.
pub fn task_update(data: &mut TasksData, id: &str, patch: TaskPatch) -> Result<Task, TasksError> {
    let (list_index, task_index) =
        locate_task(data, id).ok_or_else(|| TasksError::task_not_found(id))?;

    let target_index = match patch.list_id.as_deref() {
        Some(target) if target != data.lists[list_index].id => Some(
            data.lists
                .iter()
                .position(|l| l.id == target)
                .ok_or_else(|| TasksError::list_not_found(target))?,
        ),
        _ => None,
    };

    let title = patch.title.as_deref().map(validate_title).transpose()?;
    let description = patch
        .description
        .as_ref()
        .map(|d| validate_description(d.as_deref()))
        .transpose()?;

    // Nothing below can fail.
    let mut task = data.lists[list_index].tasks.remove(task_index);

    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = description {
        task.description = description;
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = due_date;
    }
    if let Some(completed) = patch.completed {
        task.completed = completed;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(tags) = patch.tags {
        task.tags = normalize_tags(&tags);
    }

    match target_index {
        Some(target_index) => {
            let target = &mut data.lists[target_index];
            task.list_id = target.id.clone();
            target.tasks.push(task.clone());
            tracing::info!(
                target: "tasks",
                task_id = %id,
                from = %data.lists[list_index].id,
                to = %task.list_id,
                "Task moved"
            );
        }
        None => {
            data.lists[list_index].tasks.insert(task_index, task.clone());
            tracing::info!(target: "tasks", task_id = %id, "Task updated");
        }
    }

    Ok(task)
}

/// Flips `completed` and returns the new value.
pub fn task_toggle_complete(data: &mut TasksData, id: &str) -> Result<bool, TasksError> {
    let task = find_task_mut(data, id).ok_or_else(|| TasksError::task_not_found(id))?;

    task.completed = !task.completed;
    tracing::debug!(target: "tasks", task_id = %id, completed = task.completed, "Task toggled");

    Ok(task.completed)
}

pub fn task_delete(data: &mut TasksData, id: &str) -> Result<Task, TasksError> {
    let (list_index, task_index) =
        locate_task(data, id).ok_or_else(|| TasksError::task_not_found(id))?;

    let removed = data.lists[list_index].tasks.remove(task_index);
    tracing::info!(target: "tasks", task_id = %id, "Task deleted");

    Ok(removed)
}

/// Returns `false` when the exact tag was already present.
pub fn task_add_tag(data: &mut TasksData, id: &str, tag: &str) -> Result<bool, TasksError> {
    let tag = validate_tag(tag)?;
    let task = find_task_mut(data, id).ok_or_else(|| TasksError::task_not_found(id))?;

    if task.tags.contains(&tag) {
        return Ok(false);
    }

    tracing::debug!(target: "tasks", task_id = %id, "Tag added: {}", tag);
    task.tags.push(tag);
    Ok(true)
}

/// Returns `false` when the tag was not on the task.
pub fn task_remove_tag(data: &mut TasksData, id: &str, tag: &str) -> Result<bool, TasksError> {
    let task = find_task_mut(data, id).ok_or_else(|| TasksError::task_not_found(id))?;

    let before = task.tags.len();
    task.tags.retain(|t| t != tag);
    let removed = task.tags.len() != before;

    if removed {
        tracing::debug!(target: "tasks", task_id = %id, "Tag removed: {}", tag);
    }
    Ok(removed)
}
