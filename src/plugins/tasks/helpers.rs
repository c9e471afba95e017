use super::errors::TasksError;
use super::types::{
    Task, TaskList, TasksData, MAX_DESCRIPTION_CHARS, MAX_LIST_NAME_CHARS, MAX_TITLE_CHARS,
};

pub fn find_list<'a>(data: &'a TasksData, id: &str) -> Option<&'a TaskList> {
    data.lists.iter().find(|list| list.id == id)
}

pub fn find_list_mut<'a>(data: &'a mut TasksData, id: &str) -> Option<&'a mut TaskList> {
    data.lists.iter_mut().find(|list| list.id == id)
}

/// Position of a task as `(list index, task index)`.
pub fn locate_task(data: &TasksData, id: &str) -> Option<(usize, usize)> {
    data.lists.iter().enumerate().find_map(|(list_index, list)| {
        list.tasks
            .iter()
            .position(|task| task.id == id)
            .map(|task_index| (list_index, task_index))
    })
}

pub fn find_task<'a>(data: &'a TasksData, id: &str) -> Option<&'a Task> {
    locate_task(data, id).map(|(l, t)| &data.lists[l].tasks[t])
}

pub fn find_task_mut<'a>(data: &'a mut TasksData, id: &str) -> Option<&'a mut Task> {
    let (l, t) = locate_task(data, id)?;
    Some(&mut data.lists[l].tasks[t])
}

fn check_length(value: &str, max: usize, field: &str) -> Result<(), TasksError> {
    let len = value.chars().count();
    if len > max {
        return Err(TasksError::validation(format!(
            "{} must be at most {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}

pub fn validate_list_name(name: &str) -> Result<String, TasksError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TasksError::validation("List name cannot be empty"));
    }
    check_length(name, MAX_LIST_NAME_CHARS, "List name")?;
    Ok(name.to_string())
}

pub fn validate_title(title: &str) -> Result<String, TasksError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TasksError::validation("Task title cannot be empty"));
    }
    check_length(title, MAX_TITLE_CHARS, "Task title")?;
    Ok(title.to_string())
}

/// Blank descriptions collapse to `None`.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, TasksError> {
    match description.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            check_length(text, MAX_DESCRIPTION_CHARS, "Task description")?;
            Ok(Some(text.to_string()))
        }
    }
}

pub fn validate_tag(tag: &str) -> Result<String, TasksError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(TasksError::validation("Tag cannot be empty"));
    }
    Ok(tag.to_string())
}

/// Trims tags, drops blanks and keeps the first occurrence of each.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !result.iter().any(|existing| existing == tag) {
            result.push(tag.to_string());
        }
    }
    result
}
