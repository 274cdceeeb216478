//! Create-request bodies, patch bodies and their boundary checks.
//!
//! Missing text fields deserialize as empty so that they are reported per
//! field alongside every other problem, rather than as a decode failure.
//! Patches are checked only on the text fields they actually carry.

use std::collections::BTreeMap;

use serde::Deserialize;
use stacker_model::Patch;
use stacker_types::task::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use stacker_types::user::{MAX_FULL_NAME_LEN, MAX_USERNAME_LEN};
use stacker_types::{EntityId, Task, User};

use crate::error::{ServerError, ServerResult};

#[derive(Debug, Default)]
struct Violations(BTreeMap<String, String>);

impl Violations {
    fn text(&mut self, field: &str, value: &str, max: usize, required: bool) {
        let len = value.chars().count();
        if required && value.trim().is_empty() {
            self.add(field, "is required");
        } else if len > max {
            self.add(field, format!("must be at most {max} characters (got {len})"));
        }
    }

    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    fn finish<T>(self, value: T) -> ServerResult<T> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ServerError::Validation(self.0))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
}

impl CreateUserRequest {
    pub fn into_user(self) -> ServerResult<User> {
        let mut v = Violations::default();
        v.text("fullName", &self.full_name, MAX_FULL_NAME_LEN, true);
        v.text("username", &self.username, MAX_USERNAME_LEN, true);
        v.finish(User::new(self.full_name, self.username))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub accepted: Option<bool>,
}

impl CreateTaskRequest {
    pub fn into_task(self) -> ServerResult<Task> {
        let mut v = Violations::default();
        v.text("title", &self.title, MAX_TITLE_LEN, true);
        v.text("description", &self.description, MAX_DESCRIPTION_LEN, false);
        let owner_id = if self.owner_id.is_empty() {
            v.add("ownerId", "is required");
            None
        } else {
            match EntityId::parse(&self.owner_id) {
                Ok(id) => Some(id),
                Err(e) => {
                    v.add("ownerId", e.to_string());
                    None
                }
            }
        };
        match owner_id {
            Some(owner_id) => {
                let mut task = Task::new(self.title, self.description, owner_id)
                    .with_accepted(self.accepted.unwrap_or(false));
                if let Some(p) = self.priority {
                    task = task.with_priority(p);
                }
                v.finish(task)
            }
            None => Err(ServerError::Validation(v.0)),
        }
    }
}

/// `(field, max chars, required)` for each bounded text field.
type TextRule = (&'static str, usize, bool);

const USER_TEXT: &[TextRule] = &[
    ("fullName", MAX_FULL_NAME_LEN, true),
    ("username", MAX_USERNAME_LEN, true),
];

const TASK_TEXT: &[TextRule] = &[
    ("title", MAX_TITLE_LEN, true),
    ("description", MAX_DESCRIPTION_LEN, false),
];

fn check_patch(patch: &Patch, rules: &[TextRule]) -> ServerResult<()> {
    let mut v = Violations::default();
    for &(field, max, required) in rules {
        for value in patch.get(field).unwrap_or_default() {
            v.text(field, value, max, required);
        }
    }
    v.finish(())
}

/// Apply the create-time text limits to a user patch.
pub fn check_user_patch(patch: &Patch) -> ServerResult<()> {
    check_patch(patch, USER_TEXT)
}

/// Apply the create-time text limits to a task patch.
pub fn check_task_patch(patch: &Patch) -> ServerResult<()> {
    check_patch(patch, TASK_TEXT)
}
