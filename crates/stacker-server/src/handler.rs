use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use stacker_core::CoreError;
use stacker_model::ModelSchema;
use stacker_types::{EntityId, Task, User};

use crate::envelope::JSendResponse;
use crate::error::ServerResult;
use crate::extract::{Input, PatchBody};
use crate::state::AppState;
use crate::validate::{check_task_patch, check_user_patch, CreateTaskRequest, CreateUserRequest};

type Reply<T> = ServerResult<Json<JSendResponse<T>>>;
type Created<T> = ServerResult<(StatusCode, Json<JSendResponse<T>>)>;

fn reply<T: Serialize>(name: &'static str, value: T) -> Json<JSendResponse<T>> {
    Json(JSendResponse::success(name, value))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<JSendResponse<Health>> {
    reply(
        "health",
        Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

pub async fn schema(State(state): State<AppState>, Path(kind): Path<String>) -> Reply<ModelSchema> {
    let schema = state
        .stacker()
        .registry()
        .schema_named(&kind)
        .map_err(CoreError::from)?
        .clone();
    Ok(reply("schema", schema))
}

pub async fn create_user(
    State(state): State<AppState>,
    Input(body): Input<CreateUserRequest>,
) -> Created<User> {
    let user = body.into_user()?;
    let user = state.call(move |s| s.create_user(user)).await?;
    Ok((StatusCode::CREATED, reply("user", user)))
}

pub async fn list_users(State(state): State<AppState>) -> Reply<Vec<User>> {
    let users = state.call(|s| s.list_users()).await?;
    Ok(reply("users", users))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Reply<User> {
    let id = EntityId::parse(&id)?;
    let user = state.call(move |s| s.get_user(&id)).await?;
    Ok(reply("user", user))
}

pub async fn user_tasks(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Task>> {
    let id = EntityId::parse(&id)?;
    let tasks = state.call(move |s| s.get_tasks_for_user(&id)).await?;
    Ok(reply("tasks", tasks))
}

pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Reply<User> {
    let id = EntityId::parse(&id)?;
    check_user_patch(&patch)?;
    let user = state.call(move |s| s.patch_user(&id, &patch)).await?;
    Ok(reply("user", user))
}

pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Reply<bool> {
    let id = EntityId::parse(&id)?;
    let deleted = state.call(move |s| s.delete_user(&id)).await?;
    Ok(reply("deleted", deleted))
}

pub async fn create_task(
    State(state): State<AppState>,
    Input(body): Input<CreateTaskRequest>,
) -> Created<Task> {
    let task = body.into_task()?;
    let task = state.call(move |s| s.create_task(task)).await?;
    Ok((StatusCode::CREATED, reply("task", task)))
}

pub async fn list_tasks(State(state): State<AppState>) -> Reply<Vec<Task>> {
    let tasks = state.call(|s| s.list_tasks()).await?;
    Ok(reply("tasks", tasks))
}

pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Task> {
    let id = EntityId::parse(&id)?;
    let task = state.call(move |s| s.get_task(&id)).await?;
    Ok(reply("task", task))
}

pub async fn patch_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Reply<Task> {
    let id = EntityId::parse(&id)?;
    check_task_patch(&patch)?;
    let task = state.call(move |s| s.patch_task(&id, &patch)).await?;
    Ok(reply("task", task))
}

pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> Reply<bool> {
    let id = EntityId::parse(&id)?;
    let deleted = state.call(move |s| s.delete_task(&id)).await?;
    Ok(reply("deleted", deleted))
}
