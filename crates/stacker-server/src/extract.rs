//! Body extractors accepting both form and JSON submissions.

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use stacker_core::CoreError;
use stacker_model::Patch;

use crate::error::ServerError;

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// A request body decoded from `application/x-www-form-urlencoded` or JSON,
/// depending on the content type. Anything that is not a form is read as JSON.
#[derive(Debug)]
pub struct Input<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Input<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// A sparse field patch. Form bodies keep repeated keys as multiple values;
/// JSON bodies must be a single object.
#[derive(Debug)]
pub struct PatchBody(pub Patch);

#[async_trait]
impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Input(pairs) = Input::<Vec<(String, String)>>::from_request(req, state).await?;
            Ok(Self(Patch::from_pairs(pairs)))
        } else {
            let Input(object) = Input::<Map<String, Value>>::from_request(req, state).await?;
            let patch = Patch::from_json(&object).map_err(CoreError::from)?;
            Ok(Self(patch))
        }
    }
}
