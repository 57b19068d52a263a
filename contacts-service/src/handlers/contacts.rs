//! HTTP binding for the contacts resource.
//!
//! Handlers only shape bodies; every datastore decision lives in
//! [`ContactsRepository`](crate::repository::ContactsRepository).

use crate::dtos::{contact_resource, DataEnvelope};
use crate::repository::strip_identifiers;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::Document;
use serde_json::Value;
use service_core::error::AppError;

/// Turn a request body into contact attributes. Identifier fields are dropped.
///
/// Attribute names are plain top-level fields: a leading `$` would be read by
/// MongoDB as an operator and a `.` as a nested path, so both are rejected.
fn into_attributes(body: Value) -> Result<Document, AppError> {
    let Value::Object(map) = body else {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Request body must be a JSON object"
        )));
    };

    if let Some(key) = map
        .keys()
        .find(|key| key.starts_with('$') || key.contains('.'))
    {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid attribute name '{}': names may not start with '$' or contain '.'",
            key
        )));
    }

    let mut document = mongodb::bson::to_document(&map).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Invalid contact attributes: {}", e))
    })?;
    strip_identifiers(&mut document);
    Ok(document)
}

pub async fn list_contacts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let contacts = state.repository.list().await?;
    let resources: Vec<_> = contacts.into_iter().map(contact_resource).collect();
    Ok(Json(DataEnvelope::new(resources)))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let attributes = into_attributes(body)?;
    let contact = state.repository.create(attributes).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataEnvelope::new(contact_resource(contact))),
    ))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let contact = state.repository.get(&contact_id).await?;
    Ok(Json(DataEnvelope::new(contact_resource(contact))))
}

/// PATCH: attributes not in the body are left untouched.
pub async fn update_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let attributes = into_attributes(body)?;
    let contact = state.repository.update(&contact_id, attributes).await?;
    Ok(Json(DataEnvelope::new(contact_resource(contact))))
}

/// PUT: the body becomes the complete attribute set.
pub async fn replace_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let attributes = into_attributes(body)?;
    let contact = state.repository.replace(&contact_id, attributes).await?;
    Ok(Json(DataEnvelope::new(contact_resource(contact))))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.repository.delete(&contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
