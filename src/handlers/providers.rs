//! The authenticated provider's own profile. The record is keyed by the
//! verified subject id, so there is no id parameter anywhere on this
//! surface.

use axum::extract::{Extension, State};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::auth::ProviderContext;
use crate::handlers::ApiError;
use crate::models::UpdateProvider;
use crate::store::{self, Document, StoreError};
use crate::validation::is_valid_email;
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
) -> Result<Json<Value>, ApiError> {
    match state.store.get(&store::provider_doc(&ctx.provider_id)).await {
        Ok(Some(doc)) => Ok(Json(Value::Object(doc))),
        // Expected only before the signup trigger has materialized the record
        Ok(None) => Err(ApiError::NotFound("Provider not found".into())),
        Err(e) => Err(ApiError::internal("Failed to fetch provider", e)),
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
    Json(body): Json<UpdateProvider>,
) -> Result<Json<Value>, ApiError> {
    if let Some(email) = body.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::Validation("Invalid email address".into()));
        }
    }

    let mut update = Document::new();
    if let Some(name) = body.name {
        update.insert("name".into(), json!(name));
    }
    if let Some(email) = body.email {
        update.insert("email".into(), json!(email));
    }
    if let Some(contact_info) = body.contact_info {
        update.insert("contactInfo".into(), contact_info);
    }
    if let Some(profile_image_url) = body.profile_image_url {
        update.insert("profileImageUrl".into(), json!(profile_image_url));
    }
    update.insert("updatedAt".into(), json!(Utc::now()));

    match state
        .store
        .merge(&store::provider_doc(&ctx.provider_id), update)
        .await
    {
        Ok(()) => Ok(Json(json!({ "message": "Provider updated successfully" }))),
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound("Provider not found".into())),
        Err(e) => Err(ApiError::internal("Failed to update provider", e)),
    }
}
