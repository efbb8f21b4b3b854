//! CRUD over the authenticated provider's patient sub-collection. Every
//! locator here is derived from the `ProviderContext` bound by the auth
//! middleware, so no request can reach another provider's data.

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::ProviderContext;
use crate::handlers::ApiError;
use crate::models::{
    CreatePatient, Pagination, ParseStatusError, Patient, PatientStatus, UpdatePatient,
};
use crate::store::{self, Document, StoreError};
use crate::validation::validate_date_of_birth;
use crate::AppState;

const DEFAULT_LIMIT: usize = 50;
const DEFAULT_ORDER_BY: &str = "lastName";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    status: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    order_by: Option<String>,
}

pub async fn create_patient(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
    Json(body): Json<CreatePatient>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let CreatePatient {
        first_name,
        middle_name,
        last_name,
        date_of_birth,
        status,
        address,
        profile_image_url,
    } = body;

    let (Some(first_name), Some(last_name), Some(date_of_birth), Some(status), Some(address)) =
        (first_name, last_name, date_of_birth, status, address)
    else {
        return Err(ApiError::InvalidInput("Missing required fields".into()));
    };
    if first_name.is_empty() || last_name.is_empty() || date_of_birth.is_empty() || status.is_empty()
    {
        return Err(ApiError::InvalidInput("Missing required fields".into()));
    }

    validate_date_of_birth(&date_of_birth).map_err(|e| ApiError::Validation(e.to_string()))?;
    let status: PatientStatus = status
        .parse()
        .map_err(|e: ParseStatusError| ApiError::Validation(e.to_string()))?;

    let now = Utc::now();
    let patient = Patient {
        first_name,
        middle_name,
        last_name,
        date_of_birth,
        status,
        address,
        profile_image_url,
        created_at: now,
        updated_at: now,
    };
    let doc = store::document_from(&patient)
        .map_err(|e| ApiError::internal("Failed to create patient", e))?;

    let id = state
        .store
        .add(&store::patients_collection(&ctx.provider_id), doc.clone())
        .await
        .map_err(|e| ApiError::internal("Failed to create patient", e))?;

    Ok((StatusCode::CREATED, Json(with_id(id, doc))))
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = params.offset.unwrap_or(0);
    let order_by = params
        .order_by
        .unwrap_or_else(|| DEFAULT_ORDER_BY.to_string());

    let mut query = store::Query::order_by(order_by).limit(limit).offset(offset);
    if let Some(status) = &params.status {
        // Stored statuses are uppercase; accept any casing on the filter too.
        query = query.filter("status", status.to_ascii_uppercase());
    }

    let rows = state
        .store
        .query(&store::patients_collection(&ctx.provider_id), query)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch patients", e))?;

    let count = rows.len();
    let patients: Vec<Value> = rows
        .into_iter()
        .map(|(id, doc)| with_id(id, doc))
        .collect();

    Ok(Json(json!({
        "patients": patients,
        "pagination": Pagination {
            limit,
            offset,
            count,
            has_more: count == limit,
        },
    })))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state
        .store
        .get(&store::patient_doc(&ctx.provider_id, &id))
        .await
    {
        Ok(Some(doc)) => Ok(Json(with_id(id, doc))),
        Ok(None) => Err(ApiError::NotFound("Patient not found".into())),
        Err(e) => Err(ApiError::internal("Failed to fetch patient", e)),
    }
}

pub async fn update_patient(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePatient>,
) -> Result<Json<Value>, ApiError> {
    if let Some(dob) = body.date_of_birth.as_deref() {
        validate_date_of_birth(dob).map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    let mut update = Document::new();
    if let Some(first_name) = body.first_name {
        update.insert("firstName".into(), json!(first_name));
    }
    if let Some(middle_name) = body.middle_name {
        // Explicit `null` clears the middle name
        update.insert("middleName".into(), json!(middle_name));
    }
    if let Some(last_name) = body.last_name {
        update.insert("lastName".into(), json!(last_name));
    }
    if let Some(date_of_birth) = body.date_of_birth {
        update.insert("dateOfBirth".into(), json!(date_of_birth));
    }
    if let Some(status) = body.status {
        let status: PatientStatus = status
            .parse()
            .map_err(|e: ParseStatusError| ApiError::Validation(e.to_string()))?;
        update.insert("status".into(), json!(status.as_str()));
    }
    if let Some(address) = body.address {
        let value = serde_json::to_value(address)
            .map_err(|e| ApiError::internal("Failed to update patient", e))?;
        update.insert("address".into(), value);
    }
    if let Some(profile_image_url) = body.profile_image_url {
        update.insert("profileImageUrl".into(), json!(profile_image_url));
    }
    update.insert("updatedAt".into(), json!(Utc::now()));

    match state
        .store
        .merge(&store::patient_doc(&ctx.provider_id, &id), update)
        .await
    {
        Ok(()) => Ok(Json(json!({ "message": "Patient updated successfully" }))),
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound("Patient not found".into())),
        Err(e) => Err(ApiError::internal("Failed to update patient", e)),
    }
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(ctx): Extension<ProviderContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete(&store::patient_doc(&ctx.provider_id, &id))
        .await
        .map_err(|e| ApiError::internal("Failed to delete patient", e))?;

    Ok(Json(json!({ "message": "Patient deleted successfully" })))
}

fn with_id(id: String, mut doc: Document) -> Value {
    doc.insert("id".into(), json!(id));
    Value::Object(doc)
}
