use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::api::rest::{outcome, required, ALL_FIELDS_REQUIRED};
use crate::error::AppError;
use crate::models::cab::{Cab, CabUpdate};
use crate::models::lenient;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cabs", get(list_cabs))
        .route("/add-cab", post(add_cab))
        .route("/edit-cab", post(edit_cab))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabRequest {
    pub registration_number: Option<String>,
    pub driver_name: Option<String>,
    pub driver_license_number: Option<String>,
    #[serde(rename = "type")]
    pub cab_type: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub contact: Option<String>,
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_whole_number")]
    pub capacity: Option<u32>,
}

impl CabRequest {
    pub fn validate(self) -> Result<CabUpdate, AppError> {
        let fields = (
            required(self.registration_number),
            required(self.driver_name),
            required(self.driver_license_number),
            required(self.cab_type),
            required(self.model),
            required(self.contact),
            self.capacity.filter(|capacity| *capacity != 0),
        );

        match fields {
            (
                Some(registration_number),
                Some(driver_name),
                Some(driver_license_number),
                Some(cab_type),
                Some(model),
                Some(contact),
                Some(capacity),
            ) => Ok(CabUpdate {
                registration_number,
                driver_name,
                driver_license_number,
                cab_type,
                model,
                contact,
                available: self.available,
                capacity,
            }),
            _ => Err(AppError::BadRequest(ALL_FIELDS_REQUIRED.to_string())),
        }
    }
}

async fn list_cabs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Cab>>, AppError> {
    let cabs = state.store.list_cabs().await?;
    Ok(Json(cabs))
}

async fn add_cab(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CabRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Cab>), AppError> {
    let result = create_cab(&state, payload).await;
    state.metrics.record_write("cab", "add", outcome(&result));
    result
}

async fn create_cab(
    state: &AppState,
    payload: Result<Json<CabRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Cab>), AppError> {
    let Json(payload) = payload?;
    let cab = Cab::from(payload.validate()?);

    state.store.insert_cab(&cab).await?;
    info!(registration_number = %cab.registration_number, "cab created");

    Ok((StatusCode::CREATED, Json(cab)))
}

async fn edit_cab(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CabRequest>, JsonRejection>,
) -> Result<Json<Cab>, AppError> {
    let result = update_cab(&state, payload).await;
    state.metrics.record_write("cab", "edit", outcome(&result));
    result
}

async fn update_cab(
    state: &AppState,
    payload: Result<Json<CabRequest>, JsonRejection>,
) -> Result<Json<Cab>, AppError> {
    let Json(payload) = payload?;
    let update = payload.validate()?;

    let registration_number = update.registration_number.clone();
    let updated = state
        .store
        .update_cab(update)
        .await?
        .ok_or_else(|| AppError::NotFound("Cab not found".to_string()))?;
    info!(registration_number = %registration_number, "cab updated");

    Ok(Json(updated))
}
