use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::rest::{outcome, required, ALL_FIELDS_REQUIRED};
use crate::error::AppError;
use crate::models::employee::{Employee, GeoCode};
use crate::models::lenient;
use crate::state::AppState;
use crate::store::DeleteResult;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/add-employee", post(add_employee))
        .route("/edit-employee", post(edit_employee))
        .route("/delete-employee", post(delete_employee))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub employee_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_whole_number")]
    pub contact: Option<i64>,
    pub designation: Option<String>,
    pub address: Option<String>,
}

impl EmployeeRequest {
    /// Builds the record to store, without a geocode yet.
    pub fn validate(self) -> Result<Employee, AppError> {
        let fields = (
            required(self.employee_id),
            required(self.name),
            required(self.email),
            self.contact.filter(|contact| *contact != 0),
            required(self.address),
        );

        match fields {
            (Some(employee_id), Some(name), Some(email), Some(contact), Some(address)) => {
                Ok(Employee {
                    employee_id,
                    name,
                    email,
                    contact,
                    designation: required(self.designation),
                    address,
                    geo_code: None,
                })
            }
            _ => Err(AppError::BadRequest(ALL_FIELDS_REQUIRED.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEmployeeRequest {
    pub employee_id: Option<String>,
}

async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = state.store.list_employees().await?;
    Ok(Json(employees))
}

async fn add_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let result = create_employee(&state, payload).await;
    state.metrics.record_write("employee", "add", outcome(&result));
    result
}

async fn create_employee(
    state: &AppState,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let Json(payload) = payload?;
    let mut employee = payload.validate()?;
    employee.geo_code = Some(geocode_address(state, &employee.address).await?);

    state.store.insert_employee(&employee).await?;
    info!(employee_id = %employee.employee_id, "employee created");

    Ok((StatusCode::CREATED, Json(employee)))
}

async fn edit_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<Json<Employee>, AppError> {
    let result = update_employee(&state, payload).await;
    state.metrics.record_write("employee", "edit", outcome(&result));
    result
}

async fn update_employee(
    state: &AppState,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<Json<Employee>, AppError> {
    let Json(payload) = payload?;
    let mut employee = payload.validate()?;
    employee.geo_code = Some(geocode_address(state, &employee.address).await?);

    let employee_id = employee.employee_id.clone();
    let updated = state
        .store
        .update_employee(employee)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    info!(employee_id = %employee_id, "employee updated");

    Ok(Json(updated))
}

async fn delete_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteEmployeeRequest>, JsonRejection>,
) -> Result<Json<DeleteResult>, AppError> {
    let result = remove_employee(&state, payload).await;
    state.metrics.record_write("employee", "delete", outcome(&result));
    result
}

async fn remove_employee(
    state: &AppState,
    payload: Result<Json<DeleteEmployeeRequest>, JsonRejection>,
) -> Result<Json<DeleteResult>, AppError> {
    let Json(payload) = payload?;
    let employee_id = required(payload.employee_id)
        .ok_or_else(|| AppError::BadRequest("employeeId is required".to_string()))?;

    let result = state.store.delete_employee(&employee_id).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }

    info!(employee_id = %employee_id, "employee deleted");
    Ok(Json(result))
}

async fn geocode_address(state: &AppState, address: &str) -> Result<GeoCode, AppError> {
    let start = Instant::now();
    let result = state.geocoder.geocode(address).await;
    let elapsed = start.elapsed().as_secs_f64();

    match &result {
        Ok(_) => state.metrics.record_geocode("success", elapsed),
        Err(err) => {
            warn!(error = %err, "geocoding failed");
            state.metrics.record_geocode("error", elapsed);
        }
    }

    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::EmployeeRequest;
    use crate::error::AppError;

    fn request() -> EmployeeRequest {
        EmployeeRequest {
            employee_id: Some("E-7".to_string()),
            name: Some("Meera".to_string()),
            email: Some("meera@example.com".to_string()),
            contact: Some(9123456780),
            designation: None,
            address: Some("Anna Salai, Chennai".to_string()),
        }
    }

    #[test]
    fn designation_is_optional() {
        let employee = request().validate().unwrap();
        assert_eq!(employee.employee_id, "E-7");
        assert!(employee.designation.is_none());
        assert!(employee.geo_code.is_none());
    }

    #[test]
    fn blank_or_zero_fields_count_as_missing() {
        let mut blank_name = request();
        blank_name.name = Some("   ".to_string());
        assert!(matches!(blank_name.validate(), Err(AppError::BadRequest(_))));

        let mut zero_contact = request();
        zero_contact.contact = Some(0);
        assert!(matches!(zero_contact.validate(), Err(AppError::BadRequest(_))));

        let mut no_address = request();
        no_address.address = None;
        assert!(matches!(no_address.validate(), Err(AppError::BadRequest(_))));
    }
}
