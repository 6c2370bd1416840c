use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{is_unique_violation, Error};
use crate::models::{CreateEmployeeRequest, Employee, IdQuery, UpdateEmployeeRequest};
use crate::AppState;

pub async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, Error> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT id, name, is_active FROM employees ORDER BY name ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(employees))
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<Json<Employee>, Error> {
    let name = request.name.trim();
    shared::validation::validate_employee_name(name)
        .map_err(|_| Error::Validation("Name is required".to_string()))?;

    let employee = sqlx::query_as::<_, Employee>(
        "INSERT INTO employees (name, is_active) VALUES ($1, $2) RETURNING id, name, is_active",
    )
    .bind(name)
    .bind(request.is_active.unwrap_or(true))
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict("Employee with this name already exists")
        } else {
            Error::from(e)
        }
    })?;

    info!("created employee {} ({})", employee.name, employee.id);
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, Error> {
    let existing = sqlx::query_as::<_, Employee>(
        "SELECT id, name, is_active FROM employees WHERE id = $1",
    )
    .bind(request.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(Error::NotFound("Employee not found"))?;

    let name = match &request.name {
        Some(name) => {
            let trimmed = name.trim();
            shared::validation::validate_employee_name(trimmed)
                .map_err(|_| Error::Validation("Name is required".to_string()))?;
            trimmed.to_string()
        }
        None => existing.name,
    };
    let is_active = request.is_active.unwrap_or(existing.is_active);

    let employee = sqlx::query_as::<_, Employee>(
        "UPDATE employees SET name = $1, is_active = $2 WHERE id = $3 RETURNING id, name, is_active",
    )
    .bind(&name)
    .bind(is_active)
    .bind(request.id)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict("Employee with this name already exists")
        } else {
            Error::from(e)
        }
    })?;

    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(query.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Employee not found"));
    }

    info!("deleted employee {}", query.id);
    Ok(Json(json!({ "success": true })))
}
