use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::error::Error;
use crate::models::{
    CreateSessionRequest, IdQuery, LotterySession, ParticipantRecord, SessionWithParticipants,
};
use crate::AppState;

const SELECT_PARTICIPANTS: &str = "SELECT p.id, p.session_id, p.employee_id, p.tickets, e.name AS employee_name \
     FROM participants p JOIN employees e ON e.id = p.employee_id";

pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionWithParticipants>>, Error> {
    let sessions = sqlx::query_as::<_, LotterySession>(
        "SELECT id, name, created_at, updated_at FROM lottery_sessions ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    let participants = sqlx::query_as::<_, ParticipantRecord>(SELECT_PARTICIPANTS)
        .fetch_all(&state.pool)
        .await?;

    let mut by_session: HashMap<i32, Vec<ParticipantRecord>> = HashMap::new();
    for record in participants {
        by_session.entry(record.session_id).or_default().push(record);
    }

    let result = sessions
        .into_iter()
        .map(|session| {
            let participants = by_session.remove(&session.id).unwrap_or_default();
            SessionWithParticipants { session, participants }
        })
        .collect();

    Ok(Json(result))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionWithParticipants>, Error> {
    if request.participants.is_empty() {
        return Err(Error::Validation("At least one participant is required".to_string()));
    }
    for p in &request.participants {
        if p.employee_id <= 0 {
            return Err(Error::Validation("Invalid employee id".to_string()));
        }
        let tickets = p.tickets.unwrap_or(1);
        shared::validation::validate_tickets(tickets)
            .map_err(|_| Error::Validation("Tickets must be a positive integer".to_string()))?;
    }

    let mut tx = state.pool.begin().await?;

    let session = sqlx::query_as::<_, LotterySession>(
        "INSERT INTO lottery_sessions (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
    )
    .bind(request.name.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    for p in &request.participants {
        sqlx::query("INSERT INTO participants (session_id, employee_id, tickets) VALUES ($1, $2, $3)")
            .bind(session.id)
            .bind(p.employee_id)
            .bind(p.tickets.unwrap_or(1) as i32)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let participants = sqlx::query_as::<_, ParticipantRecord>(
        &format!("{} WHERE p.session_id = $1 ORDER BY p.id", SELECT_PARTICIPANTS),
    )
    .bind(session.id)
    .fetch_all(&state.pool)
    .await?;

    info!(
        "created lottery session {} with {} participants",
        session.id,
        participants.len()
    );
    Ok(Json(SessionWithParticipants { session, participants }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, Error> {
    let result = sqlx::query("DELETE FROM lottery_sessions WHERE id = $1")
        .bind(query.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Session not found"));
    }

    // Any live wheel for this session is torn down with it.
    state.wheels.remove(query.id).await;

    info!("deleted lottery session {}", query.id);
    Ok(Json(json!({ "success": true })))
}

/// Participants for one session, in the shape the wheel engine consumes.
pub async fn wheel_roster(
    state: &AppState,
    session_id: i32,
) -> Result<Vec<shared::participant::Participant>, Error> {
    let exists = sqlx::query("SELECT id FROM lottery_sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound("Session not found"));
    }

    let records = sqlx::query_as::<_, ParticipantRecord>(
        &format!("{} WHERE p.session_id = $1 ORDER BY p.id", SELECT_PARTICIPANTS),
    )
    .bind(session_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(records
        .into_iter()
        .map(|r| shared::participant::Participant::new(r.id, r.employee_name, r.tickets.max(0) as u32))
        .collect())
}
