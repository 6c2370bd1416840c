use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::error::Error;
use crate::models::{IdQuery, ParticipantRecord, ParticipantUpdateResponse, UpdateParticipantRequest};
use crate::AppState;

const SELECT_PARTICIPANT: &str = "SELECT p.id, p.session_id, p.employee_id, p.tickets, e.name AS employee_name \
     FROM participants p JOIN employees e ON e.id = p.employee_id WHERE p.id = $1";

/// The decrement feedback loop: after a winner is announced the caller may
/// take one ticket away. Tickets floor at zero, and a participant with no
/// tickets left is removed from the session entirely, so the next wheel
/// build never sees them. Wheel state is untouched either way; the draw
/// has already settled.
pub async fn update_participant(
    State(state): State<AppState>,
    Json(request): Json<UpdateParticipantRequest>,
) -> Result<Json<ParticipantUpdateResponse>, Error> {
    let participant = sqlx::query_as::<_, ParticipantRecord>(SELECT_PARTICIPANT)
        .bind(request.participant_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(Error::NotFound("Participant not found"))?;

    if !request.remove_ticket {
        let tickets = participant.tickets;
        return Ok(Json(ParticipantUpdateResponse {
            success: true,
            tickets,
            removed: false,
            participant: Some(participant),
        }));
    }

    let new_tickets = (participant.tickets - 1).max(0);
    if new_tickets == 0 {
        sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(request.participant_id)
            .execute(&state.pool)
            .await?;

        info!(
            "participant {} ({}) is out of tickets and leaves the lottery",
            participant.employee_name, participant.id
        );
        return Ok(Json(ParticipantUpdateResponse {
            success: true,
            tickets: 0,
            removed: true,
            participant: None,
        }));
    }

    sqlx::query("UPDATE participants SET tickets = $1 WHERE id = $2")
        .bind(new_tickets)
        .bind(request.participant_id)
        .execute(&state.pool)
        .await?;

    let updated = sqlx::query_as::<_, ParticipantRecord>(SELECT_PARTICIPANT)
        .bind(request.participant_id)
        .fetch_one(&state.pool)
        .await?;

    info!(
        "participant {} ({}) now holds {} tickets",
        updated.employee_name, updated.id, updated.tickets
    );
    Ok(Json(ParticipantUpdateResponse {
        success: true,
        tickets: new_tickets,
        removed: false,
        participant: Some(updated),
    }))
}

pub async fn delete_participant(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, Error> {
    let result = sqlx::query("DELETE FROM participants WHERE id = $1")
        .bind(query.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Participant not found"));
    }

    Ok(Json(json!({ "success": true })))
}
