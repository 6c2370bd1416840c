use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct LotterySession {
    pub id: i32,
    pub name: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Participant row joined with the employee it points at; the shape every
/// endpoint hands back.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct ParticipantRecord {
    pub id: i32,
    pub session_id: i32,
    pub employee_id: i32,
    pub tickets: i32,
    pub employee_name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionWithParticipants {
    #[serde(flatten)]
    pub session: LotterySession,
    pub participants: Vec<ParticipantRecord>,
}

// === Request payloads ===

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub id: i32,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NewSessionParticipant {
    pub employee_id: i32,
    pub tickets: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    pub participants: Vec<NewSessionParticipant>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateParticipantRequest {
    pub participant_id: i32,
    #[serde(default)]
    pub remove_ticket: bool,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct ParticipantUpdateResponse {
    pub success: bool,
    pub tickets: i32,
    pub removed: bool,
    pub participant: Option<ParticipantRecord>,
}
