use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shared::participant::Winner;
use shared::wheel::{self, SpinResponse, Tick, WheelError, WheelMachine, WheelSnapshot};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::Error;
use crate::services::session_service::wheel_roster;
use crate::AppState;

/// Cadence of the server-side frame driver, roughly a display refresh.
const FRAME_INTERVAL_MS: u64 = 16;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/:session_id/build", post(build_wheel))
        .route("/:session_id/spin", post(spin_wheel))
        .route("/:session_id", get(wheel_state).delete(teardown_wheel))
}

struct WheelInstance {
    machine: WheelMachine,
    driver: Option<JoinHandle<()>>,
    winner: Option<Winner>,
}

/// Live wheel instances, one per lottery session. The machine owns all
/// wheel state; this registry only adds the frame-driver task handle and
/// the last settled winner for polling clients.
#[derive(Clone)]
pub struct WheelRegistry {
    sessions: Arc<Mutex<HashMap<i32, WheelInstance>>>,
    epoch: Instant,
}

impl WheelRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Tears the instance down, aborting the frame driver so no tick ever
    /// writes to a dropped wheel.
    pub async fn remove(&self, session_id: i32) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.remove(&session_id) {
            Some(instance) => {
                if let Some(driver) = instance.driver {
                    driver.abort();
                }
                true
            }
            None => false,
        }
    }

    fn spawn_driver(&self, session_id: i32) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
            loop {
                interval.tick().await;
                let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
                let mut map = sessions.lock().await;
                let Some(instance) = map.get_mut(&session_id) else {
                    break;
                };
                match instance.machine.tick(now_ms) {
                    Tick::Frame(_) | Tick::Settling => {}
                    Tick::Winner(winner) => {
                        info!(
                            "🎡 WHEEL SETTLED: session {} winner is {} (participant {})",
                            session_id, winner.name, winner.id
                        );
                        instance.winner = Some(winner);
                        break;
                    }
                    Tick::Idle => {
                        // The machine bailed out without a winner; it has
                        // already logged the defect.
                        error!("wheel for session {} returned to idle without settling", session_id);
                        break;
                    }
                }
            }
        })
    }
}

impl Default for WheelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot(instance: &WheelInstance) -> WheelSnapshot {
    WheelSnapshot {
        rotation: instance.machine.rotation(),
        phase: instance.machine.phase().as_str().to_string(),
        segment_labels: instance
            .machine
            .segments()
            .iter()
            .map(|p| p.name.clone())
            .collect(),
        winner: instance.winner.clone(),
    }
}

/// Builds (or rebuilds) the segment layout from the session's current
/// participants. A rebuild during a spin is refused without touching the
/// wheel, so the animation never snaps.
async fn build_wheel(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<Json<WheelSnapshot>, Error> {
    let roster = wheel_roster(&state, session_id).await?;
    let layout = wheel::build(&roster, &mut rand::thread_rng()).map_err(|e| match e {
        WheelError::NoSegments => {
            Error::Validation("Session has no participants with tickets".to_string())
        }
        other => Error::Validation(other.to_string()),
    })?;

    let mut sessions = state.wheels.sessions.lock().await;
    match sessions.get_mut(&session_id) {
        Some(instance) => {
            if instance.machine.rebuild(layout).is_err() {
                // Mid-spin rebuild: keep the wheel exactly as it is.
                return Ok(Json(snapshot(instance)));
            }
            instance.winner = None;
            Ok(Json(snapshot(instance)))
        }
        None => {
            let instance = WheelInstance {
                machine: WheelMachine::new(layout),
                driver: None,
                winner: None,
            };
            info!(
                "built wheel for session {} with {} segments",
                session_id,
                instance.machine.segments().len()
            );
            let response = snapshot(&instance);
            sessions.insert(session_id, instance);
            Ok(Json(response))
        }
    }
}

/// Accepts a spin when the wheel is idle. Acceptance is reported
/// synchronously, before the first animation frame, so clients can lock
/// their spin controls; the refusals are no-ops, never queued.
async fn spin_wheel(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<Json<SpinResponse>, Error> {
    let mut sessions = state.wheels.sessions.lock().await;
    let instance = sessions
        .get_mut(&session_id)
        .ok_or(Error::NotFound("No wheel built for this session"))?;

    match instance.machine.spin(state.wheels.now_ms(), &mut rand::thread_rng()) {
        Ok(plan) => {
            instance.winner = None;
            info!(
                "🎡 DRAW STARTED: session {} spinning for {:.0}ms across {} segments",
                session_id,
                plan.duration_ms,
                instance.machine.segments().len()
            );
            let driver = state.wheels.spawn_driver(session_id);
            if let Some(previous) = instance.driver.replace(driver) {
                previous.abort();
            }
            Ok(Json(SpinResponse {
                accepted: true,
                duration_ms: Some(plan.duration_ms),
                message: None,
            }))
        }
        Err(WheelError::SpinInProgress) => Ok(Json(SpinResponse {
            accepted: false,
            duration_ms: None,
            message: Some("A spin is already in progress".to_string()),
        })),
        Err(WheelError::NoSegments) => Ok(Json(SpinResponse {
            accepted: false,
            duration_ms: None,
            message: Some("Cannot spin an empty wheel".to_string()),
        })),
    }
}

async fn wheel_state(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<Json<WheelSnapshot>, Error> {
    let sessions = state.wheels.sessions.lock().await;
    let instance = sessions
        .get(&session_id)
        .ok_or(Error::NotFound("No wheel built for this session"))?;
    Ok(Json(snapshot(instance)))
}

async fn teardown_wheel(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<Json<Value>, Error> {
    if state.wheels.remove(session_id).await {
        info!("tore down wheel for session {}", session_id);
        Ok(Json(json!({ "success": true })))
    } else {
        Err(Error::NotFound("No wheel built for this session"))
    }
}
