use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use services::attendance_session::MarkRequest;

use super::common::{MarkReq, RecordResponse, SessionReq, SessionResponse, failure, ok};
use crate::state::AppState;

/// POST /api/attendance/teacher/{teacher_id}/unlock
///
/// Opens the sign-in window of a class meeting for one date, creating the
/// session if needed. Re-unlocking restarts the auto-close timer.
///
/// ```json
/// { "meeting_id": 3, "date": "2025-11-10" }
/// ```
///
/// - `200 OK` with the session
/// - `403 Forbidden` when the teacher does not own the course
/// - `404 Not Found` for an unknown meeting
pub async fn unlock_session(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Json(req): Json<SessionReq>,
) -> Response {
    let date = req.date.unwrap_or_else(|| state.today());
    match state.sessions().unlock(req.meeting_id, date, teacher_id).await {
        Ok(session) => ok(SessionResponse::from(session), "Attendance session unlocked"),
        Err(e) => failure(e),
    }
}

/// POST /api/attendance/teacher/{teacher_id}/lock
///
/// Same body as unlock. `404` when the session was never opened.
pub async fn lock_session(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Json(req): Json<SessionReq>,
) -> Response {
    let date = req.date.unwrap_or_else(|| state.today());
    match state.sessions().lock(req.meeting_id, date, teacher_id).await {
        Ok(session) => ok(SessionResponse::from(session), "Attendance session locked"),
        Err(e) => failure(e),
    }
}

/// POST /api/attendance/student/{student_id}/signin
///
/// - `200 OK` with the (possibly pre-existing) record
/// - `403 Forbidden` when the student is not enrolled
/// - `409 Conflict` when the window is not open; the message names its state
pub async fn sign_in(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(req): Json<SessionReq>,
) -> Response {
    let date = req.date.unwrap_or_else(|| state.today());
    match state.sessions().sign_in(req.meeting_id, date, student_id).await {
        Ok(record) => ok(RecordResponse::from(record), "Signed in successfully"),
        Err(e) => failure(e),
    }
}

/// POST /api/attendance/teacher/{teacher_id}/mark
///
/// ```json
/// { "meeting_id": 3, "student_id": 21, "status": "excused", "remarks": "sick note" }
/// ```
///
/// Works whatever the session state. `400` for an unknown status.
pub async fn mark_attendance(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Json(req): Json<MarkReq>,
) -> Response {
    let date = req.date.unwrap_or_else(|| state.today());
    let request = MarkRequest {
        student_id: req.student_id,
        status: req.status,
        remarks: req.remarks,
        location: req.location,
    };

    match state
        .sessions()
        .mark_manually(req.meeting_id, date, teacher_id, request)
        .await
    {
        Ok(record) => ok(RecordResponse::from(record), "Attendance marked"),
        Err(e) => failure(e),
    }
}

/// POST /api/attendance/sweep
///
/// Runs one auto-close pass immediately and returns its report.
pub async fn run_sweep(State(state): State<AppState>) -> Response {
    let report = state.sweeper().tick().await;
    ok(report, "Auto-close sweep completed")
}
