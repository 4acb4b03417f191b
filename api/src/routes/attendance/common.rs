use crate::response::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord};
use db::models::attendance_session::{Model as AttendanceSession, SessionStatus};
use serde::{Deserialize, Serialize};
use services::error::{AttendanceError, ErrorKind};
use tracing::{error, warn};

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Body of the unlock, lock and sign-in requests. `date` defaults to today.
#[derive(Debug, Deserialize)]
pub struct SessionReq {
    pub meeting_id: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MarkReq {
    pub meeting_id: i64,
    pub date: Option<NaiveDate>,
    pub student_id: i64,
    pub status: String,
    pub remarks: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: i64,
    pub meeting_id: i64,
    pub session_date: NaiveDate,
    pub status: SessionStatus,
    pub unlocked_at: Option<String>,
    pub locked_at: Option<String>,
    pub closed_at: Option<String>,
    pub unlocked_by: Option<i64>,
    pub auto_close_minutes: i32,
    pub closes_at: Option<String>,
}

impl From<AttendanceSession> for SessionResponse {
    fn from(m: AttendanceSession) -> Self {
        let closes_at = (m.status == SessionStatus::Unlocked)
            .then(|| m.expires_at())
            .flatten()
            .map(rfc3339);

        Self {
            id: m.id,
            meeting_id: m.meeting_id,
            session_date: m.session_date,
            status: m.status,
            unlocked_at: m.unlocked_at.map(rfc3339),
            locked_at: m.locked_at.map(rfc3339),
            closed_at: m.closed_at.map(rfc3339),
            unlocked_by: m.unlocked_by,
            auto_close_minutes: m.auto_close_minutes,
            closes_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub remarks: Option<String>,
    pub location: Option<String>,
}

impl From<AttendanceRecord> for RecordResponse {
    fn from(m: AttendanceRecord) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            course_id: m.course_id,
            attendance_date: m.attendance_date,
            status: m.status,
            check_in_time: m.check_in_time.map(rfc3339),
            remarks: m.remarks,
            location: m.location,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns a refused operation into the standard error envelope.
pub fn failure(err: AttendanceError) -> Response {
    let status = status_for(err.kind());
    if status.is_server_error() {
        error!(error = %err, "Attendance request failed");
    } else {
        warn!(error = %err, status = status.as_u16(), "Attendance request refused");
    }

    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

pub fn ok<T: Serialize>(data: T, message: &str) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data, message))).into_response()
}
