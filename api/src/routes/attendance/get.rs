use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use services::attendance_query::Role;

use super::common::{DateQuery, failure, ok};
use crate::state::AppState;

/// GET /api/attendance/teacher/{teacher_id}/courses?date=YYYY-MM-DD
///
/// The teacher's meetings on that date's weekday with the state of each
/// sign-in window.
pub async fn teacher_courses(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Query(q): Query<DateQuery>,
) -> Response {
    let date = q.date.unwrap_or_else(|| state.today());
    match state.queries().day_view(teacher_id, Role::Teacher, date).await {
        Ok(days) => ok(days, "Courses retrieved"),
        Err(e) => failure(e),
    }
}

/// GET /api/attendance/student/{student_id}/courses?date=YYYY-MM-DD
///
/// Like the teacher view, plus an `attendance` summary per meeting.
pub async fn student_courses(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Query(q): Query<DateQuery>,
) -> Response {
    let date = q.date.unwrap_or_else(|| state.today());
    match state.queries().day_view(student_id, Role::Student, date).await {
        Ok(days) => ok(days, "Courses retrieved"),
        Err(e) => failure(e),
    }
}

/// GET /api/attendance/teacher/{teacher_id}/meetings/{meeting_id}/students?date=YYYY-MM-DD
pub async fn meeting_students(
    State(state): State<AppState>,
    Path((teacher_id, meeting_id)): Path<(i64, i64)>,
    Query(q): Query<DateQuery>,
) -> Response {
    let date = q.date.unwrap_or_else(|| state.today());
    match state.queries().roster(meeting_id, date, teacher_id).await {
        Ok(roster) => ok(roster, "Students retrieved"),
        Err(e) => failure(e),
    }
}
