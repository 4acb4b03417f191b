use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

mod common;
mod get;
mod post;

pub use get::{meeting_students, student_courses, teacher_courses};
pub use post::{lock_session, mark_attendance, run_sweep, sign_in, unlock_session};

/// Routes mounted under `/api/attendance`.
///
/// Callers identify themselves through the path; authentication sits in
/// front of this service.
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/teacher/{teacher_id}/unlock", post(unlock_session))
        .route("/teacher/{teacher_id}/lock", post(lock_session))
        .route("/teacher/{teacher_id}/mark", post(mark_attendance))
        .route("/teacher/{teacher_id}/courses", get(teacher_courses))
        .route(
            "/teacher/{teacher_id}/meetings/{meeting_id}/students",
            get(meeting_students),
        )
        .route("/student/{student_id}/signin", post(sign_in))
        .route("/student/{student_id}/courses", get(student_courses))
        .route("/sweep", post(run_sweep))
}
