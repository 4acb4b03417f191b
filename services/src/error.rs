use db::models::attendance_session::SessionStatus;
use sea_orm::DbErr;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Everything the attendance operations can refuse with.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Student {student_id} is not enrolled in course {course_id}")]
    NotEnrolled { student_id: i64, course_id: i64 },

    #[error("Sign-in is not available. Status: {0}")]
    SignInUnavailable(SessionStatus),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Coarse classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidState,
    InvalidInput,
    Internal,
}

impl AttendanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttendanceError::NotFound(_) => ErrorKind::NotFound,
            AttendanceError::Unauthorized(_) | AttendanceError::NotEnrolled { .. } => {
                ErrorKind::Unauthorized
            }
            AttendanceError::SignInUnavailable(_) => ErrorKind::InvalidState,
            AttendanceError::InvalidStatus(_) => ErrorKind::InvalidInput,
            AttendanceError::Database(_) => ErrorKind::Internal,
        }
    }
}
