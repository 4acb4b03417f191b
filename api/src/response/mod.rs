use serde::Serialize;

/// JSON envelope shared by every endpoint:
///
/// ```json
/// { "success": true, "data": { ... }, "message": "Attendance session unlocked" }
/// ```
///
/// Failures carry `success: false`, the type's default `data` and the error text.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}
