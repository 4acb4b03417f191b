#[cfg(test)]
mod tests {
    use super::super::{OTHER_TEACHER, OUTSIDER, SECOND_STUDENT, STUDENT, TEACHER, seed};
    use crate::helpers::make_test_app;
    use axum::http::StatusCode;
    use serde_json::json;
    use serial_test::serial;
    use util::config::AppConfig;

    #[tokio::test]
    #[serial]
    async fn unlock_sign_in_lock_round() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;
        let body = json!({ "meeting_id": s.lecture.id, "date": "2025-11-10" });

        let (status, json) = t
            .post(&format!("/api/attendance/teacher/{TEACHER}/unlock"), body.clone())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Attendance session unlocked");
        assert_eq!(json["data"]["status"], "UNLOCKED");
        assert_eq!(json["data"]["unlocked_by"], TEACHER);
        assert_eq!(json["data"]["unlocked_at"], "2025-11-10T09:30:00Z");
        assert_eq!(json["data"]["closes_at"], "2025-11-10T09:50:00Z");

        t.advance(5);
        let (status, json) = t
            .post(&format!("/api/attendance/student/{STUDENT}/signin"), body.clone())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "PRESENT");
        assert_eq!(json["data"]["course_id"], s.course.id);
        assert_eq!(json["data"]["check_in_time"], "2025-11-10T09:35:00Z");

        let (status, json) = t
            .post(&format!("/api/attendance/teacher/{TEACHER}/lock"), body.clone())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "LOCKED");
        assert_eq!(json["data"]["closes_at"], serde_json::Value::Null);

        let (status, json) = t
            .post(&format!("/api/attendance/student/{SECOND_STUDENT}/signin"), body)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Sign-in is not available. Status: LOCKED");
    }

    #[tokio::test]
    #[serial]
    async fn date_defaults_to_today() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;

        let (status, json) = t
            .post(
                &format!("/api/attendance/teacher/{TEACHER}/unlock"),
                json!({ "meeting_id": s.lecture.id }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["session_date"], "2025-11-10");
    }

    #[tokio::test]
    #[serial]
    async fn teacher_controls_are_ownership_checked() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;

        let (status, json) = t
            .post(
                &format!("/api/attendance/teacher/{OTHER_TEACHER}/unlock"),
                json!({ "meeting_id": s.lecture.id }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["success"], false);

        let (status, _) = t
            .post(
                &format!("/api/attendance/teacher/{TEACHER}/unlock"),
                json!({ "meeting_id": 4040 }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = t
            .post(
                &format!("/api/attendance/teacher/{TEACHER}/lock"),
                json!({ "meeting_id": s.lecture.id }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[serial]
    async fn sign_in_requires_enrollment() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;
        let body = json!({ "meeting_id": s.lecture.id });
        t.post(&format!("/api/attendance/teacher/{TEACHER}/unlock"), body.clone())
            .await;

        let (status, json) = t
            .post(&format!("/api/attendance/student/{OUTSIDER}/signin"), body)
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            json["message"],
            format!("Student {OUTSIDER} is not enrolled in course {}", s.course.id)
        );
    }

    #[tokio::test]
    #[serial]
    async fn manual_mark_without_a_session() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;

        let (status, json) = t
            .post(
                &format!("/api/attendance/teacher/{TEACHER}/mark"),
                json!({
                    "meeting_id": s.lecture.id,
                    "student_id": STUDENT,
                    "status": "excused",
                    "remarks": "medical certificate"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "EXCUSED");
        assert_eq!(json["data"]["remarks"], "medical certificate");
        assert_eq!(json["data"]["check_in_time"], serde_json::Value::Null);

        let (status, json) = t
            .post(
                &format!("/api/attendance/teacher/{TEACHER}/mark"),
                json!({ "meeting_id": s.lecture.id, "student_id": STUDENT, "status": "asleep" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid attendance status: asleep");
    }

    #[tokio::test]
    #[serial]
    async fn sweep_endpoint_closes_expired_windows() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;
        t.post(
            &format!("/api/attendance/teacher/{TEACHER}/unlock"),
            json!({ "meeting_id": s.lecture.id }),
        )
        .await;

        t.advance(25);
        let (status, json) = t.post("/api/attendance/sweep", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["examined"], 1);
        assert_eq!(json["data"]["closed"], 1);
        assert_eq!(json["data"]["failed"], 0);

        let (status, json) = t
            .post(
                &format!("/api/attendance/student/{STUDENT}/signin"),
                json!({ "meeting_id": s.lecture.id }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["message"], "Sign-in is not available. Status: CLOSED");
    }

    #[tokio::test]
    #[serial]
    async fn configured_window_length_applies_to_new_sessions() {
        AppConfig::set_auto_close_minutes(45);
        let t = make_test_app().await;
        AppConfig::reset();
        let s = seed(t.state.db()).await;

        let (status, json) = t
            .post(
                &format!("/api/attendance/teacher/{TEACHER}/unlock"),
                json!({ "meeting_id": s.lecture.id }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["auto_close_minutes"], 45);
        assert_eq!(json["data"]["closes_at"], "2025-11-10T10:15:00Z");
    }
}
