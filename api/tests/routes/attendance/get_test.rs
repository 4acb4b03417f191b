#[cfg(test)]
mod tests {
    use super::super::{OTHER_TEACHER, SECOND_STUDENT, STUDENT, TEACHER, seed};
    use crate::helpers::make_test_app;
    use axum::http::StatusCode;
    use serde_json::json;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn teacher_day_view_reflects_the_window() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;
        let uri = format!("/api/attendance/teacher/{TEACHER}/courses?date=2025-11-10");

        let (status, json) = t.get(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Courses retrieved");
        let days = json["data"].as_array().unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0]["id"], s.lecture.id);
        assert_eq!(days[0]["course_code"], "COS301");
        assert_eq!(days[0]["start_time"], "09:30:00");
        assert_eq!(days[0]["session_status"], "LOCKED");
        assert!(days[0].get("attendance").is_none());

        t.post(
            &format!("/api/attendance/teacher/{TEACHER}/unlock"),
            json!({ "meeting_id": s.lecture.id }),
        )
        .await;
        let (_, json) = t.get(&uri).await;
        assert_eq!(json["data"][0]["session_status"], "UNLOCKED");

        t.advance(21);
        let (_, json) = t.get(&uri).await;
        assert_eq!(json["data"][0]["session_status"], "CLOSED");

        let (_, json) = t
            .get(&format!("/api/attendance/teacher/{TEACHER}/courses?date=2025-11-11"))
            .await;
        assert_eq!(json["data"], json!([]));
    }

    #[tokio::test]
    #[serial]
    async fn student_day_view_includes_the_summary() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;
        let body = json!({ "meeting_id": s.lecture.id });
        t.post(&format!("/api/attendance/teacher/{TEACHER}/unlock"), body.clone())
            .await;
        t.post(&format!("/api/attendance/student/{STUDENT}/signin"), body)
            .await;

        let (status, json) = t
            .get(&format!("/api/attendance/student/{STUDENT}/courses"))
            .await;

        assert_eq!(status, StatusCode::OK);
        let summary = &json["data"][0]["attendance"];
        assert_eq!(summary["has_signed_in"], true);
        assert_eq!(summary["status"], "PRESENT");
        assert_eq!(summary["attended_classes"], 1);
        assert_eq!(summary["total_signed_classes"], 1);

        let (_, json) = t
            .get(&format!("/api/attendance/student/{SECOND_STUDENT}/courses"))
            .await;
        let summary = &json["data"][0]["attendance"];
        assert_eq!(summary["has_signed_in"], false);
        assert_eq!(summary["status"], serde_json::Value::Null);
        assert_eq!(summary["total_signed_classes"], 1);
    }

    #[tokio::test]
    #[serial]
    async fn roster_is_for_the_owning_teacher() {
        let t = make_test_app().await;
        let s = seed(t.state.db()).await;
        t.post(
            &format!("/api/attendance/teacher/{TEACHER}/mark"),
            json!({ "meeting_id": s.lecture.id, "student_id": SECOND_STUDENT, "status": "LATE" }),
        )
        .await;

        let (status, json) = t
            .get(&format!(
                "/api/attendance/teacher/{TEACHER}/meetings/{}/students?date=2025-11-10",
                s.lecture.id
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        let roster = json["data"].as_array().unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0]["student_id"], STUDENT);
        assert_eq!(roster[0]["attended"], false);
        assert_eq!(roster[1]["attended"], true);
        assert_eq!(roster[1]["status"], "LATE");

        let (status, _) = t
            .get(&format!(
                "/api/attendance/teacher/{OTHER_TEACHER}/meetings/{}/students",
                s.lecture.id
            ))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
