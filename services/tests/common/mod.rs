#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use db::models::class_meeting::{self, DayOfWeek, MeetingType};
use db::models::{course, enrollment};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use services::attendance_query::AttendanceQueryService;
use services::attendance_session::AttendanceSessionService;
use services::catalog::DbScheduleCatalog;
use services::clock::{Clock, MockClock};
use std::sync::Arc;

pub const TEACHER: i64 = 11;
pub const OTHER_TEACHER: i64 = 12;
pub const STUDENT: i64 = 21;
pub const SECOND_STUDENT: i64 = 22;
pub const OUTSIDER: i64 = 99;

/// Monday 10 November 2025.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 10).unwrap()
}

/// Minutes after the Monday lecture's sign-in window is first opened.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 10, 9, 30, 0).unwrap() + Duration::minutes(minutes)
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub clock: Arc<MockClock>,
    pub sessions: AttendanceSessionService,
    pub queries: AttendanceQueryService,
    pub course: course::Model,
    /// Monday 09:30 lecture.
    pub lecture: class_meeting::Model,
    /// Monday 14:30 tutorial of the same course.
    pub tutorial: class_meeting::Model,
    /// Wednesday lab of the same course.
    pub lab: class_meeting::Model,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = setup_test_db().await;

        let course = course::Model::create(&db, "COS301", "Software Engineering", Some("S2"), TEACHER)
            .await
            .unwrap();
        let lecture = meeting(&db, course.id, DayOfWeek::Monday, (9, 30), (10, 20), MeetingType::Lecture).await;
        let tutorial = meeting(&db, course.id, DayOfWeek::Monday, (14, 30), (15, 20), MeetingType::Tutorial).await;
        let lab = meeting(&db, course.id, DayOfWeek::Wednesday, (8, 30), (10, 20), MeetingType::Lab).await;

        for student in [STUDENT, SECOND_STUDENT] {
            enrollment::Model::enroll(&db, student, course.id).await.unwrap();
        }

        let clock = Arc::new(MockClock::new(at(0)));
        let catalog = Arc::new(DbScheduleCatalog::new(db.clone()));
        let sessions = AttendanceSessionService::new(db.clone(), catalog, clock.clone() as Arc<dyn Clock>);
        let queries = AttendanceQueryService::from(&sessions);

        Self {
            db,
            clock,
            sessions,
            queries,
            course,
            lecture,
            tutorial,
            lab,
        }
    }

    /// Moves the clock to `minutes` after the lecture window opened.
    pub fn at(&self, minutes: i64) {
        self.clock.set(at(minutes));
    }
}

async fn meeting(
    db: &DatabaseConnection,
    course_id: i64,
    day: DayOfWeek,
    start: (u32, u32),
    end: (u32, u32),
    kind: MeetingType,
) -> class_meeting::Model {
    class_meeting::Model::create(
        db,
        course_id,
        day,
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        Some("IT 2-27"),
        Some("IT Building"),
        kind,
    )
    .await
    .unwrap()
}
