mod get_test;
mod post_test;

use chrono::NaiveTime;
use db::models::class_meeting::{self, DayOfWeek, MeetingType};
use db::models::{course, enrollment};
use sea_orm::DatabaseConnection;

pub const TEACHER: i64 = 11;
pub const OTHER_TEACHER: i64 = 12;
pub const STUDENT: i64 = 21;
pub const SECOND_STUDENT: i64 = 22;
pub const OUTSIDER: i64 = 99;

pub struct Seed {
    pub course: course::Model,
    /// Monday 09:30 lecture.
    pub lecture: class_meeting::Model,
}

pub async fn seed(db: &DatabaseConnection) -> Seed {
    let course = course::Model::create(db, "COS301", "Software Engineering", Some("S2"), TEACHER)
        .await
        .expect("create course");
    let lecture = class_meeting::Model::create(
        db,
        course.id,
        DayOfWeek::Monday,
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(10, 20, 0).unwrap(),
        Some("2-27"),
        Some("IT Building"),
        MeetingType::Lecture,
    )
    .await
    .expect("create meeting");

    for student in [STUDENT, SECOND_STUDENT] {
        enrollment::Model::enroll(db, student, course.id)
            .await
            .expect("enroll student");
    }

    Seed { course, lecture }
}
