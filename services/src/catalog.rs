//! Read-only view of the course schedule: who teaches what, who is enrolled,
//! and which meetings fall on a given weekday.

use async_trait::async_trait;
use chrono::NaiveTime;
use db::models::{
    class_meeting::{self, DayOfWeek, MeetingType},
    course, enrollment,
};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::Serialize;
use std::collections::HashMap;

/// A class meeting together with the course facts callers need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMeeting {
    pub id: i64,
    pub course_id: i64,
    pub course_code: String,
    pub course_name: String,
    pub semester: Option<String>,
    pub teacher_id: i64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub building: Option<String>,
    pub meeting_type: MeetingType,
}

impl ClassMeeting {
    fn join(meeting: class_meeting::Model, course: &course::Model) -> Self {
        Self {
            id: meeting.id,
            course_id: course.id,
            course_code: course.course_code.clone(),
            course_name: course.course_name.clone(),
            semester: course.semester.clone(),
            teacher_id: course.teacher_id,
            day_of_week: meeting.day_of_week,
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            room: meeting.room,
            building: meeting.building,
            meeting_type: meeting.meeting_type,
        }
    }
}

#[async_trait]
pub trait ScheduleCatalog: Send + Sync {
    async fn meeting(&self, meeting_id: i64) -> Result<Option<ClassMeeting>, DbErr>;

    async fn meetings_for_teacher_on_weekday(
        &self,
        teacher_id: i64,
        day: DayOfWeek,
    ) -> Result<Vec<ClassMeeting>, DbErr>;

    async fn meetings_for_student_on_weekday(
        &self,
        student_id: i64,
        day: DayOfWeek,
    ) -> Result<Vec<ClassMeeting>, DbErr>;

    /// Every meeting of the course, whatever the weekday.
    async fn meetings_for_course(&self, course_id: i64) -> Result<Vec<ClassMeeting>, DbErr>;

    async fn is_enrolled(&self, student_id: i64, course_id: i64) -> Result<bool, DbErr>;

    async fn enrolled_students(&self, course_id: i64) -> Result<Vec<i64>, DbErr>;

    /// Teacher who owns the meeting's course, `None` when the meeting is unknown.
    async fn owner_of(&self, meeting_id: i64) -> Result<Option<i64>, DbErr> {
        Ok(self.meeting(meeting_id).await?.map(|m| m.teacher_id))
    }
}

/// Catalog backed by the `courses`, `class_meetings` and `enrollments` tables.
#[derive(Debug, Clone)]
pub struct DbScheduleCatalog {
    db: DatabaseConnection,
}

impl DbScheduleCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn meetings_of(
        &self,
        courses: Vec<course::Model>,
        day: DayOfWeek,
    ) -> Result<Vec<ClassMeeting>, DbErr> {
        let ids: Vec<i64> = courses.iter().map(|c| c.id).collect();
        let by_id: HashMap<i64, course::Model> = courses.into_iter().map(|c| (c.id, c)).collect();

        let meetings = class_meeting::Model::find_for_courses_on(&self.db, ids, day).await?;
        Ok(meetings
            .into_iter()
            .filter_map(|m| {
                let course = by_id.get(&m.course_id)?;
                Some(ClassMeeting::join(m, course))
            })
            .collect())
    }
}

#[async_trait]
impl ScheduleCatalog for DbScheduleCatalog {
    async fn meeting(&self, meeting_id: i64) -> Result<Option<ClassMeeting>, DbErr> {
        let found = class_meeting::Entity::find_by_id(meeting_id)
            .find_also_related(course::Entity)
            .one(&self.db)
            .await?;

        Ok(match found {
            Some((meeting, Some(course))) => Some(ClassMeeting::join(meeting, &course)),
            _ => None,
        })
    }

    async fn meetings_for_teacher_on_weekday(
        &self,
        teacher_id: i64,
        day: DayOfWeek,
    ) -> Result<Vec<ClassMeeting>, DbErr> {
        let courses = course::Model::find_by_teacher(&self.db, teacher_id).await?;
        self.meetings_of(courses, day).await
    }

    async fn meetings_for_student_on_weekday(
        &self,
        student_id: i64,
        day: DayOfWeek,
    ) -> Result<Vec<ClassMeeting>, DbErr> {
        let course_ids = enrollment::Model::course_ids_for_student(&self.db, student_id).await?;
        let courses = course::Model::find_many(&self.db, course_ids).await?;
        self.meetings_of(courses, day).await
    }

    async fn meetings_for_course(&self, course_id: i64) -> Result<Vec<ClassMeeting>, DbErr> {
        let Some(course) = course::Entity::find_by_id(course_id).one(&self.db).await? else {
            return Ok(Vec::new());
        };

        let meetings = class_meeting::Model::find_for_course(&self.db, course_id).await?;
        Ok(meetings
            .into_iter()
            .map(|m| ClassMeeting::join(m, &course))
            .collect())
    }

    async fn is_enrolled(&self, student_id: i64, course_id: i64) -> Result<bool, DbErr> {
        enrollment::Model::is_enrolled(&self.db, student_id, course_id).await
    }

    async fn enrolled_students(&self, course_id: i64) -> Result<Vec<i64>, DbErr> {
        enrollment::Model::student_ids_for_course(&self.db, course_id).await
    }
}
