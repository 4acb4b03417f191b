use chrono::{NaiveTime, Weekday};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A recurring weekly slot for a course: weekday, time window and room.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "class_meetings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub building: Option<String>,
    pub meeting_type: MeetingType,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "day_of_week")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DayOfWeek {
    #[sea_orm(string_value = "MONDAY")]
    Monday,
    #[sea_orm(string_value = "TUESDAY")]
    Tuesday,
    #[sea_orm(string_value = "WEDNESDAY")]
    Wednesday,
    #[sea_orm(string_value = "THURSDAY")]
    Thursday,
    #[sea_orm(string_value = "FRIDAY")]
    Friday,
    #[sea_orm(string_value = "SATURDAY")]
    Saturday,
    #[sea_orm(string_value = "SUNDAY")]
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "meeting_type")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MeetingType {
    #[default]
    #[sea_orm(string_value = "LECTURE")]
    Lecture,
    #[sea_orm(string_value = "TUTORIAL")]
    Tutorial,
    #[sea_orm(string_value = "COMPUTING")]
    Computing,
    #[sea_orm(string_value = "LAB")]
    Lab,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::attendance_session::Entity")]
    Sessions,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub async fn create<C>(
        db: &C,
        course_id: i64,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room: Option<&str>,
        building: Option<&str>,
        meeting_type: MeetingType,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            course_id: Set(course_id),
            day_of_week: Set(day_of_week),
            start_time: Set(start_time),
            end_time: Set(end_time),
            room: Set(room.map(str::to_owned)),
            building: Set(building.map(str::to_owned)),
            meeting_type: Set(meeting_type),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Meetings of the given courses on one weekday, earliest first.
    pub async fn find_for_courses_on<C>(
        db: &C,
        course_ids: Vec<i64>,
        day: DayOfWeek,
    ) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        Entity::find()
            .filter(Column::CourseId.is_in(course_ids))
            .filter(Column::DayOfWeek.eq(day))
            .order_by_asc(Column::StartTime)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn find_for_course<C>(db: &C, course_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
