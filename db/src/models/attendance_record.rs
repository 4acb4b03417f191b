use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{IntoActiveModel, QueryOrder, TryInsertResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A student's attendance outcome for one course on one date.
///
/// Keyed by course rather than by session, so a course with several
/// meetings on the same day still yields a single record.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "PRESENT")]
    Present,
    #[sea_orm(string_value = "ABSENT")]
    Absent,
    #[sea_orm(string_value = "LATE")]
    Late,
    #[sea_orm(string_value = "EXCUSED")]
    Excused,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Values for a record that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub student_id: i64,
    pub course_id: i64,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub location: Option<String>,
}

impl Model {
    pub async fn find_by_key<C>(
        db: &C,
        student_id: i64,
        course_id: i64,
        attendance_date: NaiveDate,
    ) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::AttendanceDate.eq(attendance_date))
            .one(db)
            .await
    }

    /// Inserts `new` unless a record already holds its key, then returns
    /// whichever row owns the key. The second element is `true` when this
    /// call created the row.
    pub async fn insert_if_absent<C>(
        db: &C,
        new: NewRecord,
        now: DateTime<Utc>,
    ) -> Result<(Model, bool), DbErr>
    where
        C: ConnectionTrait,
    {
        let (student_id, course_id, date) = (new.student_id, new.course_id, new.attendance_date);

        let active = ActiveModel {
            student_id: Set(new.student_id),
            course_id: Set(new.course_id),
            attendance_date: Set(new.attendance_date),
            status: Set(new.status),
            check_in_time: Set(new.check_in_time),
            remarks: Set(new.remarks),
            location: Set(new.location),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let outcome = Entity::insert(active)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::CourseId, Column::AttendanceDate])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(db)
            .await?;
        let created = matches!(outcome, TryInsertResult::Inserted(rows) if rows > 0);

        let row = Self::find_by_key(db, student_id, course_id, date)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Attendance record for student {student_id}, course {course_id} on {date} vanished after insert"
                ))
            })?;

        Ok((row, created))
    }

    /// Overwrites the status and, when given, the remarks and location.
    pub async fn overwrite<C>(
        self,
        db: &C,
        status: AttendanceStatus,
        check_in_time: Option<DateTime<Utc>>,
        remarks: Option<String>,
        location: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active = self.into_active_model();
        active.status = Set(status);
        active.check_in_time = Set(check_in_time);
        if let Some(remarks) = remarks {
            active.remarks = Set(Some(remarks));
        }
        if let Some(location) = location {
            active.location = Set(Some(location));
        }
        active.updated_at = Set(now);
        active.update(db).await
    }

    pub async fn count_with_status<C>(
        db: &C,
        student_id: i64,
        course_id: i64,
        status: AttendanceStatus,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.eq(status))
            .count(db)
            .await
    }

    pub async fn find_for_course_on<C>(
        db: &C,
        course_id: i64,
        attendance_date: NaiveDate,
    ) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::AttendanceDate.eq(attendance_date))
            .order_by_asc(Column::StudentId)
            .all(db)
            .await
    }
}
