use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{IntoActiveModel, QueryOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Minutes an unlocked window stays open unless configured otherwise.
pub const DEFAULT_AUTO_CLOSE_MINUTES: i32 = 20;

/// The sign-in window of one class meeting on one calendar date.
///
/// Rows are unique per `(meeting_id, session_date)` and are never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub meeting_id: i64,
    pub session_date: NaiveDate,
    pub status: SessionStatus,
    /// First set on the first unlock and refreshed by every later unlock.
    /// Never cleared, so it doubles as the "was ever opened" marker.
    pub unlocked_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub unlocked_by: Option<i64>,
    pub auto_close_minutes: i32,
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
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "session_status")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SessionStatus {
    /// Not open for sign-in. Every session starts here.
    #[default]
    #[sea_orm(string_value = "LOCKED")]
    Locked,
    /// Open for sign-in until the auto-close budget runs out.
    #[sea_orm(string_value = "UNLOCKED")]
    Unlocked,
    /// Window expired; terminal for the date.
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_meeting::Entity",
        from = "Column::MeetingId",
        to = "super::class_meeting::Column::Id"
    )]
    Meeting,
}

impl Related<super::class_meeting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meeting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked_at
            .map(|at| at + Duration::minutes(i64::from(self.auto_close_minutes)))
    }

    /// True when the window is open and `now` is strictly past its budget.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.status != SessionStatus::Unlocked {
            return false;
        }
        self.expires_at().is_some_and(|deadline| now > deadline)
    }

    /// Status as observed at `now`: an expired window reads as closed even
    /// before the sweeper has written it.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_expired(now) {
            SessionStatus::Closed
        } else {
            self.status
        }
    }

    pub async fn find_by_key<C>(
        db: &C,
        meeting_id: i64,
        session_date: NaiveDate,
    ) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::MeetingId.eq(meeting_id))
            .filter(Column::SessionDate.eq(session_date))
            .one(db)
            .await
    }

    /// Returns the row for `(meeting_id, session_date)`, inserting a LOCKED
    /// one first if none exists. The insert is conflict-tolerant on the
    /// unique key, so racing creators all end up reading the same row.
    pub async fn find_or_create<C>(
        db: &C,
        meeting_id: i64,
        session_date: NaiveDate,
        auto_close_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(existing) = Self::find_by_key(db, meeting_id, session_date).await? {
            return Ok(existing);
        }

        let fresh = ActiveModel {
            meeting_id: Set(meeting_id),
            session_date: Set(session_date),
            status: Set(SessionStatus::Locked),
            unlocked_at: Set(None),
            locked_at: Set(None),
            closed_at: Set(None),
            unlocked_by: Set(None),
            auto_close_minutes: Set(auto_close_minutes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Entity::insert(fresh)
            .on_conflict(
                OnConflict::columns([Column::MeetingId, Column::SessionDate])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(db)
            .await?;

        Self::find_by_key(db, meeting_id, session_date)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Attendance session for meeting {meeting_id} on {session_date} vanished after insert"
                ))
            })
    }

    pub async fn find_unlocked<C>(db: &C) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::Status.eq(SessionStatus::Unlocked))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn find_for_meetings_on<C>(
        db: &C,
        meeting_ids: Vec<i64>,
        session_date: NaiveDate,
    ) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        if meeting_ids.is_empty() {
            return Ok(Vec::new());
        }

        Entity::find()
            .filter(Column::MeetingId.is_in(meeting_ids))
            .filter(Column::SessionDate.eq(session_date))
            .all(db)
            .await
    }

    /// Number of sessions across `meeting_ids` whose status is not LOCKED.
    /// A session the teacher re-locked drops out of the count.
    pub async fn count_not_locked<C>(db: &C, meeting_ids: Vec<i64>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        if meeting_ids.is_empty() {
            return Ok(0);
        }

        Entity::find()
            .filter(Column::MeetingId.is_in(meeting_ids))
            .filter(Column::Status.ne(SessionStatus::Locked))
            .count(db)
            .await
    }

    pub async fn set_unlocked<C>(
        self,
        db: &C,
        teacher_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active = self.into_active_model();
        active.status = Set(SessionStatus::Unlocked);
        active.unlocked_at = Set(Some(now));
        active.unlocked_by = Set(Some(teacher_id));
        active.updated_at = Set(now);
        active.update(db).await
    }

    pub async fn set_locked<C>(self, db: &C, now: DateTime<Utc>) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active = self.into_active_model();
        active.status = Set(SessionStatus::Locked);
        active.locked_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(db).await
    }

    pub async fn set_closed<C>(self, db: &C, now: DateTime<Utc>) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active = self.into_active_model();
        active.status = Set(SessionStatus::Closed);
        active.closed_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(db).await
    }
}
