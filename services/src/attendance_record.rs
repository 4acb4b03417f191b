//! The attendance ledger. Both ways a record gets written, a student's own
//! sign-in and a teacher's manual mark, go through [`AttendanceLedger`].

use crate::error::{AttendanceError, AttendanceResult};
use crate::key_lock::{KeyGuard, KeyedLocks};
use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord, NewRecord};
use sea_orm::{ConnectionTrait, DbErr};
use std::str::FromStr;
use tracing::debug;

/// Identity of a ledger entry: one student, one course, one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub student_id: i64,
    pub course_id: i64,
    pub date: NaiveDate,
}

/// A teacher-entered outcome.
#[derive(Debug, Clone)]
pub struct ManualMark {
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub location: Option<String>,
}

impl ManualMark {
    pub fn new(status: AttendanceStatus) -> Self {
        Self {
            status,
            remarks: None,
            location: None,
        }
    }
}

/// Parses a status name such as `"present"` or `"EXCUSED"`.
pub fn parse_status(raw: &str) -> AttendanceResult<AttendanceStatus> {
    AttendanceStatus::from_str(raw.trim())
        .map_err(|_| AttendanceError::InvalidStatus(raw.to_owned()))
}

#[derive(Clone, Default)]
pub struct AttendanceLedger {
    locks: KeyedLocks<RecordKey>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `key`. Keep the guard alive until
    /// the surrounding transaction has committed.
    pub async fn lock(&self, key: RecordKey) -> KeyGuard<RecordKey> {
        self.locks.lock(key).await
    }

    /// Records a sign-in. An existing record is returned untouched, so repeated
    /// sign-ins keep the first check-in time.
    pub async fn check_in<C>(
        &self,
        db: &C,
        guard: &KeyGuard<RecordKey>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, DbErr>
    where
        C: ConnectionTrait,
    {
        let key = guard.key();
        if let Some(existing) =
            AttendanceRecord::find_by_key(db, key.student_id, key.course_id, key.date).await?
        {
            debug!(student_id = key.student_id, course_id = key.course_id, "sign-in already recorded");
            return Ok(existing);
        }

        let (record, _) = AttendanceRecord::insert_if_absent(
            db,
            NewRecord {
                student_id: key.student_id,
                course_id: key.course_id,
                attendance_date: key.date,
                status: AttendanceStatus::Present,
                check_in_time: Some(now),
                remarks: None,
                location: None,
            },
            now,
        )
        .await?;
        Ok(record)
    }

    /// Writes a manual mark over whatever the record currently says.
    ///
    /// A PRESENT mark on a record without a check-in time is stamped with
    /// `now`; an existing check-in time is never cleared.
    pub async fn apply_mark<C>(
        &self,
        db: &C,
        guard: &KeyGuard<RecordKey>,
        mark: ManualMark,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, DbErr>
    where
        C: ConnectionTrait,
    {
        let key = guard.key();
        let stamp = |current: Option<DateTime<Utc>>| {
            current.or((mark.status == AttendanceStatus::Present).then_some(now))
        };

        let existing =
            AttendanceRecord::find_by_key(db, key.student_id, key.course_id, key.date).await?;
        let existing = match existing {
            Some(record) => record,
            None => {
                let (record, created) = AttendanceRecord::insert_if_absent(
                    db,
                    NewRecord {
                        student_id: key.student_id,
                        course_id: key.course_id,
                        attendance_date: key.date,
                        status: mark.status,
                        check_in_time: stamp(None),
                        remarks: mark.remarks.clone(),
                        location: mark.location.clone(),
                    },
                    now,
                )
                .await?;
                if created {
                    return Ok(record);
                }
                // Another process created it between our read and insert.
                record
            }
        };

        let check_in_time = stamp(existing.check_in_time);
        existing
            .overwrite(db, mark.status, check_in_time, mark.remarks, mark.location, now)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use db::models::course;
    use db::test_utils::setup_test_db;
    use sea_orm::DatabaseConnection;

    async fn key_for(db: &DatabaseConnection) -> RecordKey {
        let course = course::Model::create(db, "COS333", "Networks", None, 3)
            .await
            .unwrap();
        RecordKey {
            student_id: 77,
            course_id: course.id,
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
        }
    }

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn status_names_parse_case_insensitively() {
        assert_eq!(parse_status("present").unwrap(), AttendanceStatus::Present);
        assert_eq!(parse_status(" Excused ").unwrap(), AttendanceStatus::Excused);
        assert!(matches!(
            parse_status("HERE"),
            Err(AttendanceError::InvalidStatus(raw)) if raw == "HERE"
        ));
    }

    #[tokio::test]
    async fn repeated_check_in_keeps_first_time() {
        let db = setup_test_db().await;
        let ledger = AttendanceLedger::new();
        let guard = ledger.lock(key_for(&db).await).await;

        let first = ledger.check_in(&db, &guard, nine_am()).await.unwrap();
        let second = ledger
            .check_in(&db, &guard, nine_am() + Duration::minutes(3))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, AttendanceStatus::Present);
        assert_eq!(second.check_in_time, Some(nine_am()));
    }

    #[tokio::test]
    async fn check_in_leaves_a_manual_mark_alone() {
        let db = setup_test_db().await;
        let ledger = AttendanceLedger::new();
        let guard = ledger.lock(key_for(&db).await).await;

        ledger
            .apply_mark(&db, &guard, ManualMark::new(AttendanceStatus::Excused), nine_am())
            .await
            .unwrap();
        let record = ledger.check_in(&db, &guard, nine_am()).await.unwrap();

        assert_eq!(record.status, AttendanceStatus::Excused);
        assert_eq!(record.check_in_time, None);
    }

    #[tokio::test]
    async fn present_mark_stamps_check_in_once() {
        let db = setup_test_db().await;
        let ledger = AttendanceLedger::new();
        let guard = ledger.lock(key_for(&db).await).await;

        let marked = ledger
            .apply_mark(&db, &guard, ManualMark::new(AttendanceStatus::Present), nine_am())
            .await
            .unwrap();
        assert_eq!(marked.check_in_time, Some(nine_am()));

        let later = nine_am() + Duration::minutes(30);
        let absent = ledger
            .apply_mark(&db, &guard, ManualMark::new(AttendanceStatus::Absent), later)
            .await
            .unwrap();
        let present_again = ledger
            .apply_mark(&db, &guard, ManualMark::new(AttendanceStatus::Present), later)
            .await
            .unwrap();

        assert_eq!(absent.id, marked.id);
        assert_eq!(absent.check_in_time, Some(nine_am()));
        assert_eq!(present_again.check_in_time, Some(nine_am()));
    }

    #[tokio::test]
    async fn remarks_survive_a_mark_without_remarks() {
        let db = setup_test_db().await;
        let ledger = AttendanceLedger::new();
        let guard = ledger.lock(key_for(&db).await).await;

        let mut late = ManualMark::new(AttendanceStatus::Late);
        late.remarks = Some("bus strike".into());
        late.location = Some("IT 2-27".into());
        ledger.apply_mark(&db, &guard, late, nine_am()).await.unwrap();

        let record = ledger
            .apply_mark(&db, &guard, ManualMark::new(AttendanceStatus::Excused), nine_am())
            .await
            .unwrap();

        assert_eq!(record.status, AttendanceStatus::Excused);
        assert_eq!(record.remarks.as_deref(), Some("bus strike"));
        assert_eq!(record.location.as_deref(), Some("IT 2-27"));
    }
}
