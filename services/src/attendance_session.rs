use crate::attendance_record::{parse_status, AttendanceLedger, ManualMark, RecordKey};
use crate::catalog::{ClassMeeting, ScheduleCatalog};
use crate::clock::Clock;
use crate::error::{AttendanceError, AttendanceResult};
use crate::key_lock::KeyedLocks;
use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::Model as AttendanceRecord;
use db::models::attendance_session::{SessionStatus, DEFAULT_AUTO_CLOSE_MINUTES};
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info};

pub use db::models::attendance_session::{Entity as AttendanceSessionEntity, Model as AttendanceSession};

/// Identity of a sign-in window: one class meeting on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub meeting_id: i64,
    pub date: NaiveDate,
}

/// A manual mark as submitted by a teacher, status still unparsed.
#[derive(Debug, Clone)]
pub struct MarkRequest {
    pub student_id: i64,
    pub status: String,
    pub remarks: Option<String>,
    pub location: Option<String>,
}

/// Owns every state change of attendance sessions and, through the ledger,
/// of attendance records.
///
/// Each transition runs under the key lock of the session it touches and
/// inside one database transaction. Catalog lookups happen before the
/// transaction opens.
#[derive(Clone)]
pub struct AttendanceSessionService {
    db: DatabaseConnection,
    catalog: Arc<dyn ScheduleCatalog>,
    clock: Arc<dyn Clock>,
    ledger: AttendanceLedger,
    session_locks: KeyedLocks<SessionKey>,
    auto_close_minutes: i32,
}

impl AttendanceSessionService {
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<dyn ScheduleCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            catalog,
            clock,
            ledger: AttendanceLedger::new(),
            session_locks: KeyedLocks::new(),
            auto_close_minutes: DEFAULT_AUTO_CLOSE_MINUTES,
        }
    }

    /// Window length stamped onto sessions created from now on.
    pub fn with_auto_close_minutes(mut self, minutes: i32) -> Self {
        self.auto_close_minutes = minutes.max(1);
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn catalog(&self) -> Arc<dyn ScheduleCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    async fn require_meeting(&self, meeting_id: i64) -> AttendanceResult<ClassMeeting> {
        self.catalog
            .meeting(meeting_id)
            .await?
            .ok_or_else(|| AttendanceError::NotFound(format!("Class meeting {meeting_id}")))
    }

    async fn require_owner(&self, meeting_id: i64, teacher_id: i64) -> AttendanceResult<()> {
        let owner = self
            .catalog
            .owner_of(meeting_id)
            .await?
            .ok_or_else(|| AttendanceError::NotFound(format!("Class meeting {meeting_id}")))?;
        ensure_teaches(owner, meeting_id, teacher_id)
    }

    async fn require_enrolled(&self, student_id: i64, course_id: i64) -> AttendanceResult<()> {
        if self.catalog.is_enrolled(student_id, course_id).await? {
            Ok(())
        } else {
            Err(AttendanceError::NotEnrolled {
                student_id,
                course_id,
            })
        }
    }

    /// Opens the sign-in window, creating the session on first use.
    ///
    /// Unlocking an already open session restarts its auto-close timer.
    /// Unlocking a closed one reopens it.
    pub async fn unlock(
        &self,
        meeting_id: i64,
        date: NaiveDate,
        teacher_id: i64,
    ) -> AttendanceResult<AttendanceSession> {
        self.require_owner(meeting_id, teacher_id).await?;

        let _guard = self.session_locks.lock(SessionKey { meeting_id, date }).await;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let session = AttendanceSession::find_or_create(
            &txn,
            meeting_id,
            date,
            self.auto_close_minutes,
            now,
        )
        .await?;
        let previous = session.status;
        let session = session.set_unlocked(&txn, teacher_id, now).await?;
        txn.commit().await?;

        info!(
            meeting_id,
            %date,
            teacher_id,
            from = %previous,
            "Attendance session unlocked"
        );
        Ok(session)
    }

    /// Closes the sign-in window by hand.
    ///
    /// Only an open session changes; locking a LOCKED or CLOSED session
    /// returns it as it is.
    pub async fn lock(
        &self,
        meeting_id: i64,
        date: NaiveDate,
        teacher_id: i64,
    ) -> AttendanceResult<AttendanceSession> {
        self.require_owner(meeting_id, teacher_id).await?;

        let _guard = self.session_locks.lock(SessionKey { meeting_id, date }).await;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let session = AttendanceSession::find_by_key(&txn, meeting_id, date)
            .await?
            .ok_or_else(|| {
                AttendanceError::NotFound(format!(
                    "Attendance session for meeting {meeting_id} on {date}"
                ))
            })?;
        if session.status != SessionStatus::Unlocked {
            debug!(meeting_id, %date, status = %session.status, "Lock on a session that is not open");
            return Ok(session);
        }

        let session = session.set_locked(&txn, now).await?;
        txn.commit().await?;

        info!(meeting_id, %date, teacher_id, "Attendance session locked");
        Ok(session)
    }

    /// Student sign-in. Succeeds only while the window is open and yields the
    /// same record however often it is repeated.
    pub async fn sign_in(
        &self,
        meeting_id: i64,
        date: NaiveDate,
        student_id: i64,
    ) -> AttendanceResult<AttendanceRecord> {
        let meeting = self.require_meeting(meeting_id).await?;
        self.require_enrolled(student_id, meeting.course_id).await?;

        let _session_guard = self.session_locks.lock(SessionKey { meeting_id, date }).await;
        let record_guard = self
            .ledger
            .lock(RecordKey {
                student_id,
                course_id: meeting.course_id,
                date,
            })
            .await;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let status = AttendanceSession::find_by_key(&txn, meeting_id, date)
            .await?
            .map_or(SessionStatus::Locked, |s| s.effective_status(now));
        if status != SessionStatus::Unlocked {
            return Err(AttendanceError::SignInUnavailable(status));
        }

        let record = self.ledger.check_in(&txn, &record_guard, now).await?;
        txn.commit().await?;

        info!(
            meeting_id,
            %date,
            student_id,
            course_id = meeting.course_id,
            "Student signed in"
        );
        Ok(record)
    }

    /// Teacher override of a student's record, allowed whatever the session
    /// state and even when no session exists.
    pub async fn mark_manually(
        &self,
        meeting_id: i64,
        date: NaiveDate,
        teacher_id: i64,
        request: MarkRequest,
    ) -> AttendanceResult<AttendanceRecord> {
        let meeting = self.require_meeting(meeting_id).await?;
        ensure_teaches(meeting.teacher_id, meeting_id, teacher_id)?;
        self.require_enrolled(request.student_id, meeting.course_id)
            .await?;
        let status = parse_status(&request.status)?;

        let record_guard = self
            .ledger
            .lock(RecordKey {
                student_id: request.student_id,
                course_id: meeting.course_id,
                date,
            })
            .await;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let mark = ManualMark {
            status,
            remarks: request.remarks,
            location: request.location,
        };
        let record = self.ledger.apply_mark(&txn, &record_guard, mark, now).await?;
        txn.commit().await?;

        info!(
            meeting_id,
            %date,
            teacher_id,
            student_id = request.student_id,
            status = %status,
            "Attendance marked manually"
        );
        Ok(record)
    }

    /// Closes the session if it is still open and past its window.
    ///
    /// Returns the closed session, or `None` when there was nothing to do.
    pub async fn close_if_expired(
        &self,
        session_id: i64,
    ) -> AttendanceResult<Option<AttendanceSession>> {
        let Some(found) = AttendanceSessionEntity::find_by_id(session_id)
            .one(&self.db)
            .await?
        else {
            return Err(AttendanceError::NotFound(format!(
                "Attendance session {session_id}"
            )));
        };
        let (meeting_id, date) = (found.meeting_id, found.session_date);

        let _guard = self.session_locks.lock(SessionKey { meeting_id, date }).await;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let current = AttendanceSession::find_by_key(&txn, meeting_id, date).await?;
        let Some(session) = current.filter(|s| s.is_expired(now)) else {
            return Ok(None);
        };
        let unlocked_at = session.unlocked_at;
        let session = session.set_closed(&txn, now).await?;
        txn.commit().await?;

        info!(
            session_id,
            meeting_id,
            %date,
            unlocked_at = ?unlocked_at,
            "Attendance session auto-closed"
        );
        Ok(Some(session))
    }

    /// Sessions currently in the UNLOCKED state, expired or not.
    pub async fn open_sessions(&self) -> AttendanceResult<Vec<AttendanceSession>> {
        Ok(AttendanceSession::find_unlocked(&self.db).await?)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

fn ensure_teaches(owner_id: i64, meeting_id: i64, teacher_id: i64) -> AttendanceResult<()> {
    if owner_id == teacher_id {
        Ok(())
    } else {
        Err(AttendanceError::Unauthorized(format!(
            "teacher {teacher_id} does not teach class meeting {meeting_id}"
        )))
    }
}
