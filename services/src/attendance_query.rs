//! Read-only views over sessions and records. Nothing here writes.

use crate::attendance_session::{AttendanceSession, AttendanceSessionService};
use crate::catalog::{ClassMeeting, ScheduleCatalog};
use crate::clock::Clock;
use crate::error::{AttendanceError, AttendanceResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use db::models::attendance_record::{self, AttendanceStatus};
use db::models::attendance_session::SessionStatus;
use db::models::class_meeting::DayOfWeek;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Who is asking. Decides which meetings a day view lists and whether the
/// student summary is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

/// One meeting on the requested day and the state of its sign-in window.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingDay {
    #[serde(flatten)]
    pub meeting: ClassMeeting,
    pub session_id: Option<i64>,
    pub session_status: SessionStatus,
    pub unlocked_at: Option<DateTime<Utc>>,
    /// When an open window will auto-close.
    pub closes_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<StudentAttendance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentAttendance {
    pub has_signed_in: bool,
    pub status: Option<AttendanceStatus>,
    /// PRESENT records for this course, all dates.
    pub attended_classes: u64,
    /// Sessions of this course that were ever opened, all meetings and dates.
    pub total_signed_classes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub student_id: i64,
    pub attended: bool,
    pub status: Option<AttendanceStatus>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

#[derive(Clone)]
pub struct AttendanceQueryService {
    db: DatabaseConnection,
    catalog: Arc<dyn ScheduleCatalog>,
    clock: Arc<dyn Clock>,
}

impl From<&AttendanceSessionService> for AttendanceQueryService {
    fn from(sessions: &AttendanceSessionService) -> Self {
        Self::new(sessions.db().clone(), sessions.catalog(), sessions.clock())
    }
}

impl AttendanceQueryService {
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<dyn ScheduleCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, catalog, clock }
    }

    pub async fn session(
        &self,
        meeting_id: i64,
        date: NaiveDate,
    ) -> AttendanceResult<Option<AttendanceSession>> {
        Ok(AttendanceSession::find_by_key(&self.db, meeting_id, date).await?)
    }

    /// The person's meetings on `date`'s weekday, earliest first.
    ///
    /// Meetings without a session show as LOCKED. An open session already
    /// past its window shows as CLOSED even before the sweeper gets to it.
    pub async fn day_view(
        &self,
        person_id: i64,
        role: Role,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<MeetingDay>> {
        let weekday = DayOfWeek::from(date.weekday());
        let meetings = match role {
            Role::Teacher => {
                self.catalog
                    .meetings_for_teacher_on_weekday(person_id, weekday)
                    .await?
            }
            Role::Student => {
                self.catalog
                    .meetings_for_student_on_weekday(person_id, weekday)
                    .await?
            }
        };

        let meeting_ids = meetings.iter().map(|m| m.id).collect();
        let mut sessions: HashMap<i64, AttendanceSession> =
            AttendanceSession::find_for_meetings_on(&self.db, meeting_ids, date)
                .await?
                .into_iter()
                .map(|s| (s.meeting_id, s))
                .collect();

        let now = self.clock.now();
        let mut summaries: HashMap<i64, StudentAttendance> = HashMap::new();
        let mut days = Vec::with_capacity(meetings.len());

        for meeting in meetings {
            let session = sessions.remove(&meeting.id);
            let session_status = session
                .as_ref()
                .map_or(SessionStatus::Locked, |s| s.effective_status(now));
            let closes_at = session
                .as_ref()
                .filter(|_| session_status == SessionStatus::Unlocked)
                .and_then(AttendanceSession::expires_at);

            let attendance = match role {
                Role::Teacher => None,
                Role::Student => {
                    let summary = match summaries.get(&meeting.course_id) {
                        Some(summary) => summary.clone(),
                        None => {
                            let summary =
                                self.student_summary(person_id, meeting.course_id, date).await?;
                            summaries.insert(meeting.course_id, summary.clone());
                            summary
                        }
                    };
                    Some(summary)
                }
            };

            days.push(MeetingDay {
                session_id: session.as_ref().map(|s| s.id),
                unlocked_at: session.as_ref().and_then(|s| s.unlocked_at),
                session_status,
                closes_at,
                attendance,
                meeting,
            });
        }

        Ok(days)
    }

    async fn student_summary(
        &self,
        student_id: i64,
        course_id: i64,
        date: NaiveDate,
    ) -> AttendanceResult<StudentAttendance> {
        let record =
            attendance_record::Model::find_by_key(&self.db, student_id, course_id, date).await?;
        let attended_classes = attendance_record::Model::count_with_status(
            &self.db,
            student_id,
            course_id,
            AttendanceStatus::Present,
        )
        .await?;

        let course_meetings = self
            .catalog
            .meetings_for_course(course_id)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let total_signed_classes =
            AttendanceSession::count_not_locked(&self.db, course_meetings).await?;

        let status = record.map(|r| r.status);
        Ok(StudentAttendance {
            has_signed_in: status == Some(AttendanceStatus::Present),
            status,
            attended_classes,
            total_signed_classes,
        })
    }

    /// Enrolled students of the meeting's course with their record for `date`.
    pub async fn roster(
        &self,
        meeting_id: i64,
        date: NaiveDate,
        teacher_id: i64,
    ) -> AttendanceResult<Vec<RosterEntry>> {
        let meeting = self
            .catalog
            .meeting(meeting_id)
            .await?
            .ok_or_else(|| AttendanceError::NotFound(format!("Class meeting {meeting_id}")))?;
        if meeting.teacher_id != teacher_id {
            return Err(AttendanceError::Unauthorized(format!(
                "teacher {teacher_id} does not teach class meeting {meeting_id}"
            )));
        }

        let students = self.catalog.enrolled_students(meeting.course_id).await?;
        let mut records: HashMap<i64, attendance_record::Model> =
            attendance_record::Model::find_for_course_on(&self.db, meeting.course_id, date)
                .await?
                .into_iter()
                .map(|r| (r.student_id, r))
                .collect();

        Ok(students
            .into_iter()
            .map(|student_id| match records.remove(&student_id) {
                Some(record) => RosterEntry {
                    student_id,
                    attended: true,
                    status: Some(record.status),
                    check_in_time: record.check_in_time,
                    remarks: record.remarks,
                },
                None => RosterEntry {
                    student_id,
                    attended: false,
                    status: None,
                    check_in_time: None,
                    remarks: None,
                },
            })
            .collect())
    }
}
