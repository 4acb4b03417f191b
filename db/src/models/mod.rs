pub mod attendance_record;
pub mod attendance_session;
pub mod class_meeting;
pub mod course;
pub mod enrollment;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use class_meeting::Entity as ClassMeeting;
pub use course::Entity as Course;
pub use enrollment::Entity as Enrollment;
