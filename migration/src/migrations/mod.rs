pub mod m202511030001_create_course_catalog;
pub mod m202511030002_create_attendance_sessions;
pub mod m202511030003_create_attendance_records;
