pub mod attendance_query;
pub mod attendance_record;
pub mod attendance_session;
pub mod auto_close;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod key_lock;
