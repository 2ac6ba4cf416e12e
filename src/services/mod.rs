pub mod attendance_service;
pub mod report_service;
pub mod session_service;
