pub mod attendance_dto;
pub mod session_dto;
