use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkAttendanceRequest {
    /// Scanned session code, exactly as rendered in the QR payload. The
    /// lower bound matches `config::MIN_SESSION_CODE_LENGTH`; config refuses
    /// to issue codes this filter would reject.
    #[validate(length(min = 8, max = 64))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceResponse {
    pub marked: bool,
    pub subject: String,
    pub classroom: String,
}
