pub mod fee_service;
pub mod otp_service;
pub mod ping_service;
pub mod receipt_service;
pub mod session_service;
pub mod transfer_service;
pub mod validation_service;
pub mod view_service;
pub mod wizard_service;
