pub mod jwt;
pub mod password;
pub mod referral;

pub use jwt::{encode_reset_token, encode_session_token, encode_verification_token};
pub use password::{hash_password, verify_password};
pub use referral::generate_referral_code;
