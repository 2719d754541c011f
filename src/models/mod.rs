pub mod attempt;
pub mod audit_log;
pub mod profile;
pub mod question;
pub mod quiz;
pub mod quiz_result;
pub mod session;
