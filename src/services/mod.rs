pub mod attempt_service;
pub mod audit_service;
pub mod generator_service;
pub mod matching_service;
pub mod profile_service;
pub mod quiz_service;
pub mod result_service;
pub mod reward_service;
pub mod scoring;
pub mod session_service;
