pub mod attempt_dto;
pub mod auth_dto;
pub mod booking_dto;
pub mod profile_dto;
pub mod quiz_dto;
