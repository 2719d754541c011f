use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub subjects: Option<Vec<String>>,
    pub availability: Option<Vec<String>>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub hourly_rate: Option<i32>,
}
