/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID_KEY: &str = "user_id";
