// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "9000";
pub const DEFAULT_DATA_PATH: &str = "data";

// Token configuration
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 300;
pub const MIN_TOKEN_SECRET_LENGTH: usize = 32;

// Validation limits
pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;
pub const MAX_LOGIN_LENGTH: usize = 50;
pub const MIN_LOGIN_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Error messages
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_INVALID_PASSWORD: &str = "Invalid Password";
pub const ERR_ACCESS_DENIED: &str = "Access denied";
pub const ERR_INVALID_TOKEN: &str = "Invalid token";
