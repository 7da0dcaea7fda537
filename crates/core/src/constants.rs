/// Average year length used to turn a time span into a year fraction.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Milliseconds in a day.
pub const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Tolerance for comparing allocation amounts and percentage sums against zero.
pub const ALLOCATION_EPSILON: f64 = 1e-9;

/// How far split percentages may drift from 100 before the plan warns about it.
pub const SPLIT_SUM_TOLERANCE: f64 = 0.5;

/// Maximum length of a goal title.
pub const MAX_GOAL_TITLE_LEN: usize = 120;

/// Maximum expected annual rate of return, in percent.
pub const MAX_EXPECTED_RATE: f64 = 100.0;

/// Number of digits in a one-time login code.
pub const LOGIN_CODE_DIGITS: u32 = 6;

/// How long a login code stays valid, in minutes.
pub const LOGIN_CODE_TTL_MINUTES: i64 = 10;

/// Failed verification attempts allowed per login code.
pub const LOGIN_CODE_MAX_ATTEMPTS: i32 = 5;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum length of an analytics event name.
pub const MAX_EVENT_NAME_LEN: usize = 64;

/// Maximum length of an analytics event path.
pub const MAX_EVENT_PATH_LEN: usize = 512;
