/// Input formats accepted from collaborators (CLI prompts, form fields).
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
pub const TIME_INPUT_FORMAT: &str = "%H:%M";
pub const DATETIME_INPUT_FORMAT: &str =
    const_str::concat!(DATE_INPUT_FORMAT, " ", TIME_INPUT_FORMAT);

/// Compact form used when handing instants to the `rrule` crate.
pub const ICAL_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Recurrence end dates are entered as a bare date and cover that whole day.
pub const RECURRENCE_UNTIL_HOUR: u32 = 23;
pub const RECURRENCE_UNTIL_MINUTE: u32 = 59;

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

pub const DEFAULT_STORE_FILE: &str = "bookings.json";
pub const CONFIG_FILE_STEM: &str = "yoyaku";
pub const ENV_PREFIX: &str = "YOYAKU";
