//! Human-readable "when was this spotted" strings.

use chrono::{DateTime, TimeZone};

/// Describes `date` relative to `base` by calendar day, in the style of
/// "today at 3:04 PM", "last Monday at 9:15 AM" or "07/14/2024".
///
/// Both instants are compared in `date`'s timezone, so callers that want
/// local wording should pass local times.
pub fn format_relative<Tz: TimeZone>(date: &DateTime<Tz>, base: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let base = base.with_timezone(&date.timezone());
    let days = date
        .date_naive()
        .signed_duration_since(base.date_naive())
        .num_days();

    let time = date.format("%-I:%M %p");
    match days {
        d if d < -6 => date.format("%m/%d/%Y").to_string(),
        d if d < -1 => format!("last {} at {}", date.format("%A"), time),
        -1 => format!("yesterday at {time}"),
        0 => format!("today at {time}"),
        1 => format!("tomorrow at {time}"),
        d if d < 7 => format!("{} at {}", date.format("%A"), time),
        _ => date.format("%m/%d/%Y").to_string(),
    }
}
