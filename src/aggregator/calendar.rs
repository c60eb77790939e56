use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[rustfmt::skip]
pub const US_STATES: [(&str, &str); 51] = [
    ("AL", "Alabama"), ("AK", "Alaska"), ("AZ", "Arizona"), ("AR", "Arkansas"),
    ("CA", "California"), ("CO", "Colorado"), ("CT", "Connecticut"), ("DE", "Delaware"),
    ("FL", "Florida"), ("GA", "Georgia"), ("HI", "Hawaii"), ("ID", "Idaho"),
    ("IL", "Illinois"), ("IN", "Indiana"), ("IA", "Iowa"), ("KS", "Kansas"),
    ("KY", "Kentucky"), ("LA", "Louisiana"), ("ME", "Maine"), ("MD", "Maryland"),
    ("MA", "Massachusetts"), ("MI", "Michigan"), ("MN", "Minnesota"), ("MS", "Mississippi"),
    ("MO", "Missouri"), ("MT", "Montana"), ("NE", "Nebraska"), ("NV", "Nevada"),
    ("NH", "New Hampshire"), ("NJ", "New Jersey"), ("NM", "New Mexico"), ("NY", "New York"),
    ("NC", "North Carolina"), ("ND", "North Dakota"), ("OH", "Ohio"), ("OK", "Oklahoma"),
    ("OR", "Oregon"), ("PA", "Pennsylvania"), ("RI", "Rhode Island"), ("SC", "South Carolina"),
    ("SD", "South Dakota"), ("TN", "Tennessee"), ("TX", "Texas"), ("UT", "Utah"),
    ("VT", "Vermont"), ("VA", "Virginia"), ("WA", "Washington"), ("WV", "West Virginia"),
    ("WI", "Wisconsin"), ("WY", "Wyoming"), ("DC", "District of Columbia"),
];

#[rustfmt::skip]
pub const SPORTS: [&str; 13] = [
    "basketball", "football", "baseball", "softball", "hockey",
    "volleyball", "soccer", "lacrosse", "rugby", "waterpolo",
    "fieldhockey", "wrestling", "flagfootball",
];

pub const SQUADS: [(i64, &str); 3] = [
    (1010, "Boys Varsity"),
    (1020, "Boys JV"),
    (1040, "Girls Varsity"),
];

/// Monday..=Sunday of the week containing `today`.
pub fn current_week_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// Widen a calendar date to the API's date-time bound: start of day, or the
/// last second of the day when `end` is set.
pub fn to_api_datetime(date: NaiveDate, end: bool) -> String {
    let time = if end { "23:59:59" } else { "00:00:00" };
    format!("{} {}", date.format(DATE_FORMAT), time)
}

pub fn parse_api_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), API_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Short table label, e.g. "Jan 9".
pub fn short_date_label(raw: &str) -> String {
    match parse_api_datetime(raw) {
        Some(dt) => dt.format("%b %-d").to_string(),
        None => raw.to_string(),
    }
}

pub fn is_known_state(code: &str) -> bool {
    US_STATES.iter().any(|(c, _)| *c == code)
}

pub fn is_known_sport(sport: &str) -> bool {
    SPORTS.contains(&sport)
}

pub fn squad_label(id: i64) -> Option<&'static str> {
    SQUADS.iter().find(|(s, _)| *s == id).map(|(_, label)| *label)
}
