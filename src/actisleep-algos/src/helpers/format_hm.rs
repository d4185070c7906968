use chrono::{NaiveDateTime, NaiveTime, Timelike as _};

/// Clock-style rendering for the readable report mode.
pub trait FormatHM {
    fn format_hm(&self) -> String;
}

impl FormatHM for NaiveTime {
    fn format_hm(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FormatHM for NaiveDateTime {
    fn format_hm(&self) -> String {
        format!("{} {}", self.date(), self.time().format_hm())
    }
}

/// Minute counts and offsets render as signed hours and minutes.
impl FormatHM for i64 {
    fn format_hm(&self) -> String {
        let sign = if *self < 0 { "-" } else { "" };
        let minutes = self.abs();
        format!("{}{}:{:02}", sign, minutes / 60, minutes % 60)
    }
}
