// SPDX-License-Identifier: MPL-2.0

//! Group entries by calendar day

use super::entry::JournalEntry;
use chrono::{Local, NaiveDate, TimeZone};

/// Entries that share a calendar day, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub entries: Vec<JournalEntry>,
}

/// Group by local calendar day, newest day first
pub fn group_by_day(entries: Vec<JournalEntry>) -> Vec<TimelineDay> {
    group_by_day_in(entries, &Local)
}

/// Group by calendar day in `tz`, newest day first
pub fn group_by_day_in<Tz: TimeZone>(mut entries: Vec<JournalEntry>, tz: &Tz) -> Vec<TimelineDay> {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut days: Vec<TimelineDay> = Vec::new();
    for entry in entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => day.entries.push(entry),
            _ => days.push(TimelineDay {
                date,
                entries: vec![entry],
            }),
        }
    }
    days
}
