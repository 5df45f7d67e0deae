//! Assistant context window
//!
//! The chat assistant consumes a short trailing slice of the unified table.
//! Its window is counted in calendar days ending at the latest record,
//! a different unit from the 30-row trend window, which counts table rows.
//! The two are configured independently and never reconciled.

use crate::types::UnifiedDailyRecord;

/// Calendar days of history handed to the assistant
pub const ASSISTANT_CONTEXT_DAYS: i64 = 7;

/// Trailing slice of the date-sorted table covering the last `days`
/// calendar days, inclusive of the latest date.
pub fn recent_window(records: &[UnifiedDailyRecord], days: i64) -> &[UnifiedDailyRecord] {
    let Some(last) = records.last() else {
        return records;
    };
    let cutoff = last.date - chrono::Duration::days(days - 1);
    let start = records.partition_point(|r| r.date < cutoff);
    &records[start..]
}

/// The assistant's default context slice
pub fn assistant_context(records: &[UnifiedDailyRecord]) -> &[UnifiedDailyRecord] {
    recent_window(records, ASSISTANT_CONTEXT_DAYS)
}

/// Latest harmonized record, if any
pub fn latest(records: &[UnifiedDailyRecord]) -> Option<&UnifiedDailyRecord> {
    records.last()
}
