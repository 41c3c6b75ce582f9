use crate::models::{CheckinStats, CheckinStore, WeekProgress, DAYS_PER_WEEK, TOTAL_DAYS};

pub fn build_stats(store: &CheckinStore) -> CheckinStats {
    build_stats_for_count(u32::try_from(store.len()).unwrap_or(u32::MAX))
}

/// Progress is measured by volume: the first seven check-ins fill week one,
/// the next seven week two, whichever days they belong to.
pub fn build_stats_for_count(checked_days: u32) -> CheckinStats {
    CheckinStats {
        total_days: TOTAL_DAYS,
        checked_days,
        remaining_days: TOTAL_DAYS.saturating_sub(checked_days),
        progress_percentage: percentage(checked_days, TOTAL_DAYS),
        week_progress: WeekProgress {
            week1: week_percentage(checked_days, 0),
            week2: week_percentage(checked_days, 1),
            week3: week_percentage(checked_days, 2),
        },
    }
}

fn week_percentage(checked_days: u32, week_index: u32) -> f64 {
    let filled = checked_days
        .saturating_sub(week_index * DAYS_PER_WEEK)
        .min(DAYS_PER_WEEK);
    percentage(filled, DAYS_PER_WEEK)
}

fn percentage(part: u32, whole: u32) -> f64 {
    f64::from(part) / f64::from(whole) * 100.0
}
