//! Window Extractor
//!
//! Cuts the bounded run of events that follows a restart out of the log.
//! The window starts at the restart itself and, when trimmed, never leaves
//! the restart's match or period.

use crate::error::{EpisodeError, Result};
use crate::models::{Event, EventId, MatchId, MatchPeriod};
use crate::repository::EventLog;

/// Up to `n` events starting at `start_id`, in log order.
///
/// With `trim`, rows from another period and then rows from another match
/// are filtered out; the result may be shorter than `n`. Fewer than `n`
/// rows are also returned when the log ends first.
pub fn extract_window<'a>(
    log: &'a EventLog,
    start_id: EventId,
    n: usize,
    trim: bool,
) -> Result<Vec<&'a Event>> {
    if n == 0 {
        return Err(EpisodeError::InvalidInput(
            "window size must be positive".to_string(),
        ));
    }

    let start = log.position_of(start_id)?;
    let end = start.saturating_add(n).min(log.len());
    let rows = &log.events()[start..end];

    let window: Vec<&Event> = if trim {
        let first = &rows[0];
        trim_window(rows.iter(), first.match_id, first.match_period)
    } else {
        rows.iter().collect()
    };

    ensure_time_monotonic(&window)?;
    Ok(window)
}

/// Untrimmed rows starting at `start_id` for end-of-period detection.
///
/// Reaches at least one row past a `horizon`-row window, so the row after
/// any event of that window is visible even when it lies in the next
/// period or match.
pub fn extract_lookahead<'a>(
    log: &'a EventLog,
    start_id: EventId,
    horizon: usize,
    lookahead: usize,
) -> Result<Vec<&'a Event>> {
    extract_window(log, start_id, lookahead.max(horizon.saturating_add(1)), false)
}

/// Keep only rows of `period`, then only rows of `match_id`.
///
/// Idempotent: trimming a trimmed window changes nothing.
pub fn trim_window<'a, I>(rows: I, match_id: MatchId, period: MatchPeriod) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    rows.into_iter()
        .filter(|e| e.match_period == period)
        .filter(|e| e.match_id == match_id)
        .collect()
}

/// `eventSec` never decreases between neighbours of the same match and
/// period. The clock restarts at a period change, so those pairs are not
/// compared.
pub fn ensure_time_monotonic(window: &[&Event]) -> Result<()> {
    for pair in window.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.same_segment(next) && next.event_sec < prev.event_sec {
            return Err(EpisodeError::consistency(
                Some(next.match_id),
                Some(next.id),
                format!(
                    "eventSec goes backwards ({} after {}) in period {}",
                    next.event_sec, prev.event_sec, next.match_period
                ),
            ));
        }
    }
    Ok(())
}
