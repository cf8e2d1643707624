// src/store/fresh.rs

//! Collision-free, chronologically sortable job paths.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

static LAST_STAMP: Mutex<Option<DateTime<Utc>>> = Mutex::new(None);

/// Current UTC time, strictly later than any stamp handed out before in this
/// process.
///
/// A clock that hasn't advanced (coarse resolution, or a step backwards) is
/// bumped by one nanosecond past the previous stamp.
pub fn next_stamp() -> DateTime<Utc> {
    let mut last = LAST_STAMP.lock().unwrap_or_else(PoisonError::into_inner);

    let mut now = Utc::now();
    if let Some(prev) = *last {
        if now <= prev {
            now = prev + TimeDelta::nanoseconds(1);
        }
    }

    *last = Some(now);
    now
}

/// `<root>/<YYYY-MM-DD>/<HH:MM:SS.nnnnnnnnn>` for the given instant.
///
/// Both components are fixed width, so lexical order is chronological.
pub fn job_path(root: &Path, stamp: DateTime<Utc>) -> PathBuf {
    let day = stamp.format("%Y-%m-%d").to_string();
    let time = stamp.format("%H:%M:%S%.9f").to_string();
    root.join(day).join(time)
}
