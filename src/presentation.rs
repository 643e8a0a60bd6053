//! Timing and labelling rules behind the public site's visual effects.
//!
//! The front end animates these; the server publishes the schedules so every
//! client renders the same sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Splash progress
// ============================================================================

pub const SPLASH_STEP: u8 = 2;
pub const SPLASH_TICK: Duration = Duration::from_millis(30);
pub const SPLASH_SETTLE: Duration = Duration::from_millis(500);

/// Simulated loading progress: 0, 2, 4, ... clamped at 100.
#[derive(Debug, Clone)]
pub struct SplashProgress {
    next: Option<u8>,
}

impl SplashProgress {
    pub fn new() -> Self {
        Self { next: Some(0) }
    }
}

impl Default for SplashProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for SplashProgress {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let current = self.next?;
        self.next = (current < 100).then(|| current.saturating_add(SPLASH_STEP).min(100));
        Some(current)
    }
}

/// Time from first tick until the splash completes, settle delay included.
pub fn splash_duration() -> Duration {
    let ticks = SplashProgress::new().count().saturating_sub(1) as u32;
    SPLASH_TICK * ticks + SPLASH_SETTLE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplashSchedule {
    pub step: u8,
    pub tick_ms: u64,
    pub settle_ms: u64,
    pub total_ms: u64,
}

impl SplashSchedule {
    pub fn standard() -> Self {
        Self {
            step: SPLASH_STEP,
            tick_ms: SPLASH_TICK.as_millis() as u64,
            settle_ms: SPLASH_SETTLE.as_millis() as u64,
            total_ms: splash_duration().as_millis() as u64,
        }
    }
}

// ============================================================================
// Typewriter
// ============================================================================

pub const TYPEWRITER_TICK: Duration = Duration::from_millis(100);

/// Every prefix of `text` from empty to complete, split on char boundaries.
pub fn typewriter_frames(text: &str) -> Vec<&str> {
    std::iter::once(0)
        .chain(text.char_indices().map(|(i, c)| i + c.len_utf8()))
        .map(|end| &text[..end])
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypewriterSchedule {
    pub text: String,
    pub tick_ms: u64,
    pub total_ms: u64,
}

impl TypewriterSchedule {
    pub fn for_text(text: &str) -> Self {
        let ticks = typewriter_frames(text).len().saturating_sub(1) as u32;
        Self {
            text: text.to_string(),
            tick_ms: TYPEWRITER_TICK.as_millis() as u64,
            total_ms: (TYPEWRITER_TICK * ticks).as_millis() as u64,
        }
    }
}

// ============================================================================
// Count-up
// ============================================================================

pub const COUNT_UP_DURATION: Duration = Duration::from_millis(2000);
pub const COUNT_UP_TICK: Duration = Duration::from_millis(100);

/// Displayed value at `progress` (0..=1) of a count-up to `end`.
pub fn count_up(end: u32, progress: f64) -> u32 {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    (progress * f64::from(end)).floor() as u32
}

/// Value shown at each tick of a count-up to `end`, first frame 0, last `end`.
pub fn count_up_frames(end: u32) -> Vec<u32> {
    let ticks = (COUNT_UP_DURATION.as_millis() / COUNT_UP_TICK.as_millis()) as u32;
    (0..=ticks)
        .map(|tick| count_up(end, f64::from(tick) / f64::from(ticks)))
        .collect()
}

// ============================================================================
// Activity labels
// ============================================================================

/// Verb phrase for a GitHub public event.
pub fn describe_event(kind: &str, commit_count: usize) -> String {
    match kind {
        "PushEvent" => format!(
            "Pushed {} commit{} to",
            commit_count,
            if commit_count > 1 { "s" } else { "" }
        ),
        "WatchEvent" => "Starred".to_string(),
        "ForkEvent" => "Forked".to_string(),
        "CreateEvent" => "Created".to_string(),
        _ => "Updated".to_string(),
    }
}

/// "Just now", "3h ago", "2d ago", or the date once a week has passed.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - at).num_hours();
    match hours {
        h if h < 1 => "Just now".to_string(),
        h if h < 24 => format!("{}h ago", h),
        h if h < 24 * 7 => format!("{}d ago", h / 24),
        _ => at.format("%b %-d, %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_splash_progress_steps_and_clamps() {
        let values: Vec<u8> = SplashProgress::new().collect();
        assert_eq!(values.first(), Some(&0));
        assert_eq!(values[1], 2);
        assert_eq!(values.last(), Some(&100));
        assert_eq!(values.len(), 51);
        assert!(values.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_splash_duration_includes_settle() {
        assert_eq!(splash_duration(), Duration::from_millis(50 * 30 + 500));
        assert_eq!(SplashSchedule::standard().total_ms, 2000);
    }

    #[test]
    fn test_typewriter_frames_are_prefixes() {
        assert_eq!(typewriter_frames("abc"), vec!["", "a", "ab", "abc"]);
        assert_eq!(typewriter_frames(""), vec![""]);
        assert_eq!(typewriter_frames("né"), vec!["", "n", "né"]);
        assert_eq!(TypewriterSchedule::for_text("abc").total_ms, 300);
    }

    #[test]
    fn test_count_up_floors_and_clamps() {
        assert_eq!(count_up(25, 0.0), 0);
        assert_eq!(count_up(25, 0.5), 12);
        assert_eq!(count_up(25, 1.0), 25);
        assert_eq!(count_up(25, 1.7), 25);
        assert_eq!(count_up(25, -1.0), 0);
        assert_eq!(count_up(25, f64::NAN), 0);
    }

    #[test]
    fn test_count_up_frames_span_duration() {
        let frames = count_up_frames(12);
        assert_eq!(frames.len(), 21);
        assert_eq!(frames[0], 0);
        assert_eq!(frames[10], 6);
        assert_eq!(frames.last(), Some(&12));
        assert!(frames.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_describe_event() {
        assert_eq!(describe_event("PushEvent", 1), "Pushed 1 commit to");
        assert_eq!(describe_event("PushEvent", 3), "Pushed 3 commits to");
        assert_eq!(describe_event("WatchEvent", 0), "Starred");
        assert_eq!(describe_event("IssuesEvent", 0), "Updated");
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - chrono::Duration::minutes(59), now), "Just now");
        assert_eq!(time_ago(now - chrono::Duration::hours(5), now), "5h ago");
        assert_eq!(time_ago(now - chrono::Duration::hours(50), now), "2d ago");
        assert_eq!(time_ago(now - chrono::Duration::days(10), now), "Mar 10, 2024");
    }
}
