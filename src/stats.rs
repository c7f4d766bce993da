use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{PracticeSession, ScheduleEntry, Song, SongStatus};
use crate::store::date_key;

/// Overall mastery of a song: the rounded mean of its component progress
/// values, or 0 for a song with no components.
pub fn song_mastery(song: &Song) -> i64 {
    if song.components.is_empty() {
        return 0;
    }
    let total: i64 = song.components.iter().map(|c| c.progress.clamp(0, 100)).sum();
    ((total as f64) / (song.components.len() as f64)).round() as i64
}

/// Completion percentage of a project, recomputed from actual song
/// membership. A song counts as completed when it is Performance Ready.
/// The denormalized counters on the project row are never consulted.
pub fn project_completion(songs: &[Song], project_id: &str) -> i64 {
    let total = songs.iter().filter(|s| s.project_id == project_id).count();
    if total == 0 {
        return 0;
    }
    let completed = songs
        .iter()
        .filter(|s| s.project_id == project_id && s.status == SongStatus::PerformanceReady)
        .count();
    ((completed as f64) / (total as f64) * 100.0).round() as i64
}

/// Repertoire-wide mastery: Performance Ready songs over all songs.
pub fn overall_mastery(songs: &[Song]) -> i64 {
    if songs.is_empty() {
        return 0;
    }
    let completed = songs
        .iter()
        .filter(|s| s.status == SongStatus::PerformanceReady)
        .count();
    ((completed as f64) / (songs.len() as f64) * 100.0).round() as i64
}

/// Consecutive calendar days, walking backward from `today`, on which the
/// schedule has at least one completed entry. Counting stops at the first
/// day without one.
pub fn day_streak(schedule: &HashMap<String, Vec<ScheduleEntry>>, today: NaiveDate) -> i64 {
    let mut streak = 0;
    let mut day = today;
    loop {
        let done = schedule
            .get(&date_key(day))
            .map(|entries| entries.iter().any(|e| e.completed))
            .unwrap_or(false);
        if !done {
            break;
        }
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Songs that want practice: in progress, or untouched for over a week.
pub fn needs_attention(songs: &[Song], now: DateTime<Utc>) -> Vec<Song> {
    let stale_before = now - Duration::days(7);
    songs
        .iter()
        .filter(|s| {
            s.status == SongStatus::InProgress
                || s.last_played.map(|p| p < stale_before).unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Minutes logged across all songs in the trailing seven days.
pub fn minutes_this_week(
    sessions: &HashMap<String, Vec<PracticeSession>>,
    now: DateTime<Utc>,
) -> i64 {
    let week_ago = now - Duration::days(7);
    sessions
        .values()
        .flatten()
        .filter(|s| s.date > week_ago && s.date <= now)
        .map(|s| s.duration_minutes)
        .sum()
}
