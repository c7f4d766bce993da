#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use crate::models::{
        ComponentKind, Difficulty, PracticeSession, ScheduleEntry, Song, SongComponent,
        SongStatus,
    };
    use crate::stats::{
        day_streak, minutes_this_week, needs_attention, overall_mastery, project_completion,
        song_mastery,
    };
    use crate::store::date_key;

    fn make_song(id: &str, project_id: &str, status: SongStatus, progress: &[i64]) -> Song {
        Song {
            id: id.to_string(),
            project_id: project_id.to_string(),
            title: format!("Song {}", id),
            artist: "Pink Floyd".to_string(),
            album: None,
            key: None,
            tempo: None,
            difficulty: Difficulty::Intermediate,
            status,
            tab_url: None,
            tab_content: None,
            backing_track_url: None,
            reference_url: None,
            notes: None,
            last_played: None,
            tone_preset_id: None,
            components: progress
                .iter()
                .enumerate()
                .map(|(i, p)| SongComponent {
                    id: format!("{}-c{}", id, i),
                    song_id: id.to_string(),
                    name: format!("Section {}", i),
                    kind: ComponentKind::Custom,
                    progress: *p,
                })
                .collect(),
        }
    }

    fn entry(song_id: &str, completed: bool) -> ScheduleEntry {
        ScheduleEntry {
            song_id: song_id.to_string(),
            completed,
            notes: String::new(),
            completed_at: None,
        }
    }

    #[test]
    fn test_song_mastery_is_rounded_mean_of_components() {
        let song = make_song("s1", "p1", SongStatus::InProgress, &[100, 50, 0]);
        assert_eq!(song_mastery(&song), 50);

        let song = make_song("s2", "p1", SongStatus::InProgress, &[100, 50]);
        assert_eq!(song_mastery(&song), 75);

        // Rounds instead of truncating
        let song = make_song("s3", "p1", SongStatus::InProgress, &[33, 33, 34]);
        assert_eq!(song_mastery(&song), 33);
        let song = make_song("s4", "p1", SongStatus::InProgress, &[50, 50, 51]);
        assert_eq!(song_mastery(&song), 50);
    }

    #[test]
    fn test_song_mastery_without_components_is_zero() {
        let song = make_song("s1", "p1", SongStatus::InProgress, &[]);
        assert_eq!(song_mastery(&song), 0);
    }

    #[test]
    fn test_project_completion_recomputes_from_membership() {
        let songs = vec![
            make_song("s1", "p1", SongStatus::PerformanceReady, &[100]),
            make_song("s2", "p1", SongStatus::InProgress, &[50]),
            make_song("s3", "p2", SongStatus::PerformanceReady, &[100]),
        ];

        assert_eq!(project_completion(&songs, "p1"), 50);
        assert_eq!(project_completion(&songs, "p2"), 100);
        // A project with no songs reads as 0%, not a division error
        assert_eq!(project_completion(&songs, "p3"), 0);
    }

    #[test]
    fn test_overall_mastery_counts_performance_ready() {
        assert_eq!(overall_mastery(&[]), 0);

        let songs = vec![
            make_song("s1", "p1", SongStatus::PerformanceReady, &[100]),
            make_song("s2", "p1", SongStatus::NotStarted, &[]),
            make_song("s3", "p1", SongStatus::NeedsWork, &[10]),
        ];
        assert_eq!(overall_mastery(&songs), 33);
    }

    #[test]
    fn test_day_streak_counts_consecutive_completed_days() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let mut schedule = HashMap::new();
        schedule.insert(date_key(today), vec![entry("s1", true)]);
        schedule.insert(
            date_key(today - Duration::days(1)),
            vec![entry("s1", false), entry("s2", true)],
        );

        assert_eq!(day_streak(&schedule, today), 2);
    }

    #[test]
    fn test_day_streak_stops_at_gap() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let mut schedule = HashMap::new();
        schedule.insert(date_key(today), vec![entry("s1", true)]);
        // Yesterday was scheduled but nothing got done
        schedule.insert(date_key(today - Duration::days(1)), vec![entry("s1", false)]);
        schedule.insert(date_key(today - Duration::days(2)), vec![entry("s1", true)]);

        assert_eq!(day_streak(&schedule, today), 1);
    }

    #[test]
    fn test_day_streak_is_zero_without_todays_completion() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let mut schedule = HashMap::new();
        schedule.insert(date_key(today - Duration::days(1)), vec![entry("s1", true)]);

        assert_eq!(day_streak(&schedule, today), 0);
    }

    #[test]
    fn test_needs_attention_flags_in_progress_and_stale_songs() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();

        let mut stale = make_song("s1", "p1", SongStatus::PerformanceReady, &[100]);
        stale.last_played = Some(now - Duration::days(8));

        let mut fresh = make_song("s2", "p1", SongStatus::PerformanceReady, &[100]);
        fresh.last_played = Some(now - Duration::days(2));

        let in_progress = make_song("s3", "p1", SongStatus::InProgress, &[50]);
        let untouched = make_song("s4", "p1", SongStatus::NotStarted, &[]);

        let songs = vec![stale, fresh, in_progress, untouched];
        let flagged: Vec<String> = needs_attention(&songs, now)
            .into_iter()
            .map(|s| s.id)
            .collect();

        assert_eq!(flagged, vec!["s1".to_string(), "s3".to_string()]);
    }

    #[test]
    fn test_minutes_this_week_ignores_older_sessions() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();

        let mut sessions: HashMap<String, Vec<PracticeSession>> = HashMap::new();
        sessions.insert(
            "s1".to_string(),
            vec![
                PracticeSession {
                    id: "ps1".to_string(),
                    song_id: "s1".to_string(),
                    date: now - Duration::days(1),
                    duration_minutes: 30,
                },
                PracticeSession {
                    id: "ps2".to_string(),
                    song_id: "s1".to_string(),
                    date: now - Duration::days(10),
                    duration_minutes: 45,
                },
            ],
        );
        sessions.insert(
            "s2".to_string(),
            vec![PracticeSession {
                id: "ps3".to_string(),
                song_id: "s2".to_string(),
                date: now - Duration::days(6),
                duration_minutes: 20,
            }],
        );

        assert_eq!(minutes_this_week(&sessions, now), 50);
    }
}
