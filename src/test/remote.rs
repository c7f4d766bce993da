#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::auth::UserSession;
    use crate::error::AppError;
    use crate::models::{ScheduleEntry, SchedulePatch, SongPatch};
    use crate::test::utils::{STANDARD_PASSWORD, in_memory_remote};

    #[tokio::test]
    async fn test_create_and_authenticate_user() {
        let remote = in_memory_remote().await;

        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, Some("Alex"))
            .await
            .expect("Failed to create user");
        assert_eq!(user.email, "alex@example.com");
        assert_eq!(user.display_name, "Alex");

        let authenticated = remote
            .authenticate_user("alex@example.com", STANDARD_PASSWORD)
            .await
            .expect("Authentication call failed");
        assert!(authenticated.is_some());

        let rejected = remote
            .authenticate_user("alex@example.com", "wrong-password")
            .await
            .expect("Authentication call failed");
        assert!(rejected.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let remote = in_memory_remote().await;

        remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");

        let result = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("alex@example.com")),
            other => panic!("Expected validation error, got {:?}", other.map(|u| u.email)),
        }
    }

    #[tokio::test]
    async fn test_display_name_falls_back_to_mailbox() {
        let remote = in_memory_remote().await;

        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");

        assert_eq!(user.display_name, "alex");
    }

    #[tokio::test]
    async fn test_session_roundtrip_and_validity() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");

        let token = format!("test_token_{}", Uuid::new_v4());
        let expires_at = (Utc::now() + Duration::hours(1)).naive_utc();

        remote
            .create_session(&user.id, &token, expires_at)
            .await
            .expect("Failed to create session");

        let session = remote
            .session_by_token(&token)
            .await
            .expect("Failed to get session");
        assert_eq!(session.user_id, user.id);
        assert!(session.is_valid());

        remote
            .invalidate_session(&token)
            .await
            .expect("Failed to invalidate session");

        let result = remote.session_by_token(&token).await;
        match result {
            Err(AppError::Authentication(msg)) => assert_eq!(msg, "Invalid session token"),
            _ => panic!("Expected authentication error for invalidated token"),
        }
    }

    #[tokio::test]
    async fn test_clean_expired_sessions() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");

        let expired_token = format!("expired_{}", Uuid::new_v4());
        remote
            .create_session(
                &user.id,
                &expired_token,
                (Utc::now() - Duration::hours(1)).naive_utc(),
            )
            .await
            .expect("Failed to create expired session");

        let live_token = format!("live_{}", Uuid::new_v4());
        remote
            .create_session(
                &user.id,
                &live_token,
                (Utc::now() + Duration::days(1)).naive_utc(),
            )
            .await
            .expect("Failed to create live session");

        let expired = remote
            .session_by_token(&expired_token)
            .await
            .expect("Expired session should still be readable");
        assert!(!expired.is_valid());

        let cleaned = remote
            .clean_expired_sessions()
            .await
            .expect("Failed to clean sessions");
        assert_eq!(cleaned, 1);

        assert!(remote.session_by_token(&expired_token).await.is_err());
        assert!(remote.session_by_token(&live_token).await.is_ok());
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = UserSession::generate_token();
        let b = UserSession::generate_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }

    async fn seeded_project(remote: &crate::remote::RemoteStore, user_id: &str) -> String {
        let project = crate::models::Project {
            id: String::new(),
            name: "Test Set".to_string(),
            band_name: String::new(),
            description: String::new(),
            song_count: 0,
            completed_count: 0,
        };
        remote
            .insert_project(user_id, &project)
            .await
            .expect("Failed to insert project")
            .id
    }

    #[tokio::test]
    async fn test_tone_preset_defaults_for_absent_json_columns() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");

        // Row written by another client with every optional column missing
        sqlx::query(
            "INSERT INTO tone_presets (id, user_id, name) VALUES ('t1', ?, 'Bare Preset')",
        )
        .bind(&user.id)
        .execute(remote.pool())
        .await
        .expect("Failed to insert raw row");

        // And one with JSON that does not parse
        sqlx::query(
            "INSERT INTO tone_presets (id, user_id, name, amp_settings, effects_chain, style_tags)
             VALUES ('t2', ?, 'Broken Preset', 'not-json', '{', '[1,')",
        )
        .bind(&user.id)
        .execute(remote.pool())
        .await
        .expect("Failed to insert raw row");

        let presets = remote
            .tone_presets_for(&user.id)
            .await
            .expect("Failed to load presets");
        assert_eq!(presets.len(), 2);

        for preset in presets {
            assert_eq!(preset.amp_settings.gain, 0);
            assert_eq!(preset.amp_settings.volume, 0);
            assert!(preset.effects.is_empty());
            assert!(preset.tags.is_empty());
        }
    }

    #[tokio::test]
    async fn test_update_song_with_empty_patch_is_a_noop() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");
        let project_id = seeded_project(&remote, &user.id).await;

        let local = crate::test::utils::sample_song(&project_id, "Breathe");
        let saved = remote.insert_song(&local).await.expect("Failed to insert song");

        remote
            .update_song(&saved.id, &SongPatch::default())
            .await
            .expect("Empty patch should not fail");

        let reread = remote.song_by_id(&saved.id).await.expect("Song missing");
        assert_eq!(reread.title, "Breathe");
        assert_eq!(reread.components.len(), 3);
    }

    #[tokio::test]
    async fn test_schedule_insert_is_idempotent_per_date_and_song() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");
        let project_id = seeded_project(&remote, &user.id).await;

        let local = crate::test::utils::sample_song(&project_id, "Breathe");
        let saved = remote.insert_song(&local).await.expect("Failed to insert song");

        let entry = ScheduleEntry {
            song_id: saved.id.clone(),
            completed: false,
            notes: String::new(),
            completed_at: None,
        };

        remote
            .insert_schedule_entry(&user.id, "2026-08-05", &entry)
            .await
            .expect("Failed to insert entry");
        remote
            .insert_schedule_entry(&user.id, "2026-08-05", &entry)
            .await
            .expect("Second insert should be ignored");

        let schedule = remote
            .schedule_for(&user.id)
            .await
            .expect("Failed to load schedule");
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].0, "2026-08-05");
    }

    #[tokio::test]
    async fn test_schedule_completion_is_timestamped_and_cleared() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");
        let project_id = seeded_project(&remote, &user.id).await;

        let local = crate::test::utils::sample_song(&project_id, "Breathe");
        let saved = remote.insert_song(&local).await.expect("Failed to insert song");

        let entry = ScheduleEntry {
            song_id: saved.id.clone(),
            completed: false,
            notes: String::new(),
            completed_at: None,
        };
        remote
            .insert_schedule_entry(&user.id, "2026-08-05", &entry)
            .await
            .expect("Failed to insert entry");

        remote
            .update_schedule_entry(
                &user.id,
                "2026-08-05",
                &saved.id,
                &SchedulePatch {
                    completed: Some(true),
                    notes: None,
                },
            )
            .await
            .expect("Failed to update entry");

        let schedule = remote.schedule_for(&user.id).await.expect("load schedule");
        assert!(schedule[0].1.completed);
        assert!(schedule[0].1.completed_at.is_some());

        remote
            .update_schedule_entry(
                &user.id,
                "2026-08-05",
                &saved.id,
                &SchedulePatch {
                    completed: Some(false),
                    notes: None,
                },
            )
            .await
            .expect("Failed to update entry");

        let schedule = remote.schedule_for(&user.id).await.expect("load schedule");
        assert!(!schedule[0].1.completed);
        assert!(schedule[0].1.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_missing_song_is_not_found() {
        let remote = in_memory_remote().await;

        let result = remote.song_by_id("no-such-song").await;
        match result {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("no-such-song")),
            _ => panic!("Expected not-found error"),
        }
    }

    #[tokio::test]
    async fn test_delete_project_cascades_to_songs() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");
        let project_id = seeded_project(&remote, &user.id).await;

        let local = crate::test::utils::sample_song(&project_id, "Breathe");
        let saved = remote.insert_song(&local).await.expect("Failed to insert song");

        remote
            .delete_project(&project_id)
            .await
            .expect("Failed to delete project");

        assert!(remote.song_by_id(&saved.id).await.is_err());
        let songs = remote.songs_for(&user.id).await.expect("load songs");
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn test_add_project_via_store_input() {
        let remote = in_memory_remote().await;
        let user = remote
            .create_user("alex@example.com", STANDARD_PASSWORD, None)
            .await
            .expect("Failed to create user");

        let local = crate::models::Project {
            id: "pending-local-id".to_string(),
            name: "Zeppelin Set".to_string(),
            band_name: "Zeppelin Experience".to_string(),
            description: "Club gigs".to_string(),
            song_count: 0,
            completed_count: 0,
        };

        let saved = remote
            .insert_project(&user.id, &local)
            .await
            .expect("Failed to insert project");

        assert_ne!(saved.id, local.id);
        assert_eq!(saved.name, "Zeppelin Set");
        assert_eq!(saved.band_name, "Zeppelin Experience");
        assert_eq!(saved.song_count, 0);
    }
}
