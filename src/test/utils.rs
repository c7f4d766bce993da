use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::models::{ComponentKind, Difficulty, Song, SongComponent, SongStatus};
use crate::remote::RemoteStore;
use crate::store::{AppStore, NewComponent, NewProject, NewSong};

pub const STANDARD_PASSWORD: &str = "password123";

pub async fn in_memory_remote() -> RemoteStore {
    let remote = RemoteStore::connect_in_memory()
        .await
        .expect("Failed to create in-memory database");

    remote.migrate().await.expect("Failed to run migrations");

    remote
}

pub struct TestStore {
    pub store: Arc<AppStore>,
    pub user_id: String,
}

/// A store backed by a fresh in-memory database, initialized for one user.
pub async fn remote_store() -> TestStore {
    let remote = in_memory_remote().await;

    let user = remote
        .create_user("alex@example.com", STANDARD_PASSWORD, Some("Alex"))
        .await
        .expect("Failed to create test user");

    let store = Arc::new(AppStore::new(Some(remote)));
    store
        .initialize(&user.id)
        .await
        .expect("Failed to initialize store");

    TestStore {
        store,
        user_id: user.id,
    }
}

/// A store with no remote configured (demo mode).
pub async fn offline_store() -> Arc<AppStore> {
    let store = Arc::new(AppStore::new(None));
    store
        .initialize("demo")
        .await
        .expect("Failed to initialize store");
    store
}

pub fn new_project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        band_name: "Floyd Tribute".to_string(),
        description: String::new(),
    }
}

pub fn new_song(project_id: &str, title: &str) -> NewSong {
    NewSong {
        project_id: project_id.to_string(),
        title: title.to_string(),
        artist: "Pink Floyd".to_string(),
        album: None,
        key: Some("B minor".to_string()),
        tempo: Some(64),
        difficulty: Difficulty::Advanced,
        status: SongStatus::InProgress,
        tab_url: None,
        tab_content: None,
        backing_track_url: None,
        reference_url: None,
        notes: None,
        tone_preset_id: None,
        components: vec![
            NewComponent {
                name: "Intro".to_string(),
                kind: ComponentKind::Intro,
                progress: 100,
            },
            NewComponent {
                name: "Verse".to_string(),
                kind: ComponentKind::Verse,
                progress: 50,
            },
            NewComponent {
                name: "Solo".to_string(),
                kind: ComponentKind::Solo,
                progress: 0,
            },
        ],
    }
}

/// A fully-built song model with client-side ids, for driving the remote
/// layer directly.
pub fn sample_song(project_id: &str, title: &str) -> Song {
    let song_id = Uuid::new_v4().to_string();
    let components = [("Intro", ComponentKind::Intro, 100), ("Verse", ComponentKind::Verse, 50), ("Solo", ComponentKind::Solo, 0)]
        .into_iter()
        .map(|(name, kind, progress)| SongComponent {
            id: Uuid::new_v4().to_string(),
            song_id: song_id.clone(),
            name: name.to_string(),
            kind,
            progress,
        })
        .collect();

    Song {
        id: song_id,
        project_id: project_id.to_string(),
        title: title.to_string(),
        artist: "Pink Floyd".to_string(),
        album: None,
        key: Some("B minor".to_string()),
        tempo: Some(64),
        difficulty: Difficulty::Advanced,
        status: SongStatus::InProgress,
        tab_url: None,
        tab_content: None,
        backing_track_url: None,
        reference_url: None,
        notes: None,
        last_played: None,
        tone_preset_id: None,
        components,
    }
}

/// Polls for a condition produced by a background write, failing the test if
/// it never settles.
pub async fn wait_until<F: Fn() -> bool>(condition: F, what: &str) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Timed out waiting for {}", what);
}
