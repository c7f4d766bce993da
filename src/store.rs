use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    AmpSettings, ComponentKind, Difficulty, EffectPedal, PracticeSession, PracticeVideo, Project,
    ScheduleEntry, SchedulePatch, Song, SongComponent, SongPatch, SongStatus, TonePreset,
};
use crate::remote::RemoteStore;

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today_key() -> String {
    date_key(Utc::now().date_naive())
}

fn temp_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Default)]
struct Collections {
    user_id: Option<String>,
    projects: Vec<Project>,
    songs: Vec<Song>,
    tone_presets: Vec<TonePreset>,
    schedule: HashMap<String, Vec<ScheduleEntry>>,
    sessions: HashMap<String, Vec<PracticeSession>>,
    videos: HashMap<String, Vec<PracticeVideo>>,
}

pub struct NewProject {
    pub name: String,
    pub band_name: String,
    pub description: String,
}

pub struct NewComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub progress: i64,
}

pub struct NewSong {
    pub project_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<i64>,
    pub difficulty: Difficulty,
    pub status: SongStatus,
    pub tab_url: Option<String>,
    pub tab_content: Option<String>,
    pub backing_track_url: Option<String>,
    pub reference_url: Option<String>,
    pub notes: Option<String>,
    pub tone_preset_id: Option<String>,
    pub components: Vec<NewComponent>,
}

pub struct NewTonePreset {
    pub name: String,
    pub description: Option<String>,
    pub guitar_model: String,
    pub pickup_position: String,
    pub amp_settings: AmpSettings,
    pub effects: Vec<EffectPedal>,
    pub tags: Vec<String>,
}

pub struct NewPracticeSession {
    pub song_id: String,
    pub date: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
}

pub struct NewPracticeVideo {
    pub song_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Canonical in-memory collections plus the single origin of mutations.
///
/// Every mutation applies to local state synchronously, then hands the
/// corresponding remote write to a background task. A write that comes back
/// with canonical data (inserts) reconciles the optimistic record by its
/// original temporary id; a write that fails leaves local state alone and
/// stamps the shared last-error slot. Reads never touch the network.
pub struct AppStore {
    remote: Option<Arc<RemoteStore>>,
    state: Arc<RwLock<Collections>>,
    last_error: Arc<Mutex<Option<String>>>,
}

fn record_error(slot: &Arc<Mutex<Option<String>>>, message: String) {
    warn!(error = %message, "Remote write failed");
    // Last write wins; an unacknowledged earlier error is overwritten
    *slot.lock().unwrap() = Some(message);
}

fn reconcile_project(state: &Arc<RwLock<Collections>>, temp_id: &str, authoritative: Project) {
    let mut st = state.write().unwrap();
    if let Some(slot) = st.projects.iter_mut().find(|p| p.id == temp_id) {
        *slot = authoritative;
    }
}

fn reconcile_song(state: &Arc<RwLock<Collections>>, temp_id: &str, authoritative: Song) {
    let mut st = state.write().unwrap();
    if let Some(slot) = st.songs.iter_mut().find(|s| s.id == temp_id) {
        *slot = authoritative;
    }
}

fn reconcile_tone_preset(
    state: &Arc<RwLock<Collections>>,
    temp_id: &str,
    authoritative: TonePreset,
) {
    let mut st = state.write().unwrap();
    if let Some(slot) = st.tone_presets.iter_mut().find(|p| p.id == temp_id) {
        *slot = authoritative;
    }
}

fn reconcile_practice_session(
    state: &Arc<RwLock<Collections>>,
    song_id: &str,
    temp_id: &str,
    authoritative: PracticeSession,
) {
    let mut st = state.write().unwrap();
    if let Some(entries) = st.sessions.get_mut(song_id) {
        if let Some(slot) = entries.iter_mut().find(|s| s.id == temp_id) {
            *slot = authoritative;
        }
    }
}

fn reconcile_practice_video(
    state: &Arc<RwLock<Collections>>,
    song_id: &str,
    temp_id: &str,
    authoritative: PracticeVideo,
) {
    let mut st = state.write().unwrap();
    if let Some(entries) = st.videos.get_mut(song_id) {
        if let Some(slot) = entries.iter_mut().find(|v| v.id == temp_id) {
            *slot = authoritative;
        }
    }
}

impl AppStore {
    pub fn new(remote: Option<RemoteStore>) -> Self {
        Self {
            remote: remote.map(Arc::new),
            state: Arc::new(RwLock::new(Collections::default())),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn remote(&self) -> Option<Arc<RemoteStore>> {
        self.remote.clone()
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Populates every collection for the given user. Runs the full load
    /// once per signed-in identity; calling it again for the same user is a
    /// no-op, while a different user triggers a fresh load.
    pub async fn initialize(&self, user_id: &str) -> Result<(), AppError> {
        {
            let st = self.state.read().unwrap();
            if st.user_id.as_deref() == Some(user_id) {
                return Ok(());
            }
        }

        info!(user_id = %user_id, "Loading collections for session");

        if let Some(remote) = self.remote.clone() {
            let projects = remote.projects_for(user_id).await?;
            let songs = remote.songs_for(user_id).await?;
            let tone_presets = remote.tone_presets_for(user_id).await?;
            let schedule_rows = remote.schedule_for(user_id).await?;
            let session_rows = remote.practice_sessions_for(user_id).await?;
            let video_rows = remote.practice_videos_for(user_id).await?;

            let mut schedule: HashMap<String, Vec<ScheduleEntry>> = HashMap::new();
            for (date, entry) in schedule_rows {
                schedule.entry(date).or_default().push(entry);
            }
            let mut sessions: HashMap<String, Vec<PracticeSession>> = HashMap::new();
            for session in session_rows {
                sessions.entry(session.song_id.clone()).or_default().push(session);
            }
            let mut videos: HashMap<String, Vec<PracticeVideo>> = HashMap::new();
            for video in video_rows {
                videos.entry(video.song_id.clone()).or_default().push(video);
            }

            let mut st = self.state.write().unwrap();
            *st = Collections {
                user_id: Some(user_id.to_string()),
                projects,
                songs,
                tone_presets,
                schedule,
                sessions,
                videos,
            };
        } else {
            let mut st = self.state.write().unwrap();
            *st = Collections {
                user_id: Some(user_id.to_string()),
                ..Collections::default()
            };
        }

        self.clear_error();
        Ok(())
    }

    /// Drops all collections and the error slot. Called on sign-out.
    pub fn reset(&self) {
        let mut st = self.state.write().unwrap();
        *st = Collections::default();
        drop(st);
        self.clear_error();
    }

    // ------------------------------------------------------------------
    // Reads: synchronous, in-memory only
    // ------------------------------------------------------------------

    pub fn projects(&self) -> Vec<Project> {
        self.state.read().unwrap().projects.clone()
    }

    pub fn songs(&self) -> Vec<Song> {
        self.state.read().unwrap().songs.clone()
    }

    pub fn song(&self, id: &str) -> Option<Song> {
        self.state.read().unwrap().songs.iter().find(|s| s.id == id).cloned()
    }

    pub fn tone_presets(&self) -> Vec<TonePreset> {
        self.state.read().unwrap().tone_presets.clone()
    }

    pub fn tone_preset(&self, id: &str) -> Option<TonePreset> {
        self.state
            .read()
            .unwrap()
            .tone_presets
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn schedule_for(&self, date: &str) -> Vec<ScheduleEntry> {
        self.state
            .read()
            .unwrap()
            .schedule
            .get(date)
            .cloned()
            .unwrap_or_default()
    }

    pub fn todays_schedule(&self) -> Vec<ScheduleEntry> {
        self.schedule_for(&today_key())
    }

    pub fn todays_schedule_ids(&self) -> Vec<String> {
        self.todays_schedule().into_iter().map(|e| e.song_id).collect()
    }

    pub fn schedule_map(&self) -> HashMap<String, Vec<ScheduleEntry>> {
        self.state.read().unwrap().schedule.clone()
    }

    pub fn practice_sessions(&self, song_id: &str) -> Vec<PracticeSession> {
        self.state
            .read()
            .unwrap()
            .sessions
            .get(song_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn practice_sessions_map(&self) -> HashMap<String, Vec<PracticeSession>> {
        self.state.read().unwrap().sessions.clone()
    }

    pub fn practice_videos(&self, song_id: &str) -> Vec<PracticeVideo> {
        self.state
            .read()
            .unwrap()
            .videos
            .get(song_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    pub fn clear_error(&self) {
        *self.last_error.lock().unwrap() = None;
    }

    // ------------------------------------------------------------------
    // Mutations: optimistic local apply + background remote write
    // ------------------------------------------------------------------

    pub fn add_project(&self, input: NewProject) -> Project {
        let project = Project {
            id: temp_id(),
            name: input.name,
            band_name: input.band_name,
            description: input.description,
            song_count: 0,
            completed_count: 0,
        };

        let owner = {
            let mut st = self.state.write().unwrap();
            st.projects.push(project.clone());
            st.user_id.clone()
        };

        if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
            let state = self.state.clone();
            let errors = self.last_error.clone();
            let local = project.clone();
            let pending_id = project.id.clone();
            tokio::spawn(async move {
                match remote.insert_project(&owner, &local).await {
                    Ok(saved) => reconcile_project(&state, &pending_id, saved),
                    Err(e) => record_error(
                        &errors,
                        format!("Failed to save project \"{}\": {}", local.name, e),
                    ),
                }
            });
        }

        project
    }

    pub fn delete_project(&self, id: &str) {
        {
            let mut st = self.state.write().unwrap();
            st.projects.retain(|p| p.id != id);
            let orphaned: Vec<String> = st
                .songs
                .iter()
                .filter(|s| s.project_id == id)
                .map(|s| s.id.clone())
                .collect();
            st.songs.retain(|s| s.project_id != id);
            for entries in st.schedule.values_mut() {
                entries.retain(|e| !orphaned.contains(&e.song_id));
            }
            for song_id in &orphaned {
                st.sessions.remove(song_id);
                st.videos.remove(song_id);
            }
        }

        if let Some(remote) = self.remote.clone() {
            let errors = self.last_error.clone();
            let id = id.to_string();
            tokio::spawn(async move {
                if let Err(e) = remote.delete_project(&id).await {
                    record_error(&errors, format!("Failed to delete project: {}", e));
                }
            });
        }
    }

    pub fn add_song(&self, input: NewSong) -> Song {
        let song_id = temp_id();
        let components = input
            .components
            .into_iter()
            .map(|c| SongComponent {
                id: temp_id(),
                song_id: song_id.clone(),
                name: c.name,
                kind: c.kind,
                progress: c.progress.clamp(0, 100),
            })
            .collect();

        let song = Song {
            id: song_id,
            project_id: input.project_id,
            title: input.title,
            artist: input.artist,
            album: input.album,
            key: input.key,
            tempo: input.tempo,
            difficulty: input.difficulty,
            status: input.status,
            tab_url: input.tab_url,
            tab_content: input.tab_content,
            backing_track_url: input.backing_track_url,
            reference_url: input.reference_url,
            notes: input.notes,
            last_played: None,
            tone_preset_id: input.tone_preset_id,
            components,
        };

        {
            let mut st = self.state.write().unwrap();
            st.songs.push(song.clone());
        }

        if let Some(remote) = self.remote.clone() {
            let state = self.state.clone();
            let errors = self.last_error.clone();
            let local = song.clone();
            let pending_id = song.id.clone();
            tokio::spawn(async move {
                match remote.insert_song(&local).await {
                    Ok(saved) => reconcile_song(&state, &pending_id, saved),
                    Err(e) => record_error(
                        &errors,
                        format!("Failed to save song \"{}\": {}", local.title, e),
                    ),
                }
            });
        }

        song
    }

    /// Merges a sparse patch into the song. When the patch carries only
    /// `components`, the remote side is updated with one progress write per
    /// changed component; components live in their own table, so a song-row
    /// update would have nothing to say about them.
    pub fn update_song(&self, id: &str, patch: SongPatch) -> Option<Song> {
        let components_only = patch.is_components_only();

        let (updated, changed_components) = {
            let mut st = self.state.write().unwrap();
            let song = st.songs.iter_mut().find(|s| s.id == id)?;

            let before = song.components.clone();

            if let Some(project_id) = &patch.project_id {
                song.project_id = project_id.clone();
            }
            if let Some(title) = &patch.title {
                song.title = title.clone();
            }
            if let Some(artist) = &patch.artist {
                song.artist = artist.clone();
            }
            if let Some(album) = &patch.album {
                song.album = Some(album.clone());
            }
            if let Some(key) = &patch.key {
                song.key = Some(key.clone());
            }
            if let Some(tempo) = patch.tempo {
                song.tempo = Some(tempo);
            }
            if let Some(difficulty) = patch.difficulty {
                song.difficulty = difficulty;
            }
            if let Some(status) = patch.status {
                song.status = status;
            }
            if let Some(tab_url) = &patch.tab_url {
                song.tab_url = Some(tab_url.clone());
            }
            if let Some(tab_content) = &patch.tab_content {
                song.tab_content = Some(tab_content.clone());
            }
            if let Some(backing_track_url) = &patch.backing_track_url {
                song.backing_track_url = Some(backing_track_url.clone());
            }
            if let Some(reference_url) = &patch.reference_url {
                song.reference_url = Some(reference_url.clone());
            }
            if let Some(notes) = &patch.notes {
                song.notes = Some(notes.clone());
            }
            if let Some(last_played) = patch.last_played {
                song.last_played = Some(last_played);
            }
            if let Some(tone_preset_id) = &patch.tone_preset_id {
                song.tone_preset_id = Some(tone_preset_id.clone());
            }
            if let Some(components) = &patch.components {
                song.components = components
                    .iter()
                    .cloned()
                    .map(|mut c| {
                        c.progress = c.progress.clamp(0, 100);
                        c
                    })
                    .collect();
            }

            let changed: Vec<(String, i64)> = patch
                .components
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter(|c| {
                    before
                        .iter()
                        .find(|b| b.id == c.id)
                        .map(|b| b.progress != c.progress.clamp(0, 100))
                        .unwrap_or(true)
                })
                .map(|c| (c.id.clone(), c.progress.clamp(0, 100)))
                .collect();

            (song.clone(), changed)
        };

        if let Some(remote) = self.remote.clone() {
            let errors = self.last_error.clone();
            let id = id.to_string();
            let title = updated.title.clone();
            tokio::spawn(async move {
                if !components_only {
                    if let Err(e) = remote.update_song(&id, &patch).await {
                        record_error(
                            &errors,
                            format!("Failed to update song \"{}\": {}", title, e),
                        );
                    }
                }
                for (component_id, progress) in changed_components {
                    if let Err(e) = remote.update_component_progress(&component_id, progress).await
                    {
                        record_error(
                            &errors,
                            format!("Failed to update a section of \"{}\": {}", title, e),
                        );
                    }
                }
            });
        }

        Some(updated)
    }

    pub fn delete_song(&self, id: &str) {
        {
            let mut st = self.state.write().unwrap();
            st.songs.retain(|s| s.id != id);
            for entries in st.schedule.values_mut() {
                entries.retain(|e| e.song_id != id);
            }
            st.sessions.remove(id);
            st.videos.remove(id);
        }

        if let Some(remote) = self.remote.clone() {
            let errors = self.last_error.clone();
            let id = id.to_string();
            tokio::spawn(async move {
                if let Err(e) = remote.delete_song(&id).await {
                    record_error(&errors, format!("Failed to delete song: {}", e));
                }
            });
        }
    }

    pub fn add_tone_preset(&self, input: NewTonePreset) -> TonePreset {
        let preset = TonePreset {
            id: temp_id(),
            name: input.name,
            description: input.description,
            guitar_model: input.guitar_model,
            pickup_position: input.pickup_position,
            amp_settings: input.amp_settings,
            effects: input
                .effects
                .into_iter()
                .map(|mut e| {
                    if e.id.is_empty() {
                        e.id = temp_id();
                    }
                    e
                })
                .collect(),
            tags: input.tags,
        };

        let owner = {
            let mut st = self.state.write().unwrap();
            st.tone_presets.push(preset.clone());
            st.user_id.clone()
        };

        if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
            let state = self.state.clone();
            let errors = self.last_error.clone();
            let local = preset.clone();
            let pending_id = preset.id.clone();
            tokio::spawn(async move {
                match remote.insert_tone_preset(&owner, &local).await {
                    Ok(saved) => reconcile_tone_preset(&state, &pending_id, saved),
                    Err(e) => record_error(
                        &errors,
                        format!("Failed to save tone preset \"{}\": {}", local.name, e),
                    ),
                }
            });
        }

        preset
    }

    pub fn update_tone_preset(&self, preset: TonePreset) -> Option<TonePreset> {
        {
            let mut st = self.state.write().unwrap();
            let slot = st.tone_presets.iter_mut().find(|p| p.id == preset.id)?;
            *slot = preset.clone();
        }

        if let Some(remote) = self.remote.clone() {
            let errors = self.last_error.clone();
            let local = preset.clone();
            tokio::spawn(async move {
                if let Err(e) = remote.update_tone_preset(&local).await {
                    record_error(
                        &errors,
                        format!("Failed to update tone preset \"{}\": {}", local.name, e),
                    );
                }
            });
        }

        Some(preset)
    }

    pub fn delete_tone_preset(&self, id: &str) {
        {
            let mut st = self.state.write().unwrap();
            st.tone_presets.retain(|p| p.id != id);
            // Remote rows fall back to NULL via the foreign key; mirror that
            for song in st.songs.iter_mut() {
                if song.tone_preset_id.as_deref() == Some(id) {
                    song.tone_preset_id = None;
                }
            }
        }

        if let Some(remote) = self.remote.clone() {
            let errors = self.last_error.clone();
            let id = id.to_string();
            tokio::spawn(async move {
                if let Err(e) = remote.delete_tone_preset(&id).await {
                    record_error(&errors, format!("Failed to delete tone preset: {}", e));
                }
            });
        }
    }

    /// Adds a song to the schedule for a date. Idempotent per (date, songId):
    /// re-adding a scheduled song returns the existing entry untouched.
    pub fn add_to_schedule(&self, date: &str, song_id: &str) -> ScheduleEntry {
        let (owner, entry, inserted) = {
            let mut st = self.state.write().unwrap();
            let owner = st.user_id.clone();
            let entries = st.schedule.entry(date.to_string()).or_default();
            match entries.iter().find(|e| e.song_id == song_id) {
                Some(existing) => (owner, existing.clone(), false),
                None => {
                    let entry = ScheduleEntry {
                        song_id: song_id.to_string(),
                        completed: false,
                        notes: String::new(),
                        completed_at: None,
                    };
                    entries.push(entry.clone());
                    (owner, entry, true)
                }
            }
        };

        if inserted {
            if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
                let errors = self.last_error.clone();
                let date = date.to_string();
                let local = entry.clone();
                tokio::spawn(async move {
                    if let Err(e) = remote.insert_schedule_entry(&owner, &date, &local).await {
                        record_error(&errors, format!("Failed to save schedule entry: {}", e));
                    }
                });
            }
        }

        entry
    }

    pub fn remove_from_schedule(&self, date: &str, song_id: &str) {
        let owner = {
            let mut st = self.state.write().unwrap();
            if let Some(entries) = st.schedule.get_mut(date) {
                entries.retain(|e| e.song_id != song_id);
            }
            st.user_id.clone()
        };

        if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
            let errors = self.last_error.clone();
            let date = date.to_string();
            let song_id = song_id.to_string();
            tokio::spawn(async move {
                if let Err(e) = remote.delete_schedule_entry(&owner, &date, &song_id).await {
                    record_error(&errors, format!("Failed to remove schedule entry: {}", e));
                }
            });
        }
    }

    pub fn update_schedule_entry(
        &self,
        date: &str,
        song_id: &str,
        patch: SchedulePatch,
    ) -> Option<ScheduleEntry> {
        let (owner, updated) = {
            let mut st = self.state.write().unwrap();
            let owner = st.user_id.clone();
            let entries = st.schedule.get_mut(date)?;
            let entry = entries.iter_mut().find(|e| e.song_id == song_id)?;

            if let Some(completed) = patch.completed {
                entry.completed = completed;
                entry.completed_at = completed.then(Utc::now);
            }
            if let Some(notes) = &patch.notes {
                entry.notes = notes.clone();
            }
            (owner, entry.clone())
        };

        if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
            let errors = self.last_error.clone();
            let date = date.to_string();
            let song_id = song_id.to_string();
            tokio::spawn(async move {
                if let Err(e) = remote
                    .update_schedule_entry(&owner, &date, &song_id, &patch)
                    .await
                {
                    record_error(&errors, format!("Failed to update schedule entry: {}", e));
                }
            });
        }

        Some(updated)
    }

    pub fn add_practice_session(&self, input: NewPracticeSession) -> PracticeSession {
        let session = PracticeSession {
            id: temp_id(),
            song_id: input.song_id,
            date: input.date.unwrap_or_else(Utc::now),
            duration_minutes: input.duration_minutes,
        };

        let owner = {
            let mut st = self.state.write().unwrap();
            st.sessions
                .entry(session.song_id.clone())
                .or_default()
                .push(session.clone());
            st.user_id.clone()
        };

        if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
            let state = self.state.clone();
            let errors = self.last_error.clone();
            let local = session.clone();
            let pending_id = session.id.clone();
            tokio::spawn(async move {
                match remote.insert_practice_session(&owner, &local).await {
                    Ok(saved) => {
                        reconcile_practice_session(&state, &local.song_id, &pending_id, saved)
                    }
                    Err(e) => {
                        record_error(&errors, format!("Failed to log practice session: {}", e))
                    }
                }
            });
        }

        session
    }

    pub fn add_practice_video(&self, input: NewPracticeVideo) -> PracticeVideo {
        let video = PracticeVideo {
            id: temp_id(),
            song_id: input.song_id,
            title: input.title,
            url: input.url,
            description: input.description,
            recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
        };

        let owner = {
            let mut st = self.state.write().unwrap();
            st.videos
                .entry(video.song_id.clone())
                .or_default()
                .push(video.clone());
            st.user_id.clone()
        };

        if let (Some(remote), Some(owner)) = (self.remote.clone(), owner) {
            let state = self.state.clone();
            let errors = self.last_error.clone();
            let local = video.clone();
            let pending_id = video.id.clone();
            tokio::spawn(async move {
                match remote.insert_practice_video(&owner, &local).await {
                    Ok(saved) => {
                        reconcile_practice_video(&state, &local.song_id, &pending_id, saved)
                    }
                    Err(e) => record_error(&errors, format!("Failed to save video: {}", e)),
                }
            });
        }

        video
    }
}
