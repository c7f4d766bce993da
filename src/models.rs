use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Expert => "Expert",
        }
    }

    // Row data is untrusted, so unknown strings fall back instead of erroring
    pub fn from_str(s: &str) -> Self {
        match s {
            "Intermediate" => Difficulty::Intermediate,
            "Advanced" => Difficulty::Advanced,
            "Expert" => Difficulty::Expert,
            _ => Difficulty::Beginner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SongStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Ready for Review")]
    ReadyForReview,
    #[serde(rename = "Performance Ready")]
    PerformanceReady,
    #[serde(rename = "Needs Work")]
    NeedsWork,
}

impl SongStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SongStatus::NotStarted => "Not Started",
            SongStatus::InProgress => "In Progress",
            SongStatus::ReadyForReview => "Ready for Review",
            SongStatus::PerformanceReady => "Performance Ready",
            SongStatus::NeedsWork => "Needs Work",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "In Progress" => SongStatus::InProgress,
            "Ready for Review" => SongStatus::ReadyForReview,
            "Performance Ready" => SongStatus::PerformanceReady,
            "Needs Work" => SongStatus::NeedsWork,
            _ => SongStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Solo,
    Outro,
    Rhythm,
    Lead,
    Custom,
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Intro => "Intro",
            ComponentKind::Verse => "Verse",
            ComponentKind::Chorus => "Chorus",
            ComponentKind::Bridge => "Bridge",
            ComponentKind::Solo => "Solo",
            ComponentKind::Outro => "Outro",
            ComponentKind::Rhythm => "Rhythm",
            ComponentKind::Lead => "Lead",
            ComponentKind::Custom => "Custom",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Intro" => ComponentKind::Intro,
            "Verse" => ComponentKind::Verse,
            "Chorus" => ComponentKind::Chorus,
            "Bridge" => ComponentKind::Bridge,
            "Solo" => ComponentKind::Solo,
            "Outro" => ComponentKind::Outro,
            "Rhythm" => ComponentKind::Rhythm,
            "Lead" => ComponentKind::Lead,
            _ => ComponentKind::Custom,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub band_name: String,
    pub description: String,
    pub song_count: i64, // Denormalized; display only, never authoritative
    pub completed_count: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbProject {
    pub id: Option<String>,
    pub name: Option<String>,
    pub band_name: Option<String>,
    pub description: Option<String>,
    pub song_count: Option<i64>,
    pub completed_count: Option<i64>,
}

impl From<DbProject> for Project {
    fn from(row: DbProject) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            band_name: row.band_name.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            song_count: row.song_count.unwrap_or_default(),
            completed_count: row.completed_count.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongComponent {
    pub id: String,
    pub song_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub progress: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbSongComponent {
    pub id: Option<String>,
    pub song_id: Option<String>,
    pub name: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub progress: Option<i64>,
}

impl From<DbSongComponent> for SongComponent {
    fn from(row: DbSongComponent) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            song_id: row.song_id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            kind: ComponentKind::from_str(&row.kind.unwrap_or_default()),
            progress: row.progress.unwrap_or_default().clamp(0, 100),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
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
    pub last_played: Option<DateTime<Utc>>,
    pub tone_preset_id: Option<String>,
    pub components: Vec<SongComponent>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbSong {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<i64>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub tab_url: Option<String>,
    pub tab_content: Option<String>,
    pub backing_track_url: Option<String>,
    pub reference_url: Option<String>,
    pub notes: Option<String>,
    pub last_played: Option<NaiveDateTime>,
    pub tone_preset_id: Option<String>,
}

impl From<DbSong> for Song {
    fn from(row: DbSong) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            project_id: row.project_id.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            artist: row.artist.unwrap_or_default(),
            album: row.album,
            key: row.key,
            tempo: row.tempo,
            difficulty: Difficulty::from_str(&row.difficulty.unwrap_or_default()),
            status: SongStatus::from_str(&row.status.unwrap_or_default()),
            tab_url: row.tab_url,
            tab_content: row.tab_content,
            backing_track_url: row.backing_track_url,
            reference_url: row.reference_url,
            notes: row.notes,
            last_played: row
                .last_played
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)),
            tone_preset_id: row.tone_preset_id,
            // Components live in their own table; the loader attaches them
            components: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpSettings {
    #[serde(default)]
    pub gain: i64,
    #[serde(default)]
    pub bass: i64,
    #[serde(default)]
    pub mid: i64,
    #[serde(default)]
    pub treble: i64,
    #[serde(default)]
    pub reverb: i64,
    #[serde(default)]
    pub volume: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectPedal {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub effect_type: String,
    #[serde(default)]
    pub is_on: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TonePreset {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub guitar_model: String,
    pub pickup_position: String,
    pub amp_settings: AmpSettings,
    pub effects: Vec<EffectPedal>,
    pub tags: Vec<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTonePreset {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub guitar_model: Option<String>,
    pub pickup_position: Option<String>,
    pub amp_settings: Option<String>,
    pub effects_chain: Option<String>,
    pub style_tags: Option<String>,
}

impl From<DbTonePreset> for TonePreset {
    fn from(row: DbTonePreset) -> Self {
        // JSON columns decode defensively: a missing or malformed value
        // becomes zeroed knobs / empty chains rather than a load failure
        let amp_settings = row
            .amp_settings
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();
        let effects = row
            .effects_chain
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();
        let tags = row
            .style_tags
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();

        Self {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            description: row.description,
            guitar_model: row.guitar_model.unwrap_or_default(),
            pickup_position: row.pickup_position.unwrap_or_default(),
            amp_settings,
            effects,
            tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub song_id: String,
    pub completed: bool,
    pub notes: String,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbScheduleEntry {
    pub date: Option<String>,
    pub song_id: Option<String>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
}

// Schedule rows carry their date key; the store groups entries under it
impl From<DbScheduleEntry> for (String, ScheduleEntry) {
    fn from(row: DbScheduleEntry) -> Self {
        (
            row.date.unwrap_or_default(),
            ScheduleEntry {
                song_id: row.song_id.unwrap_or_default(),
                completed: row.completed.unwrap_or_default(),
                notes: row.notes.unwrap_or_default(),
                completed_at: row
                    .completed_at
                    .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)),
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub id: String,
    pub song_id: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPracticeSession {
    pub id: Option<String>,
    pub song_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
}

impl From<DbPracticeSession> for PracticeSession {
    fn from(row: DbPracticeSession) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            song_id: row.song_id.unwrap_or_default(),
            date: row
                .date
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
            duration_minutes: row.duration_minutes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeVideo {
    pub id: String,
    pub song_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPracticeVideo {
    pub id: Option<String>,
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub recorded_at: Option<NaiveDateTime>,
}

impl From<DbPracticeVideo> for PracticeVideo {
    fn from(row: DbPracticeVideo) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            song_id: row.song_id.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            url: row.url.unwrap_or_default(),
            description: row.description,
            recorded_at: row
                .recorded_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}

/// Sparse song update. Absent fields are left untouched both locally and in
/// the remote row. A patch carrying only `components` is routed to
/// per-component progress writes instead of a whole-row song update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub status: Option<SongStatus>,
    pub tab_url: Option<String>,
    pub tab_content: Option<String>,
    pub backing_track_url: Option<String>,
    pub reference_url: Option<String>,
    pub notes: Option<String>,
    pub last_played: Option<DateTime<Utc>>,
    pub tone_preset_id: Option<String>,
    pub components: Option<Vec<SongComponent>>,
}

impl SongPatch {
    pub fn is_components_only(&self) -> bool {
        self.components.is_some()
            && self.project_id.is_none()
            && self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.key.is_none()
            && self.tempo.is_none()
            && self.difficulty.is_none()
            && self.status.is_none()
            && self.tab_url.is_none()
            && self.tab_content.is_none()
            && self.backing_track_url.is_none()
            && self.reference_url.is_none()
            && self.notes.is_none()
            && self.last_played.is_none()
            && self.tone_preset_id.is_none()
    }
}

/// Sparse schedule-entry update, merged into the (date, songId) entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub completed: Option<bool>,
    pub notes: Option<String>,
}
