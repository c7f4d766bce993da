use chrono::{NaiveDateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::{DbUser, DbUserSession, User, UserSession};
use crate::error::AppError;
use crate::models::{
    DbPracticeSession, DbPracticeVideo, DbProject, DbScheduleEntry, DbSong, DbSongComponent,
    DbTonePreset, PracticeSession, PracticeVideo, Project, ScheduleEntry, SchedulePatch, Song,
    SongComponent, SongPatch, TonePreset,
};

/// Thin accessor over the hosted relational backend. Everything above this
/// layer sees domain models only; row shapes stay in here and in the
/// normalizer conversions. Server-issued ids are minted at insert time, so
/// optimistic client ids never reach a persisted row.
pub struct RemoteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    password: Option<String>,
}

impl RemoteStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // A single pooled connection keeps one in-memory database alive for the
    // whole test
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ------------------------------------------------------------------
    // Auth-session primitive
    // ------------------------------------------------------------------

    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AppError> {
        info!("Creating user account");

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Validation(format!(
                "An account for {} already exists",
                email
            )));
        }

        let id = Uuid::new_v4().to_string();
        let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

        sqlx::query("INSERT INTO users (id, email, password, display_name) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(email)
            .bind(&hashed)
            .bind(display_name)
            .execute(&self.pool)
            .await?;

        self.user_by_id(&id).await
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        info!("Authenticating user");
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, display_name, password FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let valid = bcrypt::verify(password, &row.password.clone().unwrap_or_default())
                    .unwrap_or(false);
                if valid {
                    Ok(Some(User::from(DbUser {
                        id: row.id,
                        email: row.email,
                        display_name: row.display_name,
                    })))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn user_by_id(&self, id: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, DbUser>(
            "SELECT id, email, display_name FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(user) => Ok(User::from(user)),
            _ => Err(AppError::NotFound(format!("User {} not found", id))),
        }
    }

    #[instrument(skip(self, token))]
    pub async fn create_session(
        &self,
        user_id: &str,
        token: &str,
        expires_at: NaiveDateTime,
    ) -> Result<(), AppError> {
        info!("Creating user session");
        sqlx::query(
            "INSERT INTO user_sessions (id, user_id, token, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    pub async fn session_by_token(&self, token: &str) -> Result<UserSession, AppError> {
        let row = sqlx::query_as::<_, DbUserSession>(
            "SELECT id, user_id, token, created_at, expires_at FROM user_sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(session) => Ok(UserSession::from(session)),
            _ => Err(AppError::Authentication("Invalid session token".to_string())),
        }
    }

    #[instrument(skip(self, token))]
    pub async fn invalidate_session(&self, token: &str) -> Result<(), AppError> {
        info!("Invalidating session");
        sqlx::query("DELETE FROM user_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clean_expired_sessions(&self) -> Result<u64, AppError> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ------------------------------------------------------------------
    // Collection loads (one pass per sign-in)
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn projects_for(&self, user_id: &str) -> Result<Vec<Project>, AppError> {
        info!("Loading projects");
        let rows = sqlx::query_as::<_, DbProject>(
            "SELECT id, name, band_name, description, song_count, completed_count
             FROM projects WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn songs_for(&self, user_id: &str) -> Result<Vec<Song>, AppError> {
        info!("Loading songs");
        let rows = sqlx::query_as::<_, DbSong>(
            "SELECT s.id, s.project_id, s.title, s.artist, s.album, s.key, s.tempo,
                    s.difficulty, s.status, s.tab_url, s.tab_content, s.backing_track_url,
                    s.reference_url, s.notes, s.last_played, s.tone_preset_id
             FROM songs s
             JOIN projects p ON p.id = s.project_id
             WHERE p.user_id = ?
             ORDER BY s.created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let component_rows = sqlx::query_as::<_, DbSongComponent>(
            "SELECT sc.id, sc.song_id, sc.name, sc.type, sc.progress
             FROM song_components sc
             JOIN songs s ON s.id = sc.song_id
             JOIN projects p ON p.id = s.project_id
             WHERE p.user_id = ?
             ORDER BY sc.created_at, sc.rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut songs: Vec<Song> = rows.into_iter().map(Song::from).collect();
        for row in component_rows {
            let component = SongComponent::from(row);
            if let Some(song) = songs.iter_mut().find(|s| s.id == component.song_id) {
                song.components.push(component);
            }
        }
        Ok(songs)
    }

    #[instrument(skip(self))]
    pub async fn tone_presets_for(&self, user_id: &str) -> Result<Vec<TonePreset>, AppError> {
        info!("Loading tone presets");
        let rows = sqlx::query_as::<_, DbTonePreset>(
            "SELECT id, name, description, guitar_model, pickup_position,
                    amp_settings, effects_chain, style_tags
             FROM tone_presets WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TonePreset::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn schedule_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<(String, ScheduleEntry)>, AppError> {
        info!("Loading practice schedule");
        let rows = sqlx::query_as::<_, DbScheduleEntry>(
            "SELECT date, song_id, completed, notes, completed_at
             FROM practice_schedule WHERE user_id = ? ORDER BY date, rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(<(String, ScheduleEntry)>::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn practice_sessions_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<PracticeSession>, AppError> {
        info!("Loading practice sessions");
        let rows = sqlx::query_as::<_, DbPracticeSession>(
            "SELECT id, song_id, date, duration_minutes
             FROM practice_sessions WHERE user_id = ? ORDER BY date",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PracticeSession::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn practice_videos_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<PracticeVideo>, AppError> {
        info!("Loading practice videos");
        let rows = sqlx::query_as::<_, DbPracticeVideo>(
            "SELECT id, song_id, title, url, description, recorded_at
             FROM practice_videos WHERE user_id = ? ORDER BY recorded_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PracticeVideo::from).collect())
    }

    // ------------------------------------------------------------------
    // Inserts, each returning the authoritative row for reconciliation
    // ------------------------------------------------------------------

    #[instrument(skip(self, project))]
    pub async fn insert_project(
        &self,
        user_id: &str,
        project: &Project,
    ) -> Result<Project, AppError> {
        info!("Inserting project");
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO projects (id, user_id, name, band_name, description)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&project.name)
        .bind(&project.band_name)
        .bind(&project.description)
        .execute(&self.pool)
        .await?;

        self.project_by_id(&id).await
    }

    #[instrument(skip(self))]
    async fn project_by_id(&self, id: &str) -> Result<Project, AppError> {
        let row = sqlx::query_as::<_, DbProject>(
            "SELECT id, name, band_name, description, song_count, completed_count
             FROM projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(project) => Ok(Project::from(project)),
            _ => Err(AppError::NotFound(format!("Project {} not found", id))),
        }
    }

    /// Inserts a song row, then its component rows. These are separate
    /// statements against separate tables; a failure mid-way leaves the song
    /// row without components, which the next full load will surface.
    #[instrument(skip(self, song))]
    pub async fn insert_song(&self, song: &Song) -> Result<Song, AppError> {
        info!("Inserting song");
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO songs (id, project_id, title, artist, album, key, tempo,
                                difficulty, status, tab_url, tab_content,
                                backing_track_url, reference_url, notes,
                                last_played, tone_preset_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&song.project_id)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(&song.key)
        .bind(song.tempo)
        .bind(song.difficulty.as_str())
        .bind(song.status.as_str())
        .bind(&song.tab_url)
        .bind(&song.tab_content)
        .bind(&song.backing_track_url)
        .bind(&song.reference_url)
        .bind(&song.notes)
        .bind(song.last_played.map(|dt| dt.naive_utc()))
        .bind(&song.tone_preset_id)
        .execute(&self.pool)
        .await?;

        for component in &song.components {
            self.insert_component(&id, component).await?;
        }

        self.song_by_id(&id).await
    }

    #[instrument(skip(self, component))]
    async fn insert_component(
        &self,
        song_id: &str,
        component: &SongComponent,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO song_components (id, song_id, name, type, progress)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(song_id)
        .bind(&component.name)
        .bind(component.kind.as_str())
        .bind(component.progress.clamp(0, 100))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn song_by_id(&self, id: &str) -> Result<Song, AppError> {
        let row = sqlx::query_as::<_, DbSong>(
            "SELECT id, project_id, title, artist, album, key, tempo, difficulty,
                    status, tab_url, tab_content, backing_track_url, reference_url,
                    notes, last_played, tone_preset_id
             FROM songs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let mut song = match row {
            Some(song) => Song::from(song),
            _ => return Err(AppError::NotFound(format!("Song {} not found", id))),
        };

        let component_rows = sqlx::query_as::<_, DbSongComponent>(
            "SELECT id, song_id, name, type, progress
             FROM song_components WHERE song_id = ? ORDER BY created_at, rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        song.components = component_rows.into_iter().map(SongComponent::from).collect();
        Ok(song)
    }

    #[instrument(skip(self, preset))]
    pub async fn insert_tone_preset(
        &self,
        user_id: &str,
        preset: &TonePreset,
    ) -> Result<TonePreset, AppError> {
        info!("Inserting tone preset");
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO tone_presets (id, user_id, name, description, guitar_model,
                                       pickup_position, amp_settings, effects_chain, style_tags)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&preset.name)
        .bind(&preset.description)
        .bind(&preset.guitar_model)
        .bind(&preset.pickup_position)
        .bind(serde_json::to_string(&preset.amp_settings).unwrap_or_default())
        .bind(serde_json::to_string(&preset.effects).unwrap_or_default())
        .bind(serde_json::to_string(&preset.tags).unwrap_or_default())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, DbTonePreset>(
            "SELECT id, name, description, guitar_model, pickup_position,
                    amp_settings, effects_chain, style_tags
             FROM tone_presets WHERE id = ?",
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TonePreset::from(row))
    }

    #[instrument(skip(self, entry))]
    pub async fn insert_schedule_entry(
        &self,
        user_id: &str,
        date: &str,
        entry: &ScheduleEntry,
    ) -> Result<(), AppError> {
        info!("Inserting schedule entry");
        // OR IGNORE keeps the (user, date, song) pair idempotent under the
        // unique constraint
        sqlx::query(
            "INSERT OR IGNORE INTO practice_schedule (id, user_id, date, song_id, completed, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(date)
        .bind(&entry.song_id)
        .bind(entry.completed)
        .bind(&entry.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, session))]
    pub async fn insert_practice_session(
        &self,
        user_id: &str,
        session: &PracticeSession,
    ) -> Result<PracticeSession, AppError> {
        info!("Inserting practice session");
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO practice_sessions (id, user_id, song_id, date, duration_minutes)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&session.song_id)
        .bind(session.date.naive_utc())
        .bind(session.duration_minutes)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, DbPracticeSession>(
            "SELECT id, song_id, date, duration_minutes FROM practice_sessions WHERE id = ?",
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PracticeSession::from(row))
    }

    #[instrument(skip(self, video))]
    pub async fn insert_practice_video(
        &self,
        user_id: &str,
        video: &PracticeVideo,
    ) -> Result<PracticeVideo, AppError> {
        info!("Inserting practice video");
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO practice_videos (id, user_id, song_id, title, url, description, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&video.song_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.description)
        .bind(video.recorded_at.naive_utc())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, DbPracticeVideo>(
            "SELECT id, song_id, title, url, description, recorded_at
             FROM practice_videos WHERE id = ?",
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PracticeVideo::from(row))
    }

    // ------------------------------------------------------------------
    // Sparse updates: only fields present in the patch reach the row
    // ------------------------------------------------------------------

    #[instrument(skip(self, patch))]
    pub async fn update_song(&self, id: &str, patch: &SongPatch) -> Result<(), AppError> {
        info!("Updating song");
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE songs SET ");
        let mut fields = qb.separated(", ");
        let mut any = false;

        if let Some(project_id) = &patch.project_id {
            fields.push("project_id = ").push_bind_unseparated(project_id);
            any = true;
        }
        if let Some(title) = &patch.title {
            fields.push("title = ").push_bind_unseparated(title);
            any = true;
        }
        if let Some(artist) = &patch.artist {
            fields.push("artist = ").push_bind_unseparated(artist);
            any = true;
        }
        if let Some(album) = &patch.album {
            fields.push("album = ").push_bind_unseparated(album);
            any = true;
        }
        if let Some(key) = &patch.key {
            fields.push("key = ").push_bind_unseparated(key);
            any = true;
        }
        if let Some(tempo) = patch.tempo {
            fields.push("tempo = ").push_bind_unseparated(tempo);
            any = true;
        }
        if let Some(difficulty) = patch.difficulty {
            fields
                .push("difficulty = ")
                .push_bind_unseparated(difficulty.as_str().to_string());
            any = true;
        }
        if let Some(status) = patch.status {
            fields
                .push("status = ")
                .push_bind_unseparated(status.as_str().to_string());
            any = true;
        }
        if let Some(tab_url) = &patch.tab_url {
            fields.push("tab_url = ").push_bind_unseparated(tab_url);
            any = true;
        }
        if let Some(tab_content) = &patch.tab_content {
            fields.push("tab_content = ").push_bind_unseparated(tab_content);
            any = true;
        }
        if let Some(backing_track_url) = &patch.backing_track_url {
            fields
                .push("backing_track_url = ")
                .push_bind_unseparated(backing_track_url);
            any = true;
        }
        if let Some(reference_url) = &patch.reference_url {
            fields
                .push("reference_url = ")
                .push_bind_unseparated(reference_url);
            any = true;
        }
        if let Some(notes) = &patch.notes {
            fields.push("notes = ").push_bind_unseparated(notes);
            any = true;
        }
        if let Some(last_played) = patch.last_played {
            fields
                .push("last_played = ")
                .push_bind_unseparated(last_played.naive_utc());
            any = true;
        }
        if let Some(tone_preset_id) = &patch.tone_preset_id {
            fields
                .push("tone_preset_id = ")
                .push_bind_unseparated(tone_preset_id);
            any = true;
        }

        if !any {
            return Ok(());
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_component_progress(
        &self,
        component_id: &str,
        progress: i64,
    ) -> Result<(), AppError> {
        info!("Updating component progress");
        sqlx::query("UPDATE song_components SET progress = ? WHERE id = ?")
            .bind(progress.clamp(0, 100))
            .bind(component_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, preset))]
    pub async fn update_tone_preset(&self, preset: &TonePreset) -> Result<(), AppError> {
        info!("Updating tone preset");
        sqlx::query(
            "UPDATE tone_presets
             SET name = ?, description = ?, guitar_model = ?, pickup_position = ?,
                 amp_settings = ?, effects_chain = ?, style_tags = ?
             WHERE id = ?",
        )
        .bind(&preset.name)
        .bind(&preset.description)
        .bind(&preset.guitar_model)
        .bind(&preset.pickup_position)
        .bind(serde_json::to_string(&preset.amp_settings).unwrap_or_default())
        .bind(serde_json::to_string(&preset.effects).unwrap_or_default())
        .bind(serde_json::to_string(&preset.tags).unwrap_or_default())
        .bind(&preset.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    pub async fn update_schedule_entry(
        &self,
        user_id: &str,
        date: &str,
        song_id: &str,
        patch: &SchedulePatch,
    ) -> Result<(), AppError> {
        info!("Updating schedule entry");
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE practice_schedule SET ");
        let mut fields = qb.separated(", ");
        let mut any = false;

        if let Some(completed) = patch.completed {
            fields.push("completed = ").push_bind_unseparated(completed);
            // Completion is timestamped on the row when it is set
            if completed {
                fields
                    .push("completed_at = ")
                    .push_bind_unseparated(Utc::now().naive_utc());
            } else {
                fields.push("completed_at = NULL");
            }
            any = true;
        }
        if let Some(notes) = &patch.notes {
            fields.push("notes = ").push_bind_unseparated(notes);
            any = true;
        }

        if !any {
            return Ok(());
        }

        qb.push(" WHERE user_id = ")
            .push_bind(user_id)
            .push(" AND date = ")
            .push_bind(date)
            .push(" AND song_id = ")
            .push_bind(song_id);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        info!("Deleting project");
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_song(&self, id: &str) -> Result<(), AppError> {
        info!("Deleting song");
        sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_tone_preset(&self, id: &str) -> Result<(), AppError> {
        info!("Deleting tone preset");
        sqlx::query("DELETE FROM tone_presets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_schedule_entry(
        &self,
        user_id: &str,
        date: &str,
        song_id: &str,
    ) -> Result<(), AppError> {
        info!("Deleting schedule entry");
        sqlx::query(
            "DELETE FROM practice_schedule WHERE user_id = ? AND date = ? AND song_id = ?",
        )
        .bind(user_id)
        .bind(date)
        .bind(song_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
