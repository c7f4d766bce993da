use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{User, UserSession};
use crate::error::AppError;
use crate::media::MediaUploader;
use crate::models::{
    AmpSettings, ComponentKind, Difficulty, EffectPedal, PracticeSession, PracticeVideo, Project,
    ScheduleEntry, SchedulePatch, Song, SongPatch, SongStatus, TonePreset,
};
use crate::remote::RemoteStore;
use crate::stats;
use crate::store::{
    AppStore, NewComponent, NewPracticeSession, NewPracticeVideo, NewProject, NewSong,
    NewTonePreset, date_key,
};
use crate::validation::{AppErrorExt, JsonValidateExt, ValidationResponse};

type ApiError = Custom<Json<ValidationResponse>>;

fn api_error(status: Status, field: &str, message: &str) -> ApiError {
    Custom(status, Json(ValidationResponse::with_error(field, message)))
}

fn parse_date_key(date: &str) -> Result<String, ApiError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(date_key)
        .map_err(|_| api_error(Status::BadRequest, "date", "Dates use the YYYY-MM-DD form"))
}

// ----------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------

#[derive(Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
    display_name: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    password: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub user: Option<UserData>,
    pub error: Option<String>,
}

async fn start_session(
    remote: &RemoteStore,
    user: &User,
    cookies: &CookieJar<'_>,
) -> Result<(), AppError> {
    let token = UserSession::generate_token();
    let expires_at = Utc::now() + chrono::Duration::hours(24);

    remote
        .create_session(&user.id, &token, expires_at.naive_utc())
        .await?;

    cookies.add_private(
        Cookie::build(("session_token", token))
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(rocket::time::Duration::hours(24)),
    );

    Ok(())
}

#[post("/signup", data = "<signup>")]
pub async fn api_signup(
    signup: Json<SignUpRequest>,
    cookies: &CookieJar<'_>,
    store: &State<Arc<AppStore>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let validated = signup.validate_custom()?;

    let Some(remote) = store.remote() else {
        return Err(api_error(
            Status::BadRequest,
            "database",
            "No remote store is configured; accounts are unavailable in demo mode",
        ));
    };

    let user = remote
        .create_user(
            &validated.email,
            &validated.password,
            validated.display_name.as_deref(),
        )
        .await
        .validate_custom()?;

    start_session(&remote, &user, cookies).await.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    Ok(Json(SessionResponse {
        success: true,
        user: Some(UserData::from(user)),
        error: None,
    }))
}

#[post("/signin", data = "<signin>")]
pub async fn api_signin(
    signin: Json<SignInRequest>,
    cookies: &CookieJar<'_>,
    store: &State<Arc<AppStore>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let validated = signin.validate_custom()?;

    let Some(remote) = store.remote() else {
        return Err(api_error(
            Status::BadRequest,
            "database",
            "No remote store is configured; accounts are unavailable in demo mode",
        ));
    };

    match remote
        .authenticate_user(&validated.email, &validated.password)
        .await
        .validate_custom()?
    {
        Some(user) => {
            start_session(&remote, &user, cookies).await.validate_custom()?;
            store.initialize(&user.id).await.validate_custom()?;

            Ok(Json(SessionResponse {
                success: true,
                user: Some(UserData::from(user)),
                error: None,
            }))
        }
        None => Ok(Json(SessionResponse {
            success: false,
            user: None,
            error: Some("Invalid email or password".to_string()),
        })),
    }
}

#[post("/signout")]
pub async fn api_signout(cookies: &CookieJar<'_>, store: &State<Arc<AppStore>>) -> Status {
    if let Some(remote) = store.remote() {
        if let Some(cookie) = cookies.get_private("session_token") {
            let _ = remote.invalidate_session(cookie.value()).await;
        }
    }

    cookies.remove_private(Cookie::build("session_token"));
    store.reset();

    Status::Ok
}

#[get("/me")]
pub async fn api_me(user: User) -> Json<UserData> {
    Json(UserData::from(user))
}

// ----------------------------------------------------------------------
// Collection reads
// ----------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub band_name: String,
    pub description: String,
    pub song_count: i64,
    pub completed_count: i64,
    pub completion_percent: i64,
}

impl ProjectResponse {
    // Counts come from actual song membership; the denormalized columns on
    // the project row are allowed to drift and are ignored here
    fn from_parts(project: Project, songs: &[Song]) -> Self {
        let members = songs.iter().filter(|s| s.project_id == project.id);
        let song_count = members.clone().count() as i64;
        let completed_count = members
            .filter(|s| s.status == SongStatus::PerformanceReady)
            .count() as i64;

        Self {
            completion_percent: stats::project_completion(songs, &project.id),
            id: project.id,
            name: project.name,
            band_name: project.band_name,
            description: project.description,
            song_count,
            completed_count,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SongResponse {
    #[serde(flatten)]
    pub song: Song,
    pub mastery: i64,
}

impl From<Song> for SongResponse {
    fn from(song: Song) -> Self {
        let mastery = stats::song_mastery(&song);
        Self { song, mastery }
    }
}

#[get("/projects")]
pub async fn api_get_projects(
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<ProjectResponse>>, Status> {
    store.initialize(&user.id).await?;

    let songs = store.songs();
    let projects = store
        .projects()
        .into_iter()
        .map(|p| ProjectResponse::from_parts(p, &songs))
        .collect();

    Ok(Json(projects))
}

#[get("/songs?<project>")]
pub async fn api_get_songs(
    project: Option<String>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<SongResponse>>, Status> {
    store.initialize(&user.id).await?;

    let songs = store
        .songs()
        .into_iter()
        .filter(|s| project.as_deref().map(|p| s.project_id == p).unwrap_or(true))
        .map(SongResponse::from)
        .collect();

    Ok(Json(songs))
}

#[get("/songs/<id>")]
pub async fn api_get_song(
    id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<SongResponse>, Status> {
    store.initialize(&user.id).await?;

    match store.song(id) {
        Some(song) => Ok(Json(SongResponse::from(song))),
        None => Err(Status::NotFound),
    }
}

#[get("/tones")]
pub async fn api_get_tone_presets(
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<TonePreset>>, Status> {
    store.initialize(&user.id).await?;
    Ok(Json(store.tone_presets()))
}

#[get("/schedule/today")]
pub async fn api_get_todays_schedule(
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<ScheduleEntry>>, Status> {
    store.initialize(&user.id).await?;
    Ok(Json(store.todays_schedule()))
}

#[get("/schedule/<date>", rank = 2)]
pub async fn api_get_schedule(
    date: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError> {
    let key = parse_date_key(date)?;
    store.initialize(&user.id).await.validate_custom()?;
    Ok(Json(store.schedule_for(&key)))
}

#[get("/songs/<id>/sessions")]
pub async fn api_get_practice_sessions(
    id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<PracticeSession>>, Status> {
    store.initialize(&user.id).await?;
    Ok(Json(store.practice_sessions(id)))
}

#[get("/songs/<id>/videos")]
pub async fn api_get_practice_videos(
    id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<Vec<PracticeVideo>>, Status> {
    store.initialize(&user.id).await?;
    Ok(Json(store.practice_videos(id)))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub day_streak: i64,
    pub mastery_percent: i64,
    pub minutes_this_week: i64,
    pub scheduled_today: usize,
    pub needs_attention: Vec<SongResponse>,
}

#[get("/stats")]
pub async fn api_get_stats(
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<StatsResponse>, Status> {
    store.initialize(&user.id).await?;

    let now = Utc::now();
    let songs = store.songs();
    let schedule = store.schedule_map();
    let sessions = store.practice_sessions_map();

    Ok(Json(StatsResponse {
        day_streak: stats::day_streak(&schedule, now.date_naive()),
        mastery_percent: stats::overall_mastery(&songs),
        minutes_this_week: stats::minutes_this_week(&sessions, now),
        scheduled_today: store.todays_schedule_ids().len(),
        needs_attention: stats::needs_attention(&songs, now)
            .into_iter()
            .map(SongResponse::from)
            .collect(),
    }))
}

// ----------------------------------------------------------------------
// Error slot
// ----------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataErrorResponse {
    pub error: Option<String>,
    pub remote_configured: bool,
}

#[get("/data-error")]
pub async fn api_get_data_error(
    _user: User,
    store: &State<Arc<AppStore>>,
) -> Json<DataErrorResponse> {
    Json(DataErrorResponse {
        error: store.last_error(),
        remote_configured: store.is_remote_configured(),
    })
}

#[delete("/data-error")]
pub async fn api_clear_data_error(_user: User, store: &State<Arc<AppStore>>) -> Status {
    store.clear_error();
    Status::NoContent
}

// ----------------------------------------------------------------------
// Mutations
// ----------------------------------------------------------------------

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Project name is required"))]
    name: String,
    #[serde(default)]
    band_name: String,
    #[serde(default)]
    description: String,
}

#[post("/projects", data = "<project>")]
pub async fn api_create_project(
    project: Json<CreateProjectRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Custom<Json<ProjectResponse>>, ApiError> {
    let validated = project.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    let created = store.add_project(NewProject {
        name: validated.name,
        band_name: validated.band_name,
        description: validated.description,
    });

    let songs = store.songs();
    Ok(Custom(
        Status::Created,
        Json(ProjectResponse::from_parts(created, &songs)),
    ))
}

#[delete("/projects/<id>")]
pub async fn api_delete_project(
    id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Status, Status> {
    store.initialize(&user.id).await?;

    if store.projects().iter().all(|p| p.id != id) {
        return Err(Status::NotFound);
    }

    store.delete_project(id);
    Ok(Status::NoContent)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub progress: i64,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSongRequest {
    #[validate(length(min = 1, message = "A project is required"))]
    project_id: String,
    #[validate(length(min = 1, message = "Song title is required"))]
    title: String,
    #[serde(default)]
    artist: String,
    album: Option<String>,
    key: Option<String>,
    tempo: Option<i64>,
    difficulty: Option<Difficulty>,
    status: Option<SongStatus>,
    tab_url: Option<String>,
    tab_content: Option<String>,
    backing_track_url: Option<String>,
    reference_url: Option<String>,
    notes: Option<String>,
    tone_preset_id: Option<String>,
    #[serde(default)]
    components: Vec<ComponentInput>,
}

#[post("/songs", data = "<song>")]
pub async fn api_create_song(
    song: Json<CreateSongRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Custom<Json<SongResponse>>, ApiError> {
    let validated = song.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    if store.projects().iter().all(|p| p.id != validated.project_id) {
        return Err(api_error(
            Status::UnprocessableEntity,
            "projectId",
            "Unknown project",
        ));
    }

    let created = store.add_song(NewSong {
        project_id: validated.project_id,
        title: validated.title,
        artist: validated.artist,
        album: validated.album,
        key: validated.key,
        tempo: validated.tempo,
        difficulty: validated.difficulty.unwrap_or(Difficulty::Beginner),
        status: validated.status.unwrap_or(SongStatus::NotStarted),
        tab_url: validated.tab_url,
        tab_content: validated.tab_content,
        backing_track_url: validated.backing_track_url,
        reference_url: validated.reference_url,
        notes: validated.notes,
        tone_preset_id: validated.tone_preset_id,
        components: validated
            .components
            .into_iter()
            .map(|c| NewComponent {
                name: c.name,
                kind: c.kind,
                progress: c.progress,
            })
            .collect(),
    });

    Ok(Custom(Status::Created, Json(SongResponse::from(created))))
}

#[put("/songs/<id>", data = "<patch>")]
pub async fn api_update_song(
    id: &str,
    patch: Json<SongPatch>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<SongResponse>, Status> {
    store.initialize(&user.id).await?;

    match store.update_song(id, patch.into_inner()) {
        Some(song) => Ok(Json(SongResponse::from(song))),
        None => Err(Status::NotFound),
    }
}

#[delete("/songs/<id>")]
pub async fn api_delete_song(
    id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Status, Status> {
    store.initialize(&user.id).await?;

    if store.song(id).is_none() {
        return Err(Status::NotFound);
    }

    store.delete_song(id);
    Ok(Status::NoContent)
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TonePresetRequest {
    #[validate(length(min = 1, message = "Preset name is required"))]
    name: String,
    description: Option<String>,
    #[serde(default)]
    guitar_model: String,
    #[serde(default)]
    pickup_position: String,
    #[serde(default)]
    amp_settings: AmpSettings,
    #[serde(default)]
    effects: Vec<EffectPedal>,
    #[serde(default)]
    tags: Vec<String>,
}

#[post("/tones", data = "<preset>")]
pub async fn api_create_tone_preset(
    preset: Json<TonePresetRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Custom<Json<TonePreset>>, ApiError> {
    let validated = preset.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    let created = store.add_tone_preset(NewTonePreset {
        name: validated.name,
        description: validated.description,
        guitar_model: validated.guitar_model,
        pickup_position: validated.pickup_position,
        amp_settings: validated.amp_settings,
        effects: validated.effects,
        tags: validated.tags,
    });

    Ok(Custom(Status::Created, Json(created)))
}

#[put("/tones/<id>", data = "<preset>")]
pub async fn api_update_tone_preset(
    id: &str,
    preset: Json<TonePresetRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<TonePreset>, ApiError> {
    let validated = preset.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    let updated = store.update_tone_preset(TonePreset {
        id: id.to_string(),
        name: validated.name,
        description: validated.description,
        guitar_model: validated.guitar_model,
        pickup_position: validated.pickup_position,
        amp_settings: validated.amp_settings,
        effects: validated.effects,
        tags: validated.tags,
    });

    match updated {
        Some(preset) => Ok(Json(preset)),
        None => Err(api_error(
            Status::NotFound,
            "resource",
            "Tone preset not found",
        )),
    }
}

#[delete("/tones/<id>")]
pub async fn api_delete_tone_preset(
    id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Status, Status> {
    store.initialize(&user.id).await?;

    if store.tone_preset(id).is_none() {
        return Err(Status::NotFound);
    }

    store.delete_tone_preset(id);
    Ok(Status::NoContent)
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAddRequest {
    #[validate(length(min = 1, message = "A song is required"))]
    song_id: String,
}

#[post("/schedule/<date>", data = "<request>")]
pub async fn api_add_to_schedule(
    date: &str,
    request: Json<ScheduleAddRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let key = parse_date_key(date)?;
    let validated = request.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    if store.song(&validated.song_id).is_none() {
        return Err(api_error(
            Status::UnprocessableEntity,
            "songId",
            "Unknown song",
        ));
    }

    Ok(Json(store.add_to_schedule(&key, &validated.song_id)))
}

#[delete("/schedule/<date>/<song_id>")]
pub async fn api_remove_from_schedule(
    date: &str,
    song_id: &str,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Status, ApiError> {
    let key = parse_date_key(date)?;
    store.initialize(&user.id).await.validate_custom()?;

    store.remove_from_schedule(&key, song_id);
    Ok(Status::NoContent)
}

#[put("/schedule/<date>/<song_id>", data = "<patch>")]
pub async fn api_update_schedule_entry(
    date: &str,
    song_id: &str,
    patch: Json<SchedulePatch>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let key = parse_date_key(date)?;
    store.initialize(&user.id).await.validate_custom()?;

    match store.update_schedule_entry(&key, song_id, patch.into_inner()) {
        Some(entry) => Ok(Json(entry)),
        None => Err(api_error(
            Status::NotFound,
            "resource",
            "No schedule entry for that date and song",
        )),
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogSessionRequest {
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    duration_minutes: i64,
    date: Option<DateTime<Utc>>,
}

#[post("/songs/<id>/sessions", data = "<request>")]
pub async fn api_log_practice_session(
    id: &str,
    request: Json<LogSessionRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Custom<Json<PracticeSession>>, ApiError> {
    let validated = request.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    if store.song(id).is_none() {
        return Err(api_error(Status::NotFound, "resource", "Song not found"));
    }

    let session = store.add_practice_session(NewPracticeSession {
        song_id: id.to_string(),
        date: validated.date,
        duration_minutes: validated.duration_minutes,
    });

    // Practicing a song also freshens its last-played mark
    store.update_song(
        id,
        SongPatch {
            last_played: Some(session.date),
            ..SongPatch::default()
        },
    );

    Ok(Custom(Status::Created, Json(session)))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, message = "Video title is required"))]
    title: String,
    #[validate(url(message = "A valid video URL is required"))]
    url: String,
    description: Option<String>,
    recorded_at: Option<DateTime<Utc>>,
}

#[post("/songs/<id>/videos", data = "<request>")]
pub async fn api_create_practice_video(
    id: &str,
    request: Json<CreateVideoRequest>,
    user: User,
    store: &State<Arc<AppStore>>,
) -> Result<Custom<Json<PracticeVideo>>, ApiError> {
    let validated = request.validate_custom()?;
    store.initialize(&user.id).await.validate_custom()?;

    if store.song(id).is_none() {
        return Err(api_error(Status::NotFound, "resource", "Song not found"));
    }

    let video = store.add_practice_video(NewPracticeVideo {
        song_id: id.to_string(),
        title: validated.title,
        url: validated.url,
        description: validated.description,
        recorded_at: validated.recorded_at,
    });

    Ok(Custom(Status::Created, Json(video)))
}

#[post("/songs/<id>/videos/upload?<title>&<description>", data = "<file>")]
pub async fn api_upload_practice_video(
    id: &str,
    title: &str,
    description: Option<&str>,
    file: Vec<u8>,
    user: User,
    store: &State<Arc<AppStore>>,
    media: &State<Option<MediaUploader>>,
) -> Result<Custom<Json<PracticeVideo>>, ApiError> {
    store.initialize(&user.id).await.validate_custom()?;

    if title.is_empty() {
        return Err(api_error(Status::UnprocessableEntity, "title", "Video title is required"));
    }
    if store.song(id).is_none() {
        return Err(api_error(Status::NotFound, "resource", "Song not found"));
    }

    let Some(uploader) = media.inner().clone() else {
        return Err(api_error(
            Status::ServiceUnavailable,
            "media",
            "No media host is configured",
        ));
    };

    // The HTTP client is blocking; keep it off the request executor
    let url = match rocket::tokio::task::spawn_blocking(move || uploader.upload(&file)).await {
        Ok(result) => result.validate_custom()?,
        Err(e) => {
            return Err(api_error(
                Status::InternalServerError,
                "server",
                &format!("Upload task failed: {}", e),
            ));
        }
    };

    let video = store.add_practice_video(NewPracticeVideo {
        song_id: id.to_string(),
        title: title.to_string(),
        url,
        description: description.map(String::from),
        recorded_at: None,
    });

    Ok(Custom(Status::Created, Json(video)))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
