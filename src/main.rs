#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod env;
mod error;
mod media;
mod models;
mod remote;
mod stats;
mod store;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use tracing::{error, info};

use api::{
    api_add_to_schedule, api_clear_data_error, api_create_practice_video, api_create_project,
    api_create_song, api_create_tone_preset, api_delete_project, api_delete_song,
    api_delete_tone_preset, api_get_data_error, api_get_practice_sessions,
    api_get_practice_videos, api_get_projects, api_get_schedule, api_get_song, api_get_songs,
    api_get_stats, api_get_todays_schedule, api_get_tone_presets, api_log_practice_session,
    api_me, api_remove_from_schedule, api_signin, api_signout, api_signup, api_update_schedule_entry,
    api_update_song, api_update_tone_preset, api_upload_practice_video, health,
};
use auth::unauthorized_api;
use media::MediaUploader;
use remote::RemoteStore;
use store::AppStore;
use telemetry::{TelemetryFairing, init_tracing, shutdown_telemetry};

#[launch]
async fn rocket() -> _ {
    if let Err(e) = env::load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }
    init_tracing();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();
    let remote = if database_url.is_empty() {
        info!("DATABASE_URL not set; running on local state only");
        None
    } else {
        let remote = RemoteStore::connect(&database_url)
            .await
            .expect("Failed to connect to database");

        info!("Running database migrations...");
        remote.migrate().await.expect("Database migration failed");

        Some(remote)
    };

    let store = Arc::new(AppStore::new(remote));

    if let Some(remote) = store.remote() {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;

            loop {
                match remote.clean_expired_sessions().await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleaned up {} expired sessions", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to clean expired sessions: {}", e);
                    }
                }

                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
        });
    }

    init_rocket(store, MediaUploader::from_env()).await
}

pub async fn init_rocket(store: Arc<AppStore>, media: Option<MediaUploader>) -> Rocket<Build> {
    info!("Starting woodshed");

    rocket::build()
        .manage(store)
        .manage(media)
        .mount(
            "/api",
            routes![
                api_signup,
                api_signin,
                api_signout,
                api_me,
                api_get_projects,
                api_create_project,
                api_delete_project,
                api_get_songs,
                api_get_song,
                api_create_song,
                api_update_song,
                api_delete_song,
                api_get_tone_presets,
                api_create_tone_preset,
                api_update_tone_preset,
                api_delete_tone_preset,
                api_get_todays_schedule,
                api_get_schedule,
                api_add_to_schedule,
                api_remove_from_schedule,
                api_update_schedule_entry,
                api_get_practice_sessions,
                api_log_practice_session,
                api_get_practice_videos,
                api_create_practice_video,
                api_upload_practice_video,
                api_get_stats,
                api_get_data_error,
                api_clear_data_error,
                health,
            ],
        )
        .register("/api", catchers![unauthorized_api])
        .attach(TelemetryFairing)
        .attach(AdHoc::on_shutdown("Telemetry shutdown", |_| {
            Box::pin(async {
                shutdown_telemetry();
            })
        }))
}
