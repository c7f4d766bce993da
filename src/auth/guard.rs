use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::store::AppStore;

use super::User;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let store = match request.rocket().state::<Arc<AppStore>>() {
            Some(store) => store,
            _ => {
                tracing::error!("Application store not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        // Without a configured remote there are no accounts to check against;
        // the app runs on local state under a fixed identity
        let remote = match store.remote() {
            Some(remote) => remote,
            _ => return Outcome::Success(User::demo()),
        };

        let token = request
            .cookies()
            .get_private("session_token")
            .map(|c| c.value().to_string());

        if let Some(token) = token {
            match remote.session_by_token(&token).await {
                Ok(session) => {
                    if !session.is_valid() {
                        tracing::warn!("Session token expired");
                        return Outcome::Error((Status::Unauthorized, ()));
                    }

                    match remote.user_by_id(&session.user_id).await {
                        Ok(user) => {
                            return Outcome::Success(user);
                        }
                        Err(err) => {
                            tracing::error!(user_id = %session.user_id, error = ?err, "Failed to fetch user for valid session");
                            return Outcome::Error((Status::InternalServerError, ()));
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = ?err, "Invalid session token");
                    return Outcome::Error((Status::Unauthorized, ()));
                }
            }
        }

        Outcome::Error((Status::Unauthorized, ()))
    }
}

#[catch(401)]
pub fn unauthorized_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unauthorized",
        "message": "Authentication required"
    });

    Custom(Status::Unauthorized, Json(error_json))
}
