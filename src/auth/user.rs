use chrono::{DateTime, NaiveDateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        let email = user.email.unwrap_or_default();
        Self {
            id: user.id.unwrap_or_default(),
            // Fall back to the mailbox name when no display name was set
            display_name: user
                .display_name
                .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string()),
            email,
        }
    }
}

impl User {
    /// The fixed identity served when no remote store is configured.
    pub fn demo() -> Self {
        Self {
            id: "demo".to_string(),
            email: "demo@localhost".to_string(),
            display_name: "Demo".to_string(),
        }
    }
}

pub struct UserSession {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUserSession {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub token: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

impl From<DbUserSession> for UserSession {
    fn from(session: DbUserSession) -> Self {
        Self {
            id: session.id.unwrap_or_default(),
            user_id: session.user_id.unwrap_or_default(),
            token: session.token.unwrap_or_default(),
            created_at: session
                .created_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
            // A row with no expiry decodes as already expired
            expires_at: session
                .expires_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl UserSession {
    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}
