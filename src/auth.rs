//! Sign-in against the user collection and on-disk session persistence
//!
//! The backend has no real auth endpoint; credentials are checked against
//! the `/users` collection and the session token is minted locally, then
//! cached so restarts skip the prompt.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::{ApiClient, ApiError, NewUser, User, UserPreferences};

const CACHE: &str = ".cache";
const SESSION_FILE: &str = ".cache/session.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

fn make_token(user_id: &str) -> String {
    format!("token_{}_{}", user_id, Utc::now().timestamp_millis())
}

/// Check credentials against the user collection and mint a session.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<Session, ApiError> {
    let users = api.get_users().await?;
    let Some(user) = users.into_iter().find(|u| u.email == email) else {
        return Err(ApiError::Credentials("User not found".to_string()));
    };
    if user.password != password {
        return Err(ApiError::Credentials("Invalid password".to_string()));
    }

    tracing::info!(user_id = %user.id, "Login successful");
    Ok(Session {
        token: make_token(&user.id),
        user,
    })
}

/// Create an account with default preferences and sign it in.
pub async fn signup(
    api: &ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Session, ApiError> {
    let users = api.get_users().await?;
    if users.iter().any(|u| u.email == email) {
        return Err(ApiError::Credentials(
            "User already exists with this email".to_string(),
        ));
    }

    let payload = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        created_at: Utc::now(),
        preferences: UserPreferences::default(),
        recently_played: Vec::new(),
    };
    let user = api.create_user(&payload).await?;

    tracing::info!(user_id = %user.id, "Signup successful");
    Ok(Session {
        token: make_token(&user.id),
        user,
    })
}

pub fn save_session(session: &Session) -> Result<()> {
    save_session_to(Path::new(CACHE), Path::new(SESSION_FILE), session)
}

pub fn load_session() -> Option<Session> {
    load_session_from(Path::new(SESSION_FILE))
}

pub fn clear_session() {
    let _ = fs::remove_file(SESSION_FILE);
}

fn save_session_to(cache_dir: &Path, file: &Path, session: &Session) -> Result<()> {
    if !cache_dir.exists() {
        fs::create_dir_all(cache_dir)?;
    }
    let content = serde_json::to_string_pretty(session)?;
    fs::write(file, content)?;
    tracing::debug!("Saved session to disk");
    Ok(())
}

fn load_session_from(file: &Path) -> Option<Session> {
    let content = fs::read_to_string(file).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable session cache");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn users_body() -> serde_json::Value {
        json!([
            {
                "id": "u1",
                "username": "maria",
                "email": "maria@example.com",
                "password": "secret",
            }
        ])
    }

    async fn mock_users(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users_body()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_rejects_unknown_email() {
        let server = MockServer::start().await;
        mock_users(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let err = login(&api, "nobody@example.com", "secret").await.unwrap_err();

        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let server = MockServer::start().await;
        mock_users(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let err = login(&api, "maria@example.com", "nope").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid password");
    }

    #[tokio::test]
    async fn login_mints_a_user_scoped_token() {
        let server = MockServer::start().await;
        mock_users(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let session = login(&api, "maria@example.com", "secret").await.unwrap();

        assert!(session.token.starts_with("token_u1_"));
        assert_eq!(session.user.username, "maria");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let server = MockServer::start().await;
        mock_users(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let err = signup(&api, "maria2", "maria@example.com", "pw")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User already exists with this email");
    }

    #[tokio::test]
    async fn signup_creates_user_with_default_preferences() {
        let server = MockServer::start().await;
        mock_users(&server).await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_partial_json(json!({
                "username": "newbie",
                "email": "new@example.com",
                "preferences": {
                    "theme": "dark",
                    "autoplay": true,
                    "volume": 80,
                    "quality": "high",
                },
                "recently_played": [],
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "u2",
                "username": "newbie",
                "email": "new@example.com",
                "password": "pw",
            })))
            .expect(1)
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let session = signup(&api, "newbie", "new@example.com", "pw").await.unwrap();

        assert!(session.token.starts_with("token_u2_"));
    }

    #[test]
    fn session_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        let session = Session {
            token: "token_u1_123".to_string(),
            user: User {
                id: "u1".to_string(),
                username: "maria".to_string(),
                email: "maria@example.com".to_string(),
                password: "secret".to_string(),
                created_at: None,
                preferences: UserPreferences::default(),
                recently_played: vec!["s1".to_string()],
            },
        };

        save_session_to(dir.path(), &file, &session).unwrap();
        let restored = load_session_from(&file).unwrap();

        assert_eq!(restored.token, session.token);
        assert_eq!(restored.user.recently_played, vec!["s1"]);
    }

    #[test]
    fn corrupt_session_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        std::fs::write(&file, "not json").unwrap();

        assert!(load_session_from(&file).is_none());
    }
}
