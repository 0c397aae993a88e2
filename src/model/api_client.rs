//! REST client for the catalog backend with all API methods

use std::collections::HashMap;

use chrono::Utc;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use super::catalog::{
    Album, Artist, Genre, NewPlaylist, NewUser, Playlist, Song, User, UserPreferences,
    enrich_songs,
};
use super::content::PlaylistDetail;
use super::error::ApiError;
use super::types::PlaylistItem;

const USER_AGENT: &str = concat!("rhythmic-rs/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for the backend's flat REST collections. Cheap to clone; all
/// clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute form of a possibly relative media path.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn put_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    // --- Catalog ---

    pub async fn get_songs(&self) -> Result<Vec<Song>, ApiError> {
        tracing::debug!("API: get_songs");
        self.get_json("/songs").await
    }

    pub async fn get_artists(&self) -> Result<Vec<Artist>, ApiError> {
        tracing::debug!("API: get_artists");
        self.get_json("/artists").await
    }

    pub async fn get_albums(&self) -> Result<Vec<Album>, ApiError> {
        tracing::debug!("API: get_albums");
        self.get_json("/albums").await
    }

    pub async fn get_genres(&self) -> Result<Vec<Genre>, ApiError> {
        tracing::debug!("API: get_genres");
        self.get_json("/genres").await
    }

    /// All songs joined with artist and album display data.
    pub async fn get_songs_with_details(&self) -> Result<Vec<Song>, ApiError> {
        tracing::debug!("API: get_songs_with_details");
        let (songs, artists, albums) =
            futures::try_join!(self.get_songs(), self.get_artists(), self.get_albums())?;
        Ok(enrich_songs(songs, &artists, &albums))
    }

    /// Full-text search over songs, joined like [`Self::get_songs_with_details`].
    pub async fn search_songs(&self, query: &str) -> Result<Vec<Song>, ApiError> {
        tracing::debug!(query, "API: search_songs");
        let params = [("q", query)];
        let (songs, artists, albums) = futures::try_join!(
            self.get_json_query::<Vec<Song>>("/songs", &params),
            self.get_artists(),
            self.get_albums()
        )?;
        Ok(enrich_songs(songs, &artists, &albums))
    }

    pub async fn get_songs_by_artist(&self, artist_id: &str) -> Result<Vec<Song>, ApiError> {
        tracing::debug!(artist_id, "API: get_songs_by_artist");
        let (songs, artists, albums) = futures::try_join!(
            self.get_json_query::<Vec<Song>>("/songs", &[("artist_id", artist_id)]),
            self.get_artists(),
            self.get_albums()
        )?;
        Ok(enrich_songs(songs, &artists, &albums))
    }

    pub async fn get_songs_by_album(&self, album_id: &str) -> Result<Vec<Song>, ApiError> {
        tracing::debug!(album_id, "API: get_songs_by_album");
        let (songs, artists, albums) = futures::try_join!(
            self.get_json_query::<Vec<Song>>("/songs", &[("album_id", album_id)]),
            self.get_artists(),
            self.get_albums()
        )?;
        Ok(enrich_songs(songs, &artists, &albums))
    }

    pub async fn get_songs_by_genre(&self, genre: &str) -> Result<Vec<Song>, ApiError> {
        tracing::debug!(genre, "API: get_songs_by_genre");
        let (songs, artists, albums) = futures::try_join!(
            self.get_json_query::<Vec<Song>>("/songs", &[("genre", genre)]),
            self.get_artists(),
            self.get_albums()
        )?;
        Ok(enrich_songs(songs, &artists, &albums))
    }

    // --- Users ---

    pub async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        tracing::debug!("API: get_users");
        self.get_json("/users").await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        tracing::debug!(user_id, "API: get_user");
        self.get_json(&format!("/users/{}", user_id)).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        tracing::info!(email = %user.email, "API: create_user");
        self.post_json("/users", user).await
    }

    /// Full-document PUT; the backend has no partial update.
    pub async fn update_user(&self, user: &User) -> Result<User, ApiError> {
        tracing::debug!(user_id = %user.id, "API: update_user");
        self.put_json(&format!("/users/{}", user.id), user).await
    }

    /// Re-reads the user and rewrites the document with the song promoted
    /// to the front of the play history.
    pub async fn add_to_recently_played(
        &self,
        user_id: &str,
        song_id: &str,
    ) -> Result<User, ApiError> {
        tracing::debug!(user_id, song_id, "API: add_to_recently_played");
        let mut user = self.get_user(user_id).await?;
        user.record_play(song_id);
        self.update_user(&user).await
    }

    pub async fn update_user_preferences(
        &self,
        user_id: &str,
        preferences: UserPreferences,
    ) -> Result<User, ApiError> {
        tracing::debug!(user_id, "API: update_user_preferences");
        let mut user = self.get_user(user_id).await?;
        user.preferences = preferences;
        self.update_user(&user).await
    }

    /// The user's play history resolved to songs, newest first. Ids that
    /// have left the catalog are skipped.
    pub async fn get_recently_played(&self, user_id: &str) -> Result<Vec<Song>, ApiError> {
        tracing::debug!(user_id, "API: get_recently_played");
        let (user, songs) =
            futures::try_join!(self.get_user(user_id), self.get_songs_with_details())?;
        let mut by_id: HashMap<String, Song> =
            songs.into_iter().map(|s| (s.id.clone(), s)).collect();
        Ok(user
            .recently_played
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    // --- Playlists ---

    pub async fn get_user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>, ApiError> {
        tracing::debug!(user_id, "API: get_user_playlists");
        self.get_json_query("/playlists", &[("user_id", user_id)])
            .await
    }

    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist, ApiError> {
        tracing::debug!(playlist_id, "API: get_playlist");
        self.get_json(&format!("/playlists/{}", playlist_id)).await
    }

    /// A playlist with its songs resolved in stored order. Ids that have
    /// left the catalog are skipped.
    pub async fn get_playlist_detail(&self, playlist_id: &str) -> Result<PlaylistDetail, ApiError> {
        tracing::debug!(playlist_id, "API: get_playlist_detail");
        let (playlist, songs) = futures::try_join!(
            self.get_playlist(playlist_id),
            self.get_songs_with_details()
        )?;
        let mut by_id: HashMap<String, Song> =
            songs.into_iter().map(|s| (s.id.clone(), s)).collect();
        let songs = playlist
            .song_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Ok(PlaylistDetail { playlist, songs })
    }

    pub async fn create_playlist(
        &self,
        name: &str,
        description: Option<String>,
        user_id: &str,
    ) -> Result<Playlist, ApiError> {
        tracing::info!(name, user_id, "API: create_playlist");
        let now = Utc::now();
        let payload = NewPlaylist {
            name: name.to_string(),
            description,
            user_id: user_id.to_string(),
            song_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.post_json("/playlists", &payload).await
    }

    pub async fn update_playlist(&self, mut playlist: Playlist) -> Result<Playlist, ApiError> {
        tracing::debug!(playlist_id = %playlist.id, "API: update_playlist");
        playlist.updated_at = Some(Utc::now());
        self.put_json(&format!("/playlists/{}", playlist.id), &playlist)
            .await
    }

    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<(), ApiError> {
        tracing::info!(playlist_id, "API: delete_playlist");
        let response = self
            .http
            .delete(self.url(&format!("/playlists/{}", playlist_id)))
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Rejects duplicates before writing so a song appears at most once
    /// per playlist.
    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<Playlist, ApiError> {
        tracing::info!(playlist_id, song_id, "API: add_song_to_playlist");
        let mut playlist = self.get_playlist(playlist_id).await?;
        if playlist.song_ids.iter().any(|id| id == song_id) {
            return Err(ApiError::DuplicateSong);
        }
        playlist.song_ids.push(song_id.to_string());
        self.update_playlist(playlist).await
    }

    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<Playlist, ApiError> {
        tracing::info!(playlist_id, song_id, "API: remove_song_from_playlist");
        let mut playlist = self.get_playlist(playlist_id).await?;
        playlist.song_ids.retain(|id| id != song_id);
        self.update_playlist(playlist).await
    }

    /// Sidebar entries for a user's playlists.
    pub async fn get_playlist_items(&self, user_id: &str) -> Result<Vec<PlaylistItem>, ApiError> {
        let playlists = self.get_user_playlists(user_id).await?;
        Ok(playlists
            .into_iter()
            .map(|p| PlaylistItem { id: p.id, name: p.name })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri()).unwrap()
    }

    fn song_json(id: &str, artist_id: &str, album_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Song {}", id),
            "artist_id": artist_id,
            "album_id": album_id,
            "duration": 180.0,
            "audio_url": format!("/audio/{}.mp3", id),
        })
    }

    #[tokio::test]
    async fn rejects_non_http_base_url() {
        assert!(matches!(
            ApiClient::new("localhost:3000"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn resolves_relative_media_paths() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(
            client.resolve_url("/audio/s1.mp3"),
            "http://localhost:3000/audio/s1.mp3"
        );
        assert_eq!(
            client.resolve_url("audio/s1.mp3"),
            "http://localhost:3000/audio/s1.mp3"
        );
        assert_eq!(
            client.resolve_url("https://cdn.example.com/s1.mp3"),
            "https://cdn.example.com/s1.mp3"
        );
    }

    #[tokio::test]
    async fn songs_are_joined_with_artists_and_albums() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                song_json("s1", "a1", "al1"),
                song_json("s2", "ghost", "ghost"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "a1", "name": "First Artist" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "al1", "title": "First Album", "artist_id": "a1",
                  "cover_url": "/covers/al1.jpg" }
            ])))
            .mount(&server)
            .await;

        let songs = client_for(&server).await.get_songs_with_details().await.unwrap();

        assert_eq!(songs[0].artist_name.as_deref(), Some("First Artist"));
        assert_eq!(songs[0].album_name.as_deref(), Some("First Album"));
        assert_eq!(songs[0].cover_url.as_deref(), Some("/covers/al1.jpg"));
        assert_eq!(songs[1].display_artist(), "Unknown Artist");
        assert_eq!(songs[1].display_album(), "Unknown Album");
    }

    #[tokio::test]
    async fn search_passes_query_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .and(query_param("q", "night"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                song_json("s1", "a1", "al1")
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let songs = client_for(&server).await.search_songs("night").await.unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_playlist_add_never_writes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1", "name": "Mix", "user_id": "u1",
                "song_ids": ["s1", "s2"],
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/playlists/p1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .add_song_to_playlist("p1", "s1")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::DuplicateSong));
        assert_eq!(err.to_string(), "Song is already in this playlist");
    }

    #[tokio::test]
    async fn playlist_add_appends_and_rewrites() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1", "name": "Mix", "user_id": "u1",
                "song_ids": ["s1"],
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/playlists/p1"))
            .and(body_partial_json(json!({ "song_ids": ["s1", "s2"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1", "name": "Mix", "user_id": "u1",
                "song_ids": ["s1", "s2"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let playlist = client_for(&server)
            .await
            .add_song_to_playlist("p1", "s2")
            .await
            .unwrap();

        assert_eq!(playlist.song_ids, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn playlist_detail_resolves_songs_in_stored_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1", "name": "Mix", "user_id": "u1",
                "song_ids": ["s2", "ghost", "s1"],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                song_json("s1", "a1", "al1"),
                song_json("s2", "a1", "al1"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let detail = client_for(&server)
            .await
            .get_playlist_detail("p1")
            .await
            .unwrap();

        let ids: Vec<&str> = detail.songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        assert_eq!(detail.playlist.name, "Mix");
    }

    #[tokio::test]
    async fn recently_played_promotes_to_front() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "username": "m", "email": "m@example.com",
                "password": "pw", "recently_played": ["s2", "s3"],
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/users/u1"))
            .and(body_partial_json(json!({
                "recently_played": ["s3", "s2"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "username": "m", "email": "m@example.com",
                "password": "pw", "recently_played": ["s3", "s2"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server)
            .await
            .add_to_recently_played("u1", "s3")
            .await
            .unwrap();

        assert_eq!(user.recently_played, vec!["s3", "s2"]);
    }

    #[tokio::test]
    async fn missing_resource_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .get_playlist("missing")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn server_errors_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_songs().await.unwrap_err();

        match &err {
            ApiError::Status { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_transient());
    }
}
