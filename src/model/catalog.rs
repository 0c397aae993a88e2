//! Catalog and user documents as served by the REST backend

use std::collections::HashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on a user's play-history list.
pub const RECENTLY_PLAYED_LIMIT: usize = 50;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// A song from the catalog. `artist_name` / `album_name` / `cover_url` are
/// derived display fields filled in by [`enrich_songs`]; the backend only
/// stores the ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub album_id: String,
    #[serde(default)]
    pub genre: Option<String>,
    pub duration: f64,
    pub audio_url: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    /// Local-only liked marker, never sent to the backend.
    #[serde(skip)]
    pub liked: bool,
}

impl Song {
    pub fn display_artist(&self) -> &str {
        self.artist_name.as_deref().unwrap_or(UNKNOWN_ARTIST)
    }

    pub fn display_album(&self) -> &str {
        self.album_name.as_deref().unwrap_or(UNKNOWN_ALBUM)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// A user-owned playlist. Song membership is a flat id list; updates are
/// full-document PUTs against the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub song_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Creation payload for `POST /playlists`; the backend assigns the id.
#[derive(Clone, Debug, Serialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    pub song_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme: String,
    pub autoplay: bool,
    pub volume: u8,
    pub quality: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            autoplay: true,
            volume: 80,
            quality: "high".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub recently_played: Vec<String>,
}

impl User {
    /// Prepend a song id to the play history, dropping any earlier occurrence
    /// and keeping at most [`RECENTLY_PLAYED_LIMIT`] entries.
    pub fn record_play(&mut self, song_id: &str) {
        self.recently_played.retain(|id| id != song_id);
        self.recently_played.insert(0, song_id.to_string());
        self.recently_played.truncate(RECENTLY_PLAYED_LIMIT);
    }
}

/// Creation payload for `POST /users`; the backend assigns the id.
#[derive(Clone, Debug, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub preferences: UserPreferences,
    pub recently_played: Vec<String>,
}

/// Join songs against the artist and album collections, filling in the
/// display fields. Dangling ids fall back to the "Unknown" placeholders; a
/// song without its own cover art inherits the album's.
pub fn enrich_songs(mut songs: Vec<Song>, artists: &[Artist], albums: &[Album]) -> Vec<Song> {
    let artist_map: HashMap<&str, &Artist> =
        artists.iter().map(|a| (a.id.as_str(), a)).collect();
    let album_map: HashMap<&str, &Album> =
        albums.iter().map(|a| (a.id.as_str(), a)).collect();

    for song in &mut songs {
        song.artist_name = Some(
            artist_map
                .get(song.artist_id.as_str())
                .map(|a| a.name.clone())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        );
        let album = album_map.get(song.album_id.as_str());
        song.album_name = Some(
            album
                .map(|a| a.title.clone())
                .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        );
        if song.cover_url.is_none() {
            song.cover_url = album.and_then(|a| a.cover_url.clone());
        }
    }
    songs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_song(id: &str, artist_id: &str, album_id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist_id: artist_id.to_string(),
            album_id: album_id.to_string(),
            genre: None,
            duration: 180.0,
            audio_url: format!("http://localhost:3000/audio/{}.mp3", id),
            cover_url: None,
            artist_name: None,
            album_name: None,
            liked: false,
        }
    }

    #[test]
    fn enrichment_joins_names_and_cover() {
        let artists = vec![Artist {
            id: "a1".to_string(),
            name: "The Artist".to_string(),
            genre: None,
            image_url: None,
        }];
        let albums = vec![Album {
            id: "al1".to_string(),
            title: "The Album".to_string(),
            artist_id: "a1".to_string(),
            year: Some(2020),
            cover_url: Some("http://localhost:3000/covers/al1.jpg".to_string()),
        }];

        let songs = enrich_songs(vec![test_song("s1", "a1", "al1")], &artists, &albums);

        assert_eq!(songs[0].artist_name.as_deref(), Some("The Artist"));
        assert_eq!(songs[0].album_name.as_deref(), Some("The Album"));
        assert_eq!(
            songs[0].cover_url.as_deref(),
            Some("http://localhost:3000/covers/al1.jpg")
        );
    }

    #[test]
    fn enrichment_falls_back_for_dangling_ids() {
        let songs = enrich_songs(vec![test_song("s1", "missing", "missing")], &[], &[]);

        assert_eq!(songs[0].display_artist(), UNKNOWN_ARTIST);
        assert_eq!(songs[0].display_album(), UNKNOWN_ALBUM);
        assert_eq!(songs[0].cover_url, None);
    }

    #[test]
    fn enrichment_keeps_existing_cover() {
        let mut song = test_song("s1", "a1", "al1");
        song.cover_url = Some("http://localhost:3000/covers/custom.jpg".to_string());
        let albums = vec![Album {
            id: "al1".to_string(),
            title: "The Album".to_string(),
            artist_id: "a1".to_string(),
            year: None,
            cover_url: Some("http://localhost:3000/covers/al1.jpg".to_string()),
        }];

        let songs = enrich_songs(vec![song], &[], &albums);

        assert_eq!(
            songs[0].cover_url.as_deref(),
            Some("http://localhost:3000/covers/custom.jpg")
        );
    }

    #[test]
    fn record_play_prepends_and_dedupes() {
        let mut user = minimal_user();
        user.recently_played = vec!["s2".to_string(), "s1".to_string()];

        user.record_play("s1");

        assert_eq!(user.recently_played, vec!["s1", "s2"]);
    }

    #[test]
    fn record_play_caps_history() {
        let mut user = minimal_user();
        for i in 0..RECENTLY_PLAYED_LIMIT {
            user.recently_played.push(format!("old{}", i));
        }

        user.record_play("new");

        assert_eq!(user.recently_played.len(), RECENTLY_PLAYED_LIMIT);
        assert_eq!(user.recently_played[0], "new");
        assert!(!user.recently_played.contains(&format!("old{}", RECENTLY_PLAYED_LIMIT - 1)));
    }

    #[test]
    fn user_parses_with_missing_optional_fields() {
        let json = r#"{
            "id": "u1",
            "username": "m",
            "email": "m@example.com",
            "password": "pw"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.preferences, UserPreferences::default());
        assert!(user.recently_played.is_empty());
        assert!(user.created_at.is_none());
    }

    fn minimal_user() -> User {
        User {
            id: "u1".to_string(),
            username: "m".to_string(),
            email: "m@example.com".to_string(),
            password: "pw".to_string(),
            created_at: None,
            preferences: UserPreferences::default(),
            recently_played: Vec::new(),
        }
    }
}
