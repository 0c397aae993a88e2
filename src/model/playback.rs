//! Playback store: the single source of truth the view renders and the
//! audio layer is kept in sync with

use super::catalog::Song;
use super::queue::{self, Direction};
use super::types::RepeatMode;

/// Volume used before a signed-in user's saved preference is applied.
pub const DEFAULT_VOLUME: f64 = 0.8;

/// Everything the player UI needs to draw itself. Mutated only through
/// [`PlaybackCommand`] so every transition lives in one place.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    /// Seconds into the current track, mirrored from the audio layer.
    pub current_time: f64,
    /// Track length in seconds as reported by the decoder.
    pub duration: f64,
    /// Persisted volume in `[0.0, 1.0]`. Muting does not touch this.
    pub volume: f64,
    pub is_muted: bool,
    pub queue: Vec<Song>,
    pub current_index: usize,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_song: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
            is_muted: false,
            queue: Vec::new(),
            current_index: 0,
            repeat: RepeatMode::Off,
            shuffle: false,
            is_loading: false,
            error: None,
        }
    }
}

/// All state transitions the store accepts. Kept closed so `apply` can
/// match exhaustively and a new command cannot be forgotten.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackCommand {
    /// Begin playing `song`. The queue defaults to just that song and the
    /// index to zero; passing an out-of-range index is the caller's bug.
    Start {
        song: Song,
        queue: Option<Vec<Song>>,
        index: Option<usize>,
    },
    /// Continue the current song without touching queue or position.
    Resume,
    Pause,
    SetTime(f64),
    SetDuration(f64),
    /// Clamped to `[0.0, 1.0]`; always unmutes.
    SetVolume(f64),
    /// Flips the mute flag only; the stored volume survives.
    ToggleMute,
    SetQueue {
        queue: Vec<Song>,
        index: Option<usize>,
    },
    /// Skip forward through the queue (wraps, or uniform random with
    /// shuffle on). No-op on an empty queue.
    Advance,
    /// Skip backward through the queue. No-op on an empty queue.
    Retreat,
    CycleRepeat,
    ToggleShuffle,
    SetLoading(bool),
    /// Record a user-facing message and stop any loading indicator.
    SetError(String),
    ClearError,
}

impl PlaybackState {
    pub fn apply(&mut self, command: PlaybackCommand) {
        match command {
            PlaybackCommand::Start { song, queue, index } => {
                self.queue = queue.unwrap_or_else(|| vec![song.clone()]);
                self.current_index = index.unwrap_or(0);
                self.current_song = Some(song);
                self.is_playing = true;
                self.current_time = 0.0;
                self.error = None;
            }
            PlaybackCommand::Resume => {
                if self.current_song.is_some() {
                    self.is_playing = true;
                    self.error = None;
                }
            }
            PlaybackCommand::Pause => {
                self.is_playing = false;
            }
            PlaybackCommand::SetTime(seconds) => {
                self.current_time = seconds;
            }
            PlaybackCommand::SetDuration(seconds) => {
                self.duration = seconds;
            }
            PlaybackCommand::SetVolume(level) => {
                self.volume = level.clamp(0.0, 1.0);
                self.is_muted = false;
            }
            PlaybackCommand::ToggleMute => {
                self.is_muted = !self.is_muted;
            }
            PlaybackCommand::SetQueue { queue, index } => {
                self.current_index = index.unwrap_or(0);
                self.current_song = queue.get(self.current_index).cloned();
                self.queue = queue;
            }
            PlaybackCommand::Advance => self.skip(Direction::Forward),
            PlaybackCommand::Retreat => self.skip(Direction::Backward),
            PlaybackCommand::CycleRepeat => {
                self.repeat = match self.repeat {
                    RepeatMode::Off => RepeatMode::Queue,
                    RepeatMode::Queue => RepeatMode::Track,
                    RepeatMode::Track => RepeatMode::Off,
                };
            }
            PlaybackCommand::ToggleShuffle => {
                self.shuffle = !self.shuffle;
            }
            PlaybackCommand::SetLoading(loading) => {
                self.is_loading = loading;
            }
            PlaybackCommand::SetError(message) => {
                self.error = Some(message);
                self.is_loading = false;
            }
            PlaybackCommand::ClearError => {
                self.error = None;
            }
        }
    }

    fn skip(&mut self, direction: Direction) {
        let mut rng = rand::thread_rng();
        let Some(next) = queue::next_index(
            self.queue.len(),
            self.current_index,
            self.shuffle,
            direction,
            &mut rng,
        ) else {
            return;
        };
        self.current_index = next;
        self.current_song = self.queue.get(next).cloned();
        self.is_playing = true;
        self.current_time = 0.0;
        self.error = None;
    }

    /// What the audio output should actually be set to.
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted { 0.0 } else { self.volume }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist_id: "a1".to_string(),
            album_id: "al1".to_string(),
            genre: None,
            duration: 200.0,
            audio_url: format!("http://localhost:3000/audio/{}.mp3", id),
            cover_url: None,
            artist_name: None,
            album_name: None,
            liked: false,
        }
    }

    fn queue_of(n: usize) -> Vec<Song> {
        (0..n).map(|i| song(&format!("s{}", i))).collect()
    }

    #[test]
    fn start_defaults_to_singleton_queue() {
        let mut state = PlaybackState::default();
        state.error = Some("stale".to_string());

        state.apply(PlaybackCommand::Start {
            song: song("s1"),
            queue: None,
            index: None,
        });

        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.current_song.as_ref().unwrap().id, "s1");
        assert!(state.is_playing);
        assert_eq!(state.error, None);
    }

    #[test]
    fn start_keeps_provided_queue_position() {
        let mut state = PlaybackState::default();

        state.apply(PlaybackCommand::Start {
            song: song("s2"),
            queue: Some(queue_of(4)),
            index: Some(2),
        });

        assert_eq!(state.queue.len(), 4);
        assert_eq!(state.current_index, 2);
        assert_eq!(state.current_song.as_ref().unwrap().id, "s2");
    }

    #[test]
    fn resume_without_song_changes_nothing() {
        let mut state = PlaybackState::default();

        state.apply(PlaybackCommand::Resume);

        assert!(!state.is_playing);
    }

    #[test]
    fn resume_keeps_queue_and_position() {
        let mut state = PlaybackState::default();
        state.apply(PlaybackCommand::Start {
            song: song("s1"),
            queue: Some(queue_of(3)),
            index: Some(1),
        });
        state.apply(PlaybackCommand::Pause);
        state.apply(PlaybackCommand::SetTime(42.0));

        state.apply(PlaybackCommand::Resume);

        assert!(state.is_playing);
        assert_eq!(state.current_index, 1);
        assert_eq!(state.current_time, 42.0);
    }

    #[test]
    fn set_volume_clamps_and_unmutes() {
        let mut state = PlaybackState::default();
        state.apply(PlaybackCommand::ToggleMute);

        state.apply(PlaybackCommand::SetVolume(1.7));
        assert_eq!(state.volume, 1.0);
        assert!(!state.is_muted);

        state.apply(PlaybackCommand::SetVolume(-0.3));
        assert_eq!(state.volume, 0.0);
    }

    #[test]
    fn mute_preserves_volume() {
        let mut state = PlaybackState::default();
        state.apply(PlaybackCommand::SetVolume(0.6));

        state.apply(PlaybackCommand::ToggleMute);
        assert!(state.is_muted);
        assert_eq!(state.volume, 0.6);
        assert_eq!(state.effective_volume(), 0.0);

        state.apply(PlaybackCommand::ToggleMute);
        assert!(!state.is_muted);
        assert_eq!(state.effective_volume(), 0.6);
    }

    #[test]
    fn repeat_cycles_through_all_modes() {
        let mut state = PlaybackState::default();
        assert_eq!(state.repeat, RepeatMode::Off);

        state.apply(PlaybackCommand::CycleRepeat);
        assert_eq!(state.repeat, RepeatMode::Queue);
        state.apply(PlaybackCommand::CycleRepeat);
        assert_eq!(state.repeat, RepeatMode::Track);
        state.apply(PlaybackCommand::CycleRepeat);
        assert_eq!(state.repeat, RepeatMode::Off);
    }

    #[test]
    fn advance_wraps_and_retreat_undoes_it() {
        let mut state = PlaybackState::default();
        state.apply(PlaybackCommand::SetQueue {
            queue: queue_of(3),
            index: Some(2),
        });

        state.apply(PlaybackCommand::Advance);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.current_song.as_ref().unwrap().id, "s0");
        assert!(state.is_playing);

        state.apply(PlaybackCommand::Retreat);
        assert_eq!(state.current_index, 2);
        assert_eq!(state.current_song.as_ref().unwrap().id, "s2");
    }

    #[test]
    fn skips_on_empty_queue_are_ignored() {
        let mut state = PlaybackState::default();

        state.apply(PlaybackCommand::Advance);
        state.apply(PlaybackCommand::Retreat);

        assert_eq!(state.current_index, 0);
        assert_eq!(state.current_song, None);
        assert!(!state.is_playing);
    }

    #[test]
    fn shuffled_skip_stays_in_bounds() {
        let mut state = PlaybackState::default();
        state.apply(PlaybackCommand::SetQueue {
            queue: queue_of(4),
            index: None,
        });
        state.apply(PlaybackCommand::ToggleShuffle);

        for _ in 0..50 {
            state.apply(PlaybackCommand::Advance);
            assert!(state.current_index < 4);
            assert!(state.current_song.is_some());
        }
    }

    #[test]
    fn set_error_stops_loading() {
        let mut state = PlaybackState::default();
        state.apply(PlaybackCommand::SetLoading(true));

        state.apply(PlaybackCommand::SetError(
            "Playback failed. Please try again.".to_string(),
        ));

        assert!(!state.is_loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Playback failed. Please try again.")
        );

        state.apply(PlaybackCommand::ClearError);
        assert_eq!(state.error, None);
    }

    #[test]
    fn set_queue_derives_current_song() {
        let mut state = PlaybackState::default();

        state.apply(PlaybackCommand::SetQueue {
            queue: queue_of(3),
            index: Some(1),
        });

        assert_eq!(state.current_song.as_ref().unwrap().id, "s1");
        assert!(!state.is_playing);
    }
}
