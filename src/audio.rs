//! Local audio playback on a dedicated thread
//!
//! rodio's output stream is not `Send`, so a plain OS thread owns it and
//! everything else talks to that thread over channels: commands in, player
//! events out. Track bytes are fetched async and handed over once complete.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const FETCH_TIMEOUT_SECS: u64 = 60;

/// Events reported back to the controller's listener task.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// A new source is being fetched and decoded.
    Loading,
    /// The source is ready. Duration is `None` when the decoder cannot
    /// tell (common for streamed MP3s); callers fall back to catalog data.
    MetadataReady { duration_secs: Option<f64> },
    TimeUpdate { position_secs: f64 },
    /// The current track ran to its natural end.
    EndOfTrack,
    /// Play was requested with nothing loaded or loading.
    PlayRejected,
    LoadFailed { reason: String },
}

enum PlayerCommand {
    BeginLoad { generation: u64 },
    SourceData { generation: u64, data: Vec<u8> },
    Play,
    Pause,
    Stop,
    Seek { position_secs: f64 },
    SetOutputVolume { level: f32 },
    /// Rebuild the current track from its cached bytes and play from zero.
    Restart,
}

/// Handle to the playback thread. One instance per app; the controller
/// keeps it behind a mutex the way any audio device handle is kept.
pub struct AudioBackend {
    cmd_tx: Sender<PlayerCommand>,
    event_tx: UnboundedSender<PlayerEvent>,
    event_rx: tokio::sync::Mutex<Option<UnboundedReceiver<PlayerEvent>>>,
    http: reqwest::Client,
    /// Monotonic load counter. A fetch that finishes after a newer load
    /// started is dropped instead of clobbering the newer track.
    generation: Arc<AtomicU64>,
}

impl AudioBackend {
    /// Spawn the playback thread and open the default output device.
    /// Fails fast when no device is available so the app can keep running
    /// without audio.
    pub fn new() -> Result<Self> {
        let (cmd_tx, cmd_rx) = std::sync::mpsc::channel();
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
        let (init_tx, init_rx) = std::sync::mpsc::channel();

        let thread_events = event_tx.clone();
        std::thread::Builder::new()
            .name("audio-player".to_string())
            .spawn(move || player_thread(cmd_rx, thread_events, init_tx))?;

        match init_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => anyhow::bail!("audio output unavailable: {}", reason),
            Err(_) => anyhow::bail!("audio thread exited during startup"),
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(concat!("rhythmic-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx: tokio::sync::Mutex::new(Some(event_rx)),
            http,
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Hand the event stream to the single listener task. Yields `None`
    /// after the first call.
    pub async fn take_event_channel(&self) -> Option<UnboundedReceiver<PlayerEvent>> {
        self.event_rx.lock().await.take()
    }

    /// Start fetching `url` and make it the current track once the bytes
    /// arrive. Any earlier in-flight load is superseded.
    pub fn load(&self, url: String) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.event_tx.send(PlayerEvent::Loading);
        let _ = self.cmd_tx.send(PlayerCommand::BeginLoad { generation });

        let http = self.http.clone();
        let cmd_tx = self.cmd_tx.clone();
        let event_tx = self.event_tx.clone();
        let latest = self.generation.clone();
        tokio::spawn(async move {
            match fetch_bytes(&http, &url).await {
                Ok(data) => {
                    let _ = cmd_tx.send(PlayerCommand::SourceData { generation, data });
                }
                Err(e) => {
                    // Only surface the failure if no newer load replaced us
                    if latest.load(Ordering::SeqCst) == generation {
                        tracing::error!(error = %e, url = %url, "Audio fetch failed");
                        let _ = event_tx.send(PlayerEvent::LoadFailed {
                            reason: e.to_string(),
                        });
                    } else {
                        tracing::debug!(url = %url, "Dropping failed fetch for superseded load");
                    }
                }
            }
        });
    }

    pub fn play(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Play);
    }

    pub fn pause(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Stop);
    }

    pub fn seek(&self, position_secs: f64) {
        let _ = self.cmd_tx.send(PlayerCommand::Seek { position_secs });
    }

    pub fn set_output_volume(&self, level: f64) {
        let _ = self.cmd_tx.send(PlayerCommand::SetOutputVolume {
            level: level as f32,
        });
    }

    pub fn restart(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Restart);
    }
}

async fn fetch_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = http.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

fn build_sink(
    handle: &OutputStreamHandle,
    data: Vec<u8>,
    volume: f32,
) -> Result<(Sink, Option<f64>), String> {
    let source = Decoder::new(Cursor::new(data)).map_err(|e| e.to_string())?;
    let duration = rodio::Source::total_duration(&source).map(|d| d.as_secs_f64());
    let sink = Sink::try_new(handle).map_err(|e| e.to_string())?;
    sink.set_volume(volume);
    sink.append(source);
    Ok((sink, duration))
}

fn player_thread(
    cmd_rx: Receiver<PlayerCommand>,
    event_tx: UnboundedSender<PlayerEvent>,
    init_tx: Sender<std::result::Result<(), String>>,
) {
    // The stream must stay alive for as long as anything should be audible
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => {
            let _ = init_tx.send(Ok(()));
            pair
        }
        Err(e) => {
            let _ = init_tx.send(Err(e.to_string()));
            return;
        }
    };

    let mut sink: Option<Sink> = None;
    // Bytes of the current track, kept for Restart and replay-after-finish
    let mut current_data: Option<Vec<u8>> = None;
    let mut pending_load: Option<u64> = None;
    let mut desired_playing = false;
    let mut volume: f32 = 1.0;
    let mut track_duration: Option<f64> = None;
    let mut last_empty = true;

    loop {
        loop {
            let command = match cmd_rx.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            };

            match command {
                PlayerCommand::BeginLoad { generation } => {
                    pending_load = Some(generation);
                    if let Some(old) = sink.take() {
                        old.stop();
                    }
                    current_data = None;
                    track_duration = None;
                    last_empty = true;
                }
                PlayerCommand::SourceData { generation, data } => {
                    if pending_load != Some(generation) {
                        tracing::debug!(generation, "Dropping stale source data");
                        continue;
                    }
                    pending_load = None;
                    match build_sink(&handle, data.clone(), volume) {
                        Ok((new_sink, duration)) => {
                            if !desired_playing {
                                new_sink.pause();
                            }
                            track_duration = duration;
                            last_empty = false;
                            sink = Some(new_sink);
                            current_data = Some(data);
                            let _ = event_tx.send(PlayerEvent::MetadataReady {
                                duration_secs: duration,
                            });
                        }
                        Err(reason) => {
                            tracing::error!(%reason, "Failed to decode audio source");
                            let _ = event_tx.send(PlayerEvent::LoadFailed { reason });
                        }
                    }
                }
                PlayerCommand::Play => {
                    if let Some(s) = sink.as_ref().filter(|s| !s.empty()) {
                        s.play();
                        desired_playing = true;
                    } else if pending_load.is_some() {
                        // Autoplay once the in-flight load lands
                        desired_playing = true;
                    } else if let Some(data) = current_data.clone() {
                        // Finished track: playing again starts from the top
                        match build_sink(&handle, data, volume) {
                            Ok((new_sink, duration)) => {
                                track_duration = duration;
                                last_empty = false;
                                sink = Some(new_sink);
                                desired_playing = true;
                                let _ = event_tx
                                    .send(PlayerEvent::TimeUpdate { position_secs: 0.0 });
                            }
                            Err(reason) => {
                                tracing::error!(%reason, "Failed to rebuild audio source");
                                let _ = event_tx.send(PlayerEvent::LoadFailed { reason });
                            }
                        }
                    } else {
                        let _ = event_tx.send(PlayerEvent::PlayRejected);
                    }
                }
                PlayerCommand::Pause => {
                    desired_playing = false;
                    if let Some(s) = &sink {
                        s.pause();
                    }
                }
                PlayerCommand::Stop => {
                    desired_playing = false;
                    pending_load = None;
                    current_data = None;
                    track_duration = None;
                    last_empty = true;
                    if let Some(old) = sink.take() {
                        old.stop();
                    }
                }
                PlayerCommand::Seek { position_secs } => {
                    if let Some(s) = &sink {
                        let target = Duration::from_secs_f64(position_secs.max(0.0));
                        match s.try_seek(target) {
                            Ok(()) => {
                                let _ = event_tx.send(PlayerEvent::TimeUpdate {
                                    position_secs: target.as_secs_f64(),
                                });
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Seek not supported for this source")
                            }
                        }
                    }
                }
                PlayerCommand::SetOutputVolume { level } => {
                    volume = level;
                    if let Some(s) = &sink {
                        s.set_volume(level);
                    }
                }
                PlayerCommand::Restart => {
                    if let Some(data) = current_data.clone() {
                        if let Some(old) = sink.take() {
                            old.stop();
                        }
                        match build_sink(&handle, data, volume) {
                            Ok((new_sink, duration)) => {
                                track_duration = duration;
                                last_empty = false;
                                sink = Some(new_sink);
                                desired_playing = true;
                                let _ = event_tx
                                    .send(PlayerEvent::TimeUpdate { position_secs: 0.0 });
                            }
                            Err(reason) => {
                                tracing::error!(%reason, "Failed to rebuild audio source");
                                let _ = event_tx.send(PlayerEvent::LoadFailed { reason });
                            }
                        }
                    }
                }
            }
        }

        if let Some(s) = &sink {
            let now_empty = s.empty();
            if !now_empty && desired_playing {
                let _ = event_tx.send(PlayerEvent::TimeUpdate {
                    position_secs: s.get_pos().as_secs_f64(),
                });
            }
            // An emptied sink that was playing means the track ran out
            if now_empty && !last_empty && pending_load.is_none() {
                desired_playing = false;
                if let Some(duration) = track_duration {
                    let _ = event_tx.send(PlayerEvent::TimeUpdate {
                        position_secs: duration,
                    });
                }
                let _ = event_tx.send(PlayerEvent::EndOfTrack);
            }
            last_empty = now_empty;
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}
