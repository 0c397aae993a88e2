mod audio;
mod auth;
mod controller;
mod logging;
mod model;
mod view;

use std::io::{self, Write};
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use auth::Session;
use controller::AppController;
use model::{ApiClient, ApiError, AppModel, PlaybackCommand};

const DEFAULT_API_URL: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Rhythmic-RS Client Starting ===");

    // Step 1: Connect to the catalog backend
    let api_url =
        std::env::var("RHYTHMIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let api = ApiClient::new(&api_url)?;
    tracing::info!(url = %api_url, "Using catalog backend");

    // Step 2: Sign in. This runs before the terminal enters raw mode so the
    // prompts behave like a normal CLI.
    let session = establish_session(&api).await?;
    tracing::info!(user_id = %session.user.id, "Signed in as {}", session.user.username);

    // Step 3: Set up the application model
    let mut app_model = AppModel::new();
    app_model.set_api_client(api.clone());
    app_model.set_session(session.clone()).await;

    app_model.liked_songs.set_user(&session.user.id).await;
    if let Err(e) = app_model.liked_songs.load_from_disk().await {
        tracing::warn!(error = %e, "Could not load liked songs cache");
    }

    // Volume preference is stored as 0-100 on the backend
    let initial_volume = f64::from(session.user.preferences.volume) / 100.0;
    app_model
        .dispatch(PlaybackCommand::SetVolume(initial_volume))
        .await;

    // Step 4: Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let model = Arc::new(Mutex::new(app_model));

    // Step 5: Bring up the audio device in the background so the UI can
    // start immediately. Opening the output device can take a moment.
    let audio_backend: Arc<Mutex<Option<AudioBackend>>> = Arc::new(Mutex::new(None));
    let audio_backend_init = audio_backend.clone();
    let model_for_init = model.clone();
    tokio::spawn(async move {
        let result = match tokio::task::spawn_blocking(AudioBackend::new).await {
            Ok(result) => result,
            Err(e) => Err(anyhow::anyhow!("audio thread panicked: {}", e)),
        };
        match result {
            Ok(audio) => {
                let volume = {
                    let model = model_for_init.lock().await;
                    model.get_playback().await.effective_volume()
                };
                audio.set_output_volume(volume);
                *audio_backend_init.lock().await = Some(audio);
                tracing::info!("Audio backend initialized");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize audio backend");
                let model = model_for_init.lock().await;
                model.set_error(format!("Audio unavailable: {}", e)).await;
            }
        }
    });

    // Step 6: Create controller and load the sidebar
    let controller = AppController::new(model.clone(), audio_backend.clone());
    controller.load_user_playlists().await;

    // Step 7: Run the app
    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Step 8: Persist state, then restore terminal
    persist_on_exit(&model).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Application error: {:?}", err);
        println!("Error: {:?}", err);
    }

    tracing::info!("=== Rhythmic-RS Client Shutting Down ===");
    Ok(())
}

/// Restore the cached session if the backend still knows the user,
/// otherwise walk through an interactive sign-in.
async fn establish_session(api: &ApiClient) -> Result<Session> {
    if let Some(cached) = auth::load_session() {
        match api.get_user(&cached.user.id).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Restored cached session");
                // Take the backend's copy so preferences and history are fresh
                let session = Session { token: cached.token, user };
                auth::save_session(&session)?;
                return Ok(session);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cached session no longer valid");
                auth::clear_session();
            }
        }
    }

    // Non-interactive sign-in for scripted runs
    let env_email = std::env::var("RHYTHMIC_EMAIL").ok();
    let env_password = std::env::var("RHYTHMIC_PASSWORD").ok();
    if let (Some(email), Some(password)) = (env_email, env_password) {
        let session = auth::login(api, &email, &password).await?;
        auth::save_session(&session)?;
        return Ok(session);
    }

    println!("Sign in to Rhythmic");
    loop {
        let email = prompt("Email: ")?;
        if email.is_empty() {
            continue;
        }
        let password = prompt("Password: ")?;
        match auth::login(api, &email, &password).await {
            Ok(session) => {
                auth::save_session(&session)?;
                return Ok(session);
            }
            Err(ApiError::Credentials(message)) if message == "User not found" => {
                let answer = prompt("No account with that email. Create one? [y/N] ")?;
                if answer.eq_ignore_ascii_case("y") {
                    let username = prompt("Username: ")?;
                    let session = auth::signup(api, &username, &email, &password).await?;
                    auth::save_session(&session)?;
                    return Ok(session);
                }
            }
            Err(e) => println!("Sign-in failed: {}", e),
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        anyhow::bail!("stdin closed during sign-in");
    }
    Ok(line.trim().to_string())
}

/// Save the state the user ended with: liked songs to disk, volume to the
/// backend's preference record.
async fn persist_on_exit(model: &Arc<Mutex<AppModel>>) {
    let model_guard = model.lock().await;

    if let Err(e) = model_guard.liked_songs.save_to_disk().await {
        tracing::warn!(error = %e, "Could not save liked songs cache");
    }

    let api = model_guard.get_api_client().await;
    let session = model_guard.get_session().await;
    let playback = model_guard.get_playback().await;
    drop(model_guard);

    if let (Some(api), Some(session)) = (api, session) {
        let mut preferences = session.user.preferences.clone();
        preferences.volume = (playback.volume * 100.0).round() as u8;
        if let Err(e) = api.update_user_preferences(&session.user.id, preferences).await {
            tracing::warn!(error = %e, "Could not save volume preference");
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // The audio device comes up in the background; hook its event
        // stream into the controller as soon as it lands.
        controller.try_start_event_listener().await;

        // Get current state snapshot
        let (playback, ui_state, content_state, should_quit) = {
            let model_guard = model.lock().await;
            model_guard.auto_clear_old_errors().await;
            (
                model_guard.get_playback().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.should_quit().await,
            )
        };

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        // Handle events with timeout to allow periodic updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let _ = controller.handle_key_event(key).await;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
