#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod lookup_worker;
mod sprite;
mod ui;
mod update;
mod windowing;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use dexcore_config::{default_config_path, Settings};
use dexd::{ServiceHandle, ViewState};
use iced::widget::{self, image};
use iced::{Task, Theme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lookup_worker::spawn_lookup_worker;
use ui::{subscription, theme, view};
use update::update;
use windowing::{focus_lookup_input, native_window_settings};

const WINDOW_WIDTH: f32 = 760.0;
const WINDOW_HEIGHT: f32 = 820.0;
const POLL_INTERVAL: Duration = Duration::from_millis(16);
const SPRITE_SIZE: f32 = 180.0;
const INDEX_FONT_SIZE: u32 = 14;

fn main() -> iced::Result {
    let args = LaunchArgs::parse(env::args().skip(1));
    let (settings, settings_error) = match load_settings(&args) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(format!("{err:#}"))),
    };

    init_tracing(&settings.log_filter);
    if let Some(err) = settings_error {
        tracing::warn!(error = %err, "using default settings");
    }

    iced::application(
        move || {
            let app = App::new(&settings);
            let focus = focus_lookup_input(app.input_id.clone());
            (app, focus)
        },
        update,
        view,
    )
    .title("DexMini")
    .theme(theme)
    .window(native_window_settings())
    .subscription(subscription)
    .run()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct LaunchArgs {
    config_path: Option<PathBuf>,
    api_url: Option<String>,
}

impl LaunchArgs {
    fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        for arg in args {
            if let Some(value) = arg.strip_prefix("--config=") {
                parsed.config_path = Some(PathBuf::from(value.trim()));
            } else if let Some(value) = arg.strip_prefix("--api-url=") {
                parsed.api_url = Some(value.trim().trim_end_matches('/').to_string());
            }
        }
        parsed
    }
}

fn load_settings(args: &LaunchArgs) -> anyhow::Result<Settings> {
    let path = args
        .config_path
        .clone()
        .unwrap_or_else(default_config_path);

    let mut settings = Settings::load(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    settings
        .apply_env_overrides()
        .context("failed to apply environment overrides")?;
    if let Some(url) = &args.api_url {
        settings.api_base_url = url.clone();
    }
    settings.validate().context("settings are invalid")?;

    Ok(settings)
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

#[derive(Debug, Clone)]
enum Message {
    InputChanged(String),
    PollService,
    SpriteLoaded {
        url: String,
        result: Result<Vec<u8>, String>,
    },
}

struct App {
    service: Option<ServiceHandle>,
    snapshot: ViewState,
    raw_input: String,
    input_id: widget::Id,
    theme: Theme,
    sprite: Option<(String, image::Handle)>,
    sprite_pending: Option<String>,
    startup_error: Option<String>,
}

impl App {
    fn new(settings: &Settings) -> Self {
        let (service, startup_error) = match spawn_lookup_worker(settings) {
            Ok(handle) => (Some(handle), None),
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "lookup service unavailable");
                (None, Some(format!("{err:#}")))
            }
        };

        Self {
            service,
            snapshot: ViewState::default(),
            raw_input: settings.initial_input.clone(),
            input_id: widget::Id::new("lookup-input"),
            theme: match settings.theme {
                dexcore_config::Theme::TerminalDark => Theme::TokyoNight,
                dexcore_config::Theme::TerminalLight => Theme::Light,
            },
            sprite: None,
            sprite_pending: None,
            startup_error,
        }
    }

    fn shown_sprite_url(&self) -> Option<&str> {
        self.sprite.as_ref().map(|(url, _)| url.as_str())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(service) = &self.service {
            service.shutdown();
        }
    }
}
