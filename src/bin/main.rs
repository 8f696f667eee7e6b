use std::{path::PathBuf, thread, time::Duration, time::Instant};

use anyhow::Context;
use clap::Parser;
use log::info;
use shadowdeck_core::{
    deck::{DeckApp, DeckConfig, TickResult},
    settings::{PreferenceSync, Preferences},
    speech::SpeechDispatcher,
};
use shadowdeck_host::{
    input::terminal::{HELP, TerminalInput},
    network::HttpSynthesizer,
    render::{FrameRenderer, TextRenderer},
    speech::{CommandLine, ProcessPlayer, ProcessSpeech},
    storage::JsonFileStore,
};

use catalog_source::CatalogSource;

#[path = "main/catalog_source.rs"]
mod catalog_source;

#[derive(Parser, Debug)]
#[command(name = "shadowdeck", about = "Shadowing flashcards in the terminal", version)]
struct Cli {
    /// Catalog directory with scriptGroups.json and scripts-by-group/
    #[arg(long, env = "SHADOWDECK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Preference file
    #[arg(long, env = "SHADOWDECK_PREFS", default_value = "shadowdeck-prefs.json")]
    prefs: PathBuf,

    /// Speech-synthesis endpoint used by the google-* voices
    #[arg(long, env = "SHADOWDECK_TTS_ENDPOINT")]
    tts_endpoint: Option<String>,

    /// Built-in voice command; `{lang}` is replaced and the text appended
    #[arg(long, default_value = "espeak-ng -v {lang}")]
    say_command: String,

    /// Player for endpoint audio; the mp3 path is appended
    #[arg(long, default_value = "mpg123 -q")]
    player_command: String,

    /// Main loop period in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut store = JsonFileStore::open(&cli.prefs);
    let restored = Preferences::load(&store);

    let catalog = CatalogSource::open(cli.data_dir.as_deref()).context("failed to open catalog")?;
    let player_command =
        CommandLine::parse(&cli.player_command).context("invalid --player-command")?;
    let speech = SpeechDispatcher::new(
        ProcessSpeech::new(&cli.say_command),
        cli.tts_endpoint.clone().map(HttpSynthesizer::new),
        ProcessPlayer::new(player_command),
    );

    let mut app = DeckApp::new(
        catalog,
        TerminalInput::stdin(),
        speech,
        DeckConfig::default(),
        &restored,
    );
    let mut prefs_sync = PreferenceSync::new(restored);
    let mut renderer = TextRenderer::default();
    let mut frame = String::new();
    let mut shown = String::new();

    info!(
        "shadowdeck started: prefs={} endpoint={} tick_ms={}",
        store.path().display(),
        cli.tts_endpoint.as_deref().unwrap_or("none"),
        cli.tick_ms
    );
    println!("{HELP}");

    let tick = Duration::from_millis(cli.tick_ms.max(1));
    let loop_start = Instant::now();
    let mut now_ms = 0;

    while !app.should_exit() {
        now_ms = loop_start.elapsed().as_millis() as u64;

        if app.tick(now_ms) == TickResult::RenderRequested {
            app.with_screen(now_ms, |screen| renderer.render(screen, &mut frame));
            if frame != shown {
                println!("\n{frame}");
                std::mem::swap(&mut frame, &mut shown);
            }
        }

        prefs_sync.track_current(app.preferences(), now_ms);
        prefs_sync.flush_if_due(&mut store, now_ms);

        thread::sleep(tick);
    }

    app.shutdown();
    prefs_sync.track_current(app.preferences(), now_ms);
    prefs_sync.flush(&mut store, now_ms);
    info!("shadowdeck stopped");
    Ok(())
}
