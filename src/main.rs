mod audio;
mod audio_api;
mod config;
mod loader;
mod logging;
mod middle;
mod shared;
mod tui;

use std::path::PathBuf;
use std::time::Instant;
use anyhow::Context;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::GainStage;
use loader::SoundBankLoader;
use middle::Middle;
use shared::{InputEvent, UiState};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let kit_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    config::check_kit_dir(&kit_dir)?;
    match logging::init(&kit_dir) {
        Some(path) => log::info!("drumpad starting, kit dir {}, log {}", kit_dir.display(), path.display()),
        None => eprintln!("warning: could not open a log file, running without logs"),
    }

    let kit = config::load_kit(&kit_dir)?;

    // one gain node, shared by the UI (writer) and the audio thread (reader)
    let gain = GainStage::new(kit.gain);
    let audio = audio::start_audio(gain.clone())?;
    let mut middle = Middle::new(&kit, gain);
    let ui_rx = middle.subscribe();

    // the sound bank is filled exactly once, in the background
    let loader = SoundBankLoader::spawn(kit.pads.clone(), kit_dir.clone(), audio.sample_rate())
        .context("could not start the sample loader")?;

    let _guard = TerminalGuard::enter()?; // input listener lives as long as this does
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();
    let mut ui = UiState::default();

    loop {
        for event in loader.poll() {
            if let Some(cmd) = middle.on_load_event(event) {
                audio.send(cmd);
            }
        }
        if let Some(latest) = ui_rx.try_iter().last() {
            ui = latest;
        }

        let ds = middle.display_state();
        term.draw(|frame| {
            let area = frame.area();
            tui::view::render(frame, area, &ds, &ui, &mut tui_state);
        })?;

        let events = tui::input::poll_input(tick_rate, &tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                log::info!(
                    "quitting with {}/{} pads loaded, last played {:?}",
                    middle.sound_bank().len(),
                    middle.pads().len(),
                    middle.ui_state().last_played_id
                );
                return Ok(());
            }
            for cmd in middle.handle_input(event) {
                audio.send(cmd);
            }
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        middle.tick(elapsed);
    }
}

// Registers the terminal input listener (raw keys, mouse, key event kinds) on
// enter and takes all of it back down on drop, error exits included.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard; // from here on, drop restores the terminal
        crossterm::execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        // real press/release detection where the terminal supports it
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PushKeyboardEnhancementFlags(
                crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        );
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
