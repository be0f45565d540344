mod backend;
mod battery;
mod config;
mod dispatch;
mod panes;
mod setup;
mod state;
mod ui;

use std::time::{Duration, Instant};

use clap::Parser;

use backend::CommandSink;
use battery::BatteryMonitor;
use config::{Args, Config};
use panes::{HelpPane, MenuPane, PromptPane};
use state::AppState;
use ui::keybindings::{load_keybindings, GlobalBindings};
use ui::{Action, AppEvent, Frame, InputSource, Keymap, NavAction, PaneManager, RatatuiBackend};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_path = setup::init_logging();
    log::info!("freyr-panel starting up");

    let config = Config::load(&args);
    let mut state = setup::load_state(&config)?;
    let sink = setup::command_sink(&config)?;

    let (globals, mut keymaps) = load_keybindings();
    let mut pane_keymap = |id: &str| keymaps.remove(id).unwrap_or_else(Keymap::new);
    let mut panes = PaneManager::new(Box::new(MenuPane::new(pane_keymap("menu"), config.slider)?));
    panes.add_pane(Box::new(PromptPane::new(pane_keymap("prompt"))));
    panes.add_pane(Box::new(HelpPane::new(pane_keymap("help"))));
    panes.active_mut().on_enter(&state);

    let mut app_frame = Frame::new(sink.describe());
    if let Some(path) = log_path {
        app_frame.push_message(format!("logging to {}", path.display()));
    }

    let mut backend = RatatuiBackend::new()?;
    backend.start()?;
    let result = run(
        &mut backend,
        &mut state,
        &mut panes,
        sink.as_ref(),
        &mut app_frame,
        &globals,
        BatteryMonitor::new(config.battery_poll),
    );
    backend.stop()?;
    log::info!("freyr-panel exiting");
    result
}

fn run(
    backend: &mut RatatuiBackend,
    state: &mut AppState,
    panes: &mut PaneManager,
    sink: &dyn CommandSink,
    app_frame: &mut Frame,
    globals: &GlobalBindings,
    mut battery: BatteryMonitor,
) -> anyhow::Result<()> {
    loop {
        if let Some(event) = backend.poll_event(Duration::from_millis(16)) {
            let action = match event {
                AppEvent::Key(key) => {
                    let exclusive = panes.active().wants_exclusive_input();
                    match globals.lookup(&key, exclusive) {
                        Some("quit") => Action::Quit,
                        Some("help") => Action::Nav(NavAction::PushPane("help")),
                        _ => panes.active_mut().handle_input(key, state),
                    }
                }
                AppEvent::Mouse(mouse) => panes.active_mut().handle_mouse(mouse, state),
            };
            if dispatch::dispatch_action(&action, state, panes, sink, app_frame) {
                break;
            }
        }

        if let Some(level) = battery.poll(Instant::now()) {
            state.battery = level;
        }

        backend.draw(|area, buf| {
            app_frame.render_buf(area, buf, state);
            panes.render(Frame::content_area(area), buf, state);
        })?;
    }

    Ok(())
}
