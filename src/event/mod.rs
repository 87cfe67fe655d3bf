//! Event handling module for the wifiglance dashboard
//!
//! This module handles keyboard input, WiFi events, and the main event loop.
//! All presentation state is mutated on the task that runs the loop; the
//! monitor callback only forwards events into a channel.

mod handlers;

use crate::{
    app::{AppContext, DashboardState},
    config,
    ui::render,
};
use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use handlers::handle_main_view;
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::info;

pub async fn run(
    mut terminal: DefaultTerminal,
    context: &mut AppContext,
    state: &mut DashboardState,
) -> Result<()> {
    let mut wifi_events = context.watch();
    info!(interface = %state.interface_name, "dashboard started");

    loop {
        terminal.draw(|frame| render(frame, state))?;

        // Drain WiFi events delivered since the last frame
        while let Ok(wifi_event) = wifi_events.try_recv() {
            state.apply_event(wifi_event, &context.reader);
        }

        // Check for scan results
        let scanned = state
            .scan_rx
            .as_mut()
            .and_then(|rx| rx.try_recv().ok());
        if let Some(networks) = scanned {
            info!(count = networks.len(), "scan finished");
            state.finish_scan(networks);
        }

        if state.is_scanning {
            state.loading_frame = (state.loading_frame + 1) % config::LOADING_CHARS.len();
        }

        if event::poll(Duration::from_millis(config::EVENT_POLL_MS))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_main_view(key, state, &context.reader)
        {
            break;
        }
    }

    context.monitor.stop();
    info!("dashboard stopped");
    Ok(())
}
