use crate::app::DashboardState;
use crate::wifi::StatusReader;
use crossterm::event::{self, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

/// Handle keyboard events for the dashboard. Returns true to quit.
pub fn handle_main_view(key: KeyEvent, state: &mut DashboardState, reader: &StatusReader) -> bool {
    match key.code {
        event::KeyCode::Char('q') | event::KeyCode::Esc => return true,
        event::KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        event::KeyCode::Char('r') => {
            debug!("manual refresh");
            state.refresh(reader);
        }
        event::KeyCode::Char('s') => start_scan(state, reader),
        _ => {}
    }
    false
}

/// Run a blocking scan in the background; the result arrives on `scan_rx`
fn start_scan(state: &mut DashboardState, reader: &StatusReader) {
    if state.is_scanning {
        return;
    }
    state.is_scanning = true;
    let (tx, rx) = mpsc::channel(1);
    state.scan_rx = Some(rx);

    let reader = reader.clone();
    tokio::spawn(async move {
        let networks = tokio::task::spawn_blocking(move || reader.scan_networks())
            .await
            .unwrap_or_default();
        let _ = tx.send(networks).await;
    });
}
