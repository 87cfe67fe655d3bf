use crate::app::DashboardState;
use crate::config;
use crate::theme;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, Padding, Paragraph},
};

/// Match the parity of `available` so the window centers exactly
fn parity_matched(target: u16, available: u16) -> u16 {
    if target % 2 == available % 2 {
        target
    } else {
        target + 1
    }
}

fn rssi_style(rssi_dbm: i32) -> Style {
    if rssi_dbm == config::DEFAULT_RSSI_DBM {
        Style::default().fg(theme::BRIGHT_BLACK)
    } else if rssi_dbm >= -60 {
        Style::default().fg(theme::GREEN)
    } else if rssi_dbm >= -75 {
        Style::default().fg(theme::YELLOW)
    } else {
        Style::default().fg(theme::RED)
    }
}

/// Signal bar from -100 dBm (empty) to -30 dBm (full)
fn signal_bar(rssi_dbm: i32) -> String {
    if rssi_dbm == config::DEFAULT_RSSI_DBM {
        return String::new();
    }
    let filled = ((rssi_dbm.clamp(-100, -30) + 100) / 7) as usize;
    "█".repeat(filled)
}

pub fn render(frame: &mut Frame, state: &DashboardState) {
    let area = frame.area();

    // Set background color for the entire screen
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BACKGROUND).fg(theme::FOREGROUND)),
        area,
    );

    let height = parity_matched(config::MAIN_WINDOW_HEIGHT, area.height);
    let width = parity_matched(config::MAIN_WINDOW_WIDTH, area.width);

    // Center the main window
    let vertical_layout = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);

    let horizontal_layout = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(vertical_layout[1]);

    let main_area = horizontal_layout[1];

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BRIGHT_BLACK))
        .title(format!(" WIFIGLANCE v{} ", env!("CARGO_PKG_VERSION")))
        .title_alignment(Alignment::Center)
        .title_style(
            Style::default()
                .fg(theme::CYAN)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(main_block, main_area);

    let inner_area = main_area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });

    let content_layout = Layout::vertical([
        Constraint::Length(11), // Status
        Constraint::Min(4),     // Events
        Constraint::Length(2),  // Bottom bar
    ])
    .split(inner_area);

    render_status(frame, state, content_layout[0]);
    render_events(frame, state, content_layout[1]);
    render_help(frame, state, content_layout[2]);
}

fn render_status(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let snapshot = &state.snapshot;
    let label_style = Style::default().fg(theme::CYAN);

    let lines: Vec<Line> = snapshot
        .fields()
        .into_iter()
        .map(|(label, value)| {
            let mut spans = vec![
                Span::styled(format!("{label:<17}"), label_style),
                Span::raw(value),
            ];
            if label == "RSSI" {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    signal_bar(snapshot.rssi_dbm),
                    rssi_style(snapshot.rssi_dbm),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let title = format!(
        " {}{} ",
        state.icons.connected(snapshot.is_connected()),
        state.interface_name
    );
    let border_color = if snapshot.is_connected() {
        theme::GREEN
    } else {
        theme::RED
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .title_style(
                Style::default()
                    .fg(theme::PURPLE)
                    .add_modifier(Modifier::BOLD),
            )
            .title_bottom(
                Line::from(format!(
                    " updated {}s ago ",
                    state.last_refresh.elapsed().as_secs()
                ))
                .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(paragraph, area);
}

fn render_events(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let items: Vec<ListItem> = state
        .events
        .iter()
        .map(|(at, event)| {
            let age = at.elapsed().as_secs();
            ListItem::new(Line::from(vec![
                Span::styled(state.icons.event(), Style::default().fg(theme::BLUE)),
                Span::raw(event.to_string()),
                Span::styled(format!("  {age}s ago"), Style::default().fg(theme::BRIGHT_BLACK)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Events ")
            .title_style(
                Style::default()
                    .fg(theme::BRIGHT_PURPLE)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::BRIGHT_BLACK))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(list, area);
}

fn render_help(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let key_style = Style::default().fg(theme::FOREGROUND);
    let hint_style = Style::default().fg(theme::BRIGHT_BLACK);

    let scan_status = if state.is_scanning {
        Span::styled(
            format!(
                "{} scanning…",
                config::LOADING_CHARS[state.loading_frame % config::LOADING_CHARS.len()]
            ),
            Style::default().fg(theme::YELLOW),
        )
    } else if state.last_scan.is_some() {
        let best = state
            .strongest_networks(1)
            .first()
            .and_then(|n| n.ssid.clone())
            .unwrap_or_else(|| "-".to_string());
        Span::styled(
            format!(
                "{}{} networks, best: {best}",
                state.icons.scan(),
                state.last_scan.as_ref().map_or(0, |n| n.len())
            ),
            Style::default().fg(theme::BLUE),
        )
    } else {
        Span::raw("")
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("r", key_style),
            Span::styled(" refresh • ", hint_style),
            Span::styled("s", key_style),
            Span::styled(" scan • ", hint_style),
            Span::styled("q", key_style),
            Span::styled(" quit", hint_style),
        ]),
        Line::from(scan_status),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
