//! UI rendering
//!
//! Pure rendering functions that transform state into terminal frames.

mod forms;
mod lists;

use libreferral::Route;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{AppState, TextField};

/// Render the application UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Screen
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    match &state.route {
        Route::Index => render_splash(frame, chunks[0], state),
        Route::Instructions => render_instructions(frame, chunks[0], state),
        Route::Login => forms::render_login(frame, chunks[0], state),
        Route::Register => forms::render_register(frame, chunks[0], state),
        Route::Home => lists::render_home(frame, chunks[0], state),
        Route::Details(patient) => lists::render_details(frame, chunks[0], state, patient),
        Route::ReferralForm => forms::render_referral_form(frame, chunks[0], state),
    }

    render_status_bar(frame, chunks[1], state);

    if state.help_visible {
        render_help_overlay(frame, area, state);
    }

    if let Some(ref error) = state.error {
        render_error_overlay(frame, area, error, state);
    }
}

/// Foreground style that respects `NO_COLOR`
pub(crate) fn fg(state: &AppState, color: Color) -> Style {
    if state.config.colors_enabled {
        Style::default().fg(color)
    } else {
        Style::default()
    }
}

pub(crate) fn screen_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
}

pub(crate) fn error_line(state: &AppState, message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        fg(state, Color::Red).add_modifier(Modifier::BOLD),
    ))
}

/// Spans for a text field; the focused field shows its cursor as a
/// reversed cell
pub(crate) fn text_spans(field: &TextField, focused: bool) -> Vec<Span<'static>> {
    let shown = field.display();
    if !focused {
        return vec![Span::raw(shown)];
    }

    let chars: Vec<char> = shown.chars().collect();
    let cursor = field.cursor().min(chars.len());
    let before: String = chars[..cursor].iter().collect();
    let (at, after) = match chars.get(cursor) {
        Some(c) => (c.to_string(), chars[cursor + 1..].iter().collect()),
        None => (" ".to_string(), String::new()),
    };
    let reversed = Style::default().add_modifier(Modifier::REVERSED);

    vec![
        Span::raw(before),
        Span::styled(at, reversed),
        Span::raw(after),
    ]
}

fn render_splash(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Checking session...", fg(state, Color::Yellow))),
    ])
    .block(screen_block(state.route.title()))
    .alignment(Alignment::Center);

    frame.render_widget(text, area);
}

fn render_instructions(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines = vec![
        Line::from(Span::styled(
            "Usage Instructions",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("1. Log in to access the app."),
        Line::from("2. After logging in you can view hospitals, patients, referrals and related info."),
        Line::from("3. Select a patient to view more details."),
        Line::from("4. Press o on the home screen to log out."),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/l: Login | r: Register | q: Quit",
            fg(state, Color::Yellow),
        )),
    ];

    let text = Paragraph::new(lines)
        .block(screen_block(state.route.title()))
        .wrap(Wrap { trim: false });

    frame.render_widget(text, area);
}

fn hints(state: &AppState) -> &'static str {
    match &state.route {
        Route::Index => "q: Quit",
        Route::Instructions => "Enter: Login | r: Register | F1: Help | q: Quit",
        Route::Login => "Tab: Next field | Enter: Login | Ctrl+R: Register | Esc: Back",
        Route::Register => "Tab: Next field | Enter: Register | Ctrl+L: Login | Esc: Back",
        Route::Home if state.home.search.editing => "Enter: Search | Esc: Stop editing",
        Route::Home => {
            "Tab: Section | Up/Down/PgUp/PgDn: Scroll | Enter: Details | /: Search | n: New referral | o: Logout"
        }
        Route::Details(_) => "Up/Down/PgUp/PgDn: Scroll | Esc: Back | F1: Help | q: Quit",
        Route::ReferralForm => "Tab: Next | Left/Right: Choose | Enter: Submit | Esc: Cancel",
    }
}

/// Render status bar with the last status message and key hints
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = Vec::new();
    if let Some(ref message) = state.status.message {
        spans.push(Span::styled(message.clone(), fg(state, Color::Green)));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(hints(state), fg(state, Color::Gray)));

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Global:"),
        Line::from("  q        - Quit (outside text fields)"),
        Line::from("  Ctrl+C   - Quit"),
        Line::from("  F1       - Toggle help"),
        Line::from("  Esc      - Dismiss overlays / go back"),
        Line::from(""),
        Line::from("Home:"),
        Line::from("  Tab      - Next section"),
        Line::from("  Up/Down  - Move in the focused section"),
        Line::from("  PgUp/PgDn, Home/End - Page, first, last"),
        Line::from("  Enter    - Patient details"),
        Line::from("  /        - Search equipment"),
        Line::from("  n        - New referral"),
        Line::from("  r        - Reload"),
        Line::from("  o        - Logout"),
        Line::from(""),
        Line::from("Details:"),
        Line::from("  Up/Down/PgUp/PgDn/Home/End - Scroll"),
        Line::from(""),
        Line::from("Forms:"),
        Line::from("  Tab      - Next field"),
        Line::from("  Left/Right, Home/End - Move the cursor in text"),
        Line::from("  Left/Right - Change selection"),
        Line::from("  Enter    - Submit"),
        Line::from(""),
        Line::from("Press Esc or F1 to close"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(fg(state, Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help, popup_area);
}

/// Render error overlay
fn render_error_overlay(frame: &mut Frame, area: Rect, error: &str, state: &AppState) {
    let popup_area = centered_rect(70, 30, area);

    let error_text = vec![
        error_line(state, "Error"),
        Line::from(""),
        Line::from(error.to_string()),
        Line::from(""),
        Line::from("Press Esc to dismiss"),
    ];

    let error_widget = Paragraph::new(error_text)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(fg(state, Color::Red)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(error_widget, popup_area);
}

/// Helper to create centered rectangle
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
