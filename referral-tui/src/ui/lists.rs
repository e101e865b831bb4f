//! Home and patient details screens

use libreferral::service::home::EquipmentGroup;
use libreferral::types::Patient;
use libreferral::Loadable;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{error_line, fg, screen_block, text_spans};
use crate::app::{AppState, HomeSection};

fn section_block(state: &AppState, section: HomeSection) -> Block<'static> {
    let focused = state.home.section == section;
    let style = if focused {
        fg(state, Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Block::default()
        .title(format!(" {} ", section.title()))
        .borders(Borders::ALL)
        .border_style(style)
}

/// Placeholder shown in a section while data is missing
fn placeholder(state: &AppState, section: HomeSection) -> Option<Paragraph<'static>> {
    match &state.home.data {
        Loadable::Loading => Some(Paragraph::new(Line::from(Span::styled(
            format!("Loading {}...", section.title().to_lowercase()),
            fg(state, Color::Yellow),
        )))),
        Loadable::Failed(message) => Some(
            Paragraph::new(error_line(state, message)).wrap(Wrap { trim: false }),
        ),
        Loadable::Ready(_) => None,
    }
}

pub(super) fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + search
            Constraint::Min(4),    // Sections
        ])
        .split(area);

    render_home_header(frame, chunks[0], state);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let areas = [top[0], top[1], bottom[0], bottom[1]];
    for (section, area) in HomeSection::ALL.into_iter().zip(areas) {
        render_section(frame, area, state, section);
    }
}

fn render_home_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let search = &state.home.search;
    let mut spans = Vec::new();

    if let Some(user) = &state.home.user {
        let role = user.role.as_deref().unwrap_or("user");
        let hospital = user
            .hospital
            .map(|id| format!(" @ hospital #{}", id))
            .unwrap_or_default();
        spans.push(Span::styled(
            format!("{}{}", role, hospital),
            fg(state, Color::Green),
        ));
        spans.push(Span::raw(" | "));
    }

    spans.push(Span::raw("Search equipment: "));
    spans.extend(text_spans(&search.query, search.editing));

    let header = Paragraph::new(Line::from(spans)).block(screen_block(state.route.title()));
    frame.render_widget(header, area);
}

fn render_section(frame: &mut Frame, area: Rect, state: &AppState, section: HomeSection) {
    let block = section_block(state, section);

    // Search results take over the equipment section
    if section == HomeSection::Equipment {
        if let Some(results) = &state.home.search.results {
            render_search_results(frame, area, state, results, block);
            return;
        }
    }

    if let Some(placeholder) = placeholder(state, section) {
        frame.render_widget(placeholder.block(block), area);
        return;
    }

    let Some(data) = state.home.data.ready() else {
        return;
    };

    let items: Vec<ListItem> = match section {
        HomeSection::Patients => data
            .patients
            .iter()
            .map(|p| ListItem::new(p.full_name()))
            .collect(),
        HomeSection::Referrals => data
            .referrals
            .iter()
            .map(|r| {
                let patient = r
                    .patient
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "?".to_string());
                ListItem::new(format!(
                    "Referral for Patient ID {}, Status: {}",
                    patient, r.status
                ))
            })
            .collect(),
        HomeSection::Hospitals => data
            .hospitals
            .iter()
            .map(|h| ListItem::new(format!("{} ({}) - {}", h.name, h.kind, h.address)))
            .collect(),
        HomeSection::Equipment => data
            .equipment
            .iter()
            .map(|e| {
                let name = e.equipment_name.as_deref().unwrap_or("(unnamed)");
                let available = if e.available { "available" } else { "in use" };
                ListItem::new(format!("{} - {} [{}]", name, e.hospital.label(), available))
            })
            .collect(),
    };

    render_rows(frame, area, state, section, items, block);
}

/// Scrollable list; only the focused section shows its highlight
fn render_rows(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    section: HomeSection,
    items: Vec<ListItem<'static>>,
    block: Block<'static>,
) {
    let count = items.len();
    let mut list = List::new(items).block(block);
    if state.home.section == section {
        list = list
            .highlight_style(fg(state, Color::Yellow).add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
    }

    let mut list_state = ListState::default();
    if count > 0 {
        list_state.select(Some(state.home.row(section).min(count - 1)));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    results: &Loadable<Vec<EquipmentGroup>>,
    block: Block<'static>,
) {
    let lines: Vec<Line<'static>> = match results {
        Loadable::Loading => vec![Line::from(Span::styled(
            "Searching...",
            fg(state, Color::Yellow),
        ))],
        Loadable::Failed(message) => vec![error_line(state, message)],
        Loadable::Ready(groups) if groups.is_empty() => vec![Line::from("No equipment found")],
        Loadable::Ready(groups) => groups
            .iter()
            .flat_map(|group| {
                let header = Line::from(Span::styled(
                    group.hospital.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                let items = group.equipment.iter().map(|e| {
                    Line::from(format!(
                        "  - {}",
                        e.equipment_name.clone().unwrap_or_default()
                    ))
                });
                std::iter::once(header).chain(items)
            })
            .collect(),
    };

    // Same shape as the section lists: the highlighted row keeps on screen
    let items: Vec<ListItem> = lines.into_iter().map(ListItem::new).collect();
    render_rows(
        frame,
        area,
        state,
        HomeSection::Equipment,
        items,
        block.title(" Search Results "),
    );
}

pub(super) fn render_details(frame: &mut Frame, area: Rect, state: &AppState, patient: &Patient) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let info = vec![
        Line::from(format!("First Name: {}", patient.first_name)),
        Line::from(format!("Last Name: {}", patient.last_name)),
        Line::from(format!("Date Of Birth: {}", patient.dob)),
        Line::from(format!("Gender: {}", patient.gender)),
        Line::from(format!("Contact Info: {}", patient.contact_info)),
    ];
    let info = Paragraph::new(info)
        .block(screen_block(state.route.title()))
        .wrap(Wrap { trim: false });
    frame.render_widget(info, chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = match &state.details {
        Loadable::Loading => vec![Line::from(Span::styled(
            "Loading details...",
            fg(state, Color::Yellow),
        ))],
        Loadable::Failed(message) => vec![error_line(state, message)],
        Loadable::Ready(details) => {
            let mut lines = vec![Line::from(Span::styled("Medical History", bold))];
            for history in &details.medical_history {
                lines.push(Line::from(format!(
                    "  {} - {} ({} - {})",
                    history.condition,
                    history.treatment,
                    history.start_date,
                    history.end_date.as_deref().unwrap_or("Ongoing")
                )));
                if let Some(notes) = &history.notes {
                    lines.push(Line::from(format!("    Notes: {}", notes)));
                }
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Diagnostics", bold)));
            for diagnostic in &details.diagnostics {
                lines.push(Line::from(format!(
                    "  {} on {}",
                    diagnostic.diagnostic_type, diagnostic.date_taken
                )));
                lines.push(Line::from(format!("    Result: {}", diagnostic.result)));
                if let Some(notes) = &diagnostic.notes {
                    lines.push(Line::from(format!("    Notes: {}", notes)));
                }
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Referrals", bold)));
            for referral in &details.referrals {
                lines.push(Line::from(format!("  Status: {}", referral.status)));
                lines.push(Line::from(format!(
                    "    Referred from: {}",
                    details.hospital_name(referral.referred_from)
                )));
                lines.push(Line::from(format!(
                    "    Referred to: {}",
                    details.hospital_name(referral.referred_to)
                )));
                lines.push(Line::from(format!("    Reason: {}", referral.referral_reason)));
                lines.push(Line::from(format!("    Date: {}", referral.referral_date)));
            }
            lines
        }
    };

    // No wrapping, so one line is one row and the offset can stop at the
    // last full page
    let block = Block::default().borders(Borders::ALL);
    let visible = block.inner(chunks[1]).height as usize;
    let offset = state
        .details_scroll
        .min(lines.len().saturating_sub(visible));
    let body = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(body, chunks[1]);
}
