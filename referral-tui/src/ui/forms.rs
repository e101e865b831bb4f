//! Login, register and referral form screens

use libreferral::service::referral::ReferralOptions;
use libreferral::Loadable;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{error_line, fg, screen_block, text_spans};
use crate::app::{AppState, CredentialsField, CredentialsForm, ReferralField};

pub(super) fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    render_credentials(frame, area, state, &state.login, "Login", "LOGIN");
}

pub(super) fn render_register(frame: &mut Frame, area: Rect, state: &AppState) {
    render_credentials(frame, area, state, &state.register, "Register", "REGISTER");
}

fn field_line<'a>(
    state: &AppState,
    label: &'a str,
    value: Vec<Span<'static>>,
    focused: bool,
) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused {
        fg(state, Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{:<16}", label), label_style),
    ];
    spans.extend(value);
    Line::from(spans)
}

fn render_credentials(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    form: &CredentialsForm,
    title: &str,
    button: &str,
) {
    let on_username = form.focus == CredentialsField::Username && !form.submitting;
    let on_password = form.focus == CredentialsField::Password && !form.submitting;
    let mut lines = vec![
        Line::from(""),
        field_line(
            state,
            "Username",
            text_spans(&form.username, on_username),
            form.focus == CredentialsField::Username,
        ),
        field_line(
            state,
            "Password",
            text_spans(&form.password, on_password),
            form.focus == CredentialsField::Password,
        ),
        Line::from(""),
    ];

    if let Some(error) = form.error {
        lines.push(error_line(state, error));
        lines.push(Line::from(""));
    }

    if form.submitting {
        lines.push(Line::from(Span::styled("Please wait...", fg(state, Color::Yellow))));
    } else {
        lines.push(Line::from(Span::styled(
            format!("[ {} ]  (Enter)", button),
            fg(state, Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }

    let text = Paragraph::new(lines)
        .block(screen_block(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(text, area);
}

/// Display label for a picker value
fn picker_value(options: Option<&ReferralOptions>, field: ReferralField, id: Option<i64>) -> String {
    let Some(id) = id else {
        return "(none)".to_string();
    };

    let name = options.and_then(|options| match field {
        ReferralField::Patient => options
            .patients
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.full_name()),
        _ => options
            .hospitals
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.name.clone()),
    });

    name.unwrap_or_else(|| format!("#{}", id))
}

pub(super) fn render_referral_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let referral = &state.referral;
    let options = referral.options.ready();
    let form = &referral.form;

    let mut lines = vec![Line::from("")];

    match &referral.options {
        Loadable::Loading => lines.push(Line::from(Span::styled(
            "Loading patients and hospitals...",
            fg(state, Color::Yellow),
        ))),
        Loadable::Failed(message) => lines.push(error_line(state, message)),
        Loadable::Ready(_) => {}
    }

    for field in ReferralField::ALL {
        let focused = referral.focus == field;
        let editing = focused && !referral.submitting;
        let value = match field {
            ReferralField::Reason => text_spans(&referral.reason, editing),
            ReferralField::Date => text_spans(&referral.date, editing),
            _ => {
                let choice = match field {
                    ReferralField::Patient => picker_value(options, field, form.patient),
                    ReferralField::ReferredFrom => picker_value(options, field, form.referred_from),
                    ReferralField::ReferredTo => picker_value(options, field, form.referred_to),
                    _ => form.status.to_string(),
                };
                vec![Span::raw(format!("< {} >", choice))]
            }
        };
        lines.push(field_line(state, field.label(), value, focused));
    }

    lines.push(Line::from(""));

    if let Some(error) = referral.error {
        lines.push(error_line(state, error));
        lines.push(Line::from(""));
    }

    if referral.submitting {
        lines.push(Line::from(Span::styled("Submitting...", fg(state, Color::Yellow))));
    } else {
        lines.push(Line::from(Span::styled(
            "[ Submit Referral ]  (Enter)",
            fg(state, Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }

    let text = Paragraph::new(lines)
        .block(screen_block(state.route.title()))
        .wrap(Wrap { trim: false });
    frame.render_widget(text, area);
}
