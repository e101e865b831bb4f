//! Pure reducer function for state transitions
//!
//! `(State, Action) -> State`. The reducer performs no I/O: anything that
//! needs the network or the token store is pushed onto `state.effects` and
//! run by the event loop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use libreferral::types::ReferralStatus;
use libreferral::{Loadable, Route, Submission};

use super::actions::{Action, Effect};
use super::state::{
    details_line_count, AppState, CredentialsForm, HomeSection, HomeState, ReferralField,
    ReferralFormState, PAGE_ROWS,
};

/// Pure reducer function
///
/// Service results carry the visit that requested them; a result from any
/// visit other than the current one is dropped unchanged.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    if let Some(visit) = action.visit() {
        if visit != state.visit {
            return state;
        }
    }

    match action {
        // === UI Events ===
        Action::Key(key) => handle_key(state, key),
        Action::Tick => state,
        Action::Resize(_, _) => state,

        // === Navigation ===
        Action::Navigate(route) => navigate(state, route),

        Action::Quit => AppState {
            should_quit: true,
            ..state
        },

        Action::ShowHelp => AppState {
            help_visible: true,
            ..state
        },

        Action::HideHelp => AppState {
            help_visible: false,
            ..state
        },

        // === Service results ===
        Action::HomeLoaded { view, .. } => {
            state.home.data = view.data;
            state.home.user = view.user;
            state.home.rows = [0; 4];
            state
        }

        Action::EquipmentSearched { results, .. } => {
            state.home.search.results = Some(results);
            state.home.reset_row(HomeSection::Equipment);
            state
        }

        Action::DetailsLoaded { details, .. } => {
            state.details = details;
            state
        }

        Action::ReferralOptionsLoaded { options, .. } => {
            state.referral.options = options;
            state
        }

        Action::Submitted { outcome, .. } => submitted(state, outcome),

        // === Error Handling ===
        Action::ShowError(error) => AppState {
            error: Some(error),
            ..state
        },

        Action::DismissError => AppState {
            error: None,
            ..state
        },

        // === Status Bar ===
        Action::SetStatus(message) => {
            state.status.message = Some(message);
            state
        }

        Action::ClearStatus => {
            state.status.message = None;
            state
        }
    }
}

/// Mount a screen
///
/// Every mount is a new visit: screen state is reset and the screen's load
/// effect is queued again.
fn navigate(mut state: AppState, route: Route) -> AppState {
    state.visit += 1;
    state.help_visible = false;
    state.status.message = None;

    match &route {
        Route::Index => state.effects.push(Effect::ResolveStartRoute),
        Route::Instructions => {}
        Route::Login => state.login = CredentialsForm::default(),
        Route::Register => state.register = CredentialsForm::default(),
        Route::Home => {
            state.home = HomeState::default();
            state.effects.push(Effect::LoadHome);
        }
        Route::Details(patient) => {
            state.details = Loadable::Loading;
            state.details_scroll = 0;
            state.effects.push(Effect::LoadDetails(patient.clone()));
        }
        Route::ReferralForm => {
            state.referral = ReferralFormState::default();
            state.effects.push(Effect::LoadReferralOptions);
        }
    }

    state.route = route;
    state
}

fn submitted(mut state: AppState, outcome: Submission) -> AppState {
    match outcome {
        Submission::Navigate(next) => {
            let message = match (&state.route, &next) {
                (Route::Register, Route::Login) => Some("Account created. Please log in."),
                (Route::ReferralForm, Route::Home) => Some("Referral created."),
                _ => None,
            };
            let mut state = navigate(state, next);
            state.status.message = message.map(str::to_string);
            state
        }
        Submission::Rejected(message) => {
            match state.route {
                Route::Login => {
                    state.login.submitting = false;
                    state.login.error = Some(message);
                }
                Route::Register => {
                    state.register.submitting = false;
                    state.register.error = Some(message);
                }
                Route::ReferralForm => {
                    state.referral.submitting = false;
                    state.referral.error = Some(message);
                }
                _ => {}
            }
            state
        }
    }
}

/// Handle keyboard input
///
/// Maps keys to high-level actions. This is where keybindings are defined.
fn handle_key(state: AppState, key: KeyEvent) -> AppState {
    // Global keybindings (work everywhere)
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            return reduce(state, Action::Quit);
        }

        (KeyCode::F(1), _) => {
            let action = if state.help_visible {
                Action::HideHelp
            } else {
                Action::ShowHelp
            };
            return reduce(state, action);
        }

        (KeyCode::Esc, _) if state.error.is_some() => {
            return reduce(state, Action::DismissError);
        }

        (KeyCode::Esc, _) if state.help_visible => {
            return reduce(state, Action::HideHelp);
        }

        (KeyCode::Char('q'), KeyModifiers::NONE) if !state.is_editing_text() => {
            return reduce(state, Action::Quit);
        }

        _ => {}
    }

    // Overlays swallow everything else
    if state.help_visible || state.error.is_some() {
        return state;
    }

    // Screen-specific keybindings
    match state.route {
        Route::Index => state,
        Route::Instructions => handle_instructions_key(state, key),
        Route::Login => handle_login_key(state, key),
        Route::Register => handle_register_key(state, key),
        Route::Home => handle_home_key(state, key),
        Route::Details(_) => handle_details_key(state, key),
        Route::ReferralForm => handle_referral_key(state, key),
    }
}

fn handle_instructions_key(state: AppState, key: KeyEvent) -> AppState {
    match key.code {
        KeyCode::Enter | KeyCode::Char('l') => reduce(state, Action::Navigate(Route::Login)),
        KeyCode::Char('r') => reduce(state, Action::Navigate(Route::Register)),
        _ => state,
    }
}

/// Shared editing for the login and register forms
///
/// Returns `true` when Enter asked for a submission.
fn edit_credentials(form: &mut CredentialsForm, key: &KeyEvent) -> bool {
    if form.submitting {
        return false;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = form.focus.toggle();
        }
        KeyCode::Enter => {
            form.submitting = true;
            form.error = None;
            return true;
        }
        _ => {
            form.focused_mut().input(*key);
        }
    }
    false
}

fn handle_login_key(mut state: AppState, key: KeyEvent) -> AppState {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => return reduce(state, Action::Navigate(Route::Instructions)),
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
            return reduce(state, Action::Navigate(Route::Register))
        }
        _ => {}
    }

    if edit_credentials(&mut state.login, &key) {
        let credentials = state.login.credentials();
        state.effects.push(Effect::Login(credentials));
    }
    state
}

fn handle_register_key(mut state: AppState, key: KeyEvent) -> AppState {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => return reduce(state, Action::Navigate(Route::Instructions)),
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => {
            return reduce(state, Action::Navigate(Route::Login))
        }
        _ => {}
    }

    if edit_credentials(&mut state.register, &key) {
        let credentials = state.register.credentials();
        state.effects.push(Effect::Register(credentials));
    }
    state
}

fn handle_home_key(mut state: AppState, key: KeyEvent) -> AppState {
    if state.home.search.editing {
        return handle_search_key(state, key);
    }

    let page = PAGE_ROWS as isize;

    match key.code {
        KeyCode::Tab => {
            state.home.section = state.home.section.next();
            state
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.home.move_row(-1);
            state
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.home.move_row(1);
            state
        }
        KeyCode::PageUp => {
            state.home.move_row(-page);
            state
        }
        KeyCode::PageDown => {
            state.home.move_row(page);
            state
        }
        KeyCode::Home | KeyCode::Char('g') => {
            state.home.jump_row(false);
            state
        }
        KeyCode::End | KeyCode::Char('G') => {
            state.home.jump_row(true);
            state
        }
        KeyCode::Enter if state.home.section == HomeSection::Patients => {
            let row = state.home.row(HomeSection::Patients);
            let patient = state
                .home
                .data
                .ready()
                .and_then(|d| d.patients.get(row))
                .cloned();
            match patient {
                Some(patient) => reduce(state, Action::Navigate(Route::Details(patient))),
                None => state,
            }
        }
        KeyCode::Char('/') | KeyCode::Char('s') => {
            state.home.search.editing = true;
            state.home.section = HomeSection::Equipment;
            state
        }
        KeyCode::Char('n') => reduce(state, Action::Navigate(Route::ReferralForm)),
        KeyCode::Char('r') => reduce(state, Action::Navigate(Route::Home)),
        KeyCode::Char('o') => {
            state.effects.push(Effect::Logout);
            state
        }
        _ => state,
    }
}

fn handle_search_key(mut state: AppState, key: KeyEvent) -> AppState {
    let search = &mut state.home.search;

    match key.code {
        KeyCode::Esc => {
            search.editing = false;
        }
        KeyCode::Enter => {
            search.editing = false;
            // A blank query does nothing
            if !search.query.is_blank() {
                search.results = Some(Loadable::Loading);
                let query = search.query.text();
                state.home.reset_row(HomeSection::Equipment);
                state.effects.push(Effect::SearchEquipment(query));
            }
        }
        _ => {
            search.query.input(key);
        }
    }
    state
}

fn handle_details_key(mut state: AppState, key: KeyEvent) -> AppState {
    let page = PAGE_ROWS as isize;

    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
            return reduce(state, Action::Navigate(Route::Home))
        }
        KeyCode::Up | KeyCode::Char('k') => state.scroll_details(-1),
        KeyCode::Down | KeyCode::Char('j') => state.scroll_details(1),
        KeyCode::PageUp => state.scroll_details(-page),
        KeyCode::PageDown => state.scroll_details(page),
        KeyCode::Home | KeyCode::Char('g') => state.details_scroll = 0,
        KeyCode::End | KeyCode::Char('G') => {
            state.details_scroll = state
                .details
                .ready()
                .map_or(0, |d| details_line_count(d).saturating_sub(1));
        }
        _ => {}
    }
    state
}

/// Step through picker choices; an unset picker starts at either end
fn cycle_id(current: Option<i64>, ids: &[i64], forward: bool) -> Option<i64> {
    let len = ids.len();
    if len == 0 {
        return current;
    }

    let next = match current.and_then(|id| ids.iter().position(|x| *x == id)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    Some(ids[next])
}

fn cycle_status(current: ReferralStatus, forward: bool) -> ReferralStatus {
    let all = ReferralStatus::SELECTABLE;
    let len = all.len();
    let next = match all.iter().position(|s| *s == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    all[next]
}

fn handle_referral_key(mut state: AppState, key: KeyEvent) -> AppState {
    if key.code == KeyCode::Esc {
        return reduce(state, Action::Navigate(Route::Home));
    }

    let referral = &mut state.referral;
    if referral.submitting {
        return state;
    }

    // Text fields take every key the form itself does not use
    if let Some(field) = referral.focused_text_mut() {
        if field.input(key) {
            return state;
        }
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => referral.focus = referral.focus.next(),
        KeyCode::BackTab | KeyCode::Up => referral.focus = referral.focus.prev(),
        KeyCode::Left | KeyCode::Right => {
            let forward = key.code == KeyCode::Right;
            let (patient_ids, hospital_ids): (Vec<i64>, Vec<i64>) = match referral.options.ready() {
                Some(options) => (
                    options.patients.iter().map(|p| p.id).collect(),
                    options.hospitals.iter().map(|h| h.id).collect(),
                ),
                None => (Vec::new(), Vec::new()),
            };
            let form = &mut referral.form;
            match referral.focus {
                ReferralField::Patient => form.patient = cycle_id(form.patient, &patient_ids, forward),
                ReferralField::ReferredFrom => {
                    form.referred_from = cycle_id(form.referred_from, &hospital_ids, forward)
                }
                ReferralField::ReferredTo => {
                    form.referred_to = cycle_id(form.referred_to, &hospital_ids, forward)
                }
                ReferralField::Status => form.status = cycle_status(form.status, forward),
                ReferralField::Reason | ReferralField::Date => {}
            }
        }
        KeyCode::Enter => {
            referral.submitting = true;
            referral.error = None;
            let form = referral.submission();
            state.effects.push(Effect::SubmitReferral(form));
        }
        _ => {}
    }
    state
}
