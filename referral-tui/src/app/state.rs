//! Application state
//!
//! All state transitions happen through the reducer (see `reducer.rs`).

use libreferral::service::details::PatientDetails;
use libreferral::service::home::{EquipmentGroup, HomeData};
use libreferral::service::referral::{ReferralForm, ReferralOptions};
use libreferral::types::{Credentials, User};
use libreferral::{Loadable, Route};

use super::actions::Effect;
use super::field::TextField;

/// Rows moved by PageUp/PageDown
pub const PAGE_ROWS: usize = 10;

/// Root application state
#[derive(Debug)]
pub struct AppState {
    /// Should the application quit?
    pub should_quit: bool,

    /// Current screen
    pub route: Route,

    /// Counter bumped on every navigation; results from older visits are dropped
    pub visit: u64,

    /// Help overlay visible?
    pub help_visible: bool,

    pub login: CredentialsForm,

    pub register: CredentialsForm,

    pub home: HomeState,

    pub details: Loadable<PatientDetails>,

    /// First visible line of the details pane
    pub details_scroll: usize,

    pub referral: ReferralFormState,

    /// Status bar state
    pub status: StatusBarState,

    /// Error overlay state
    pub error: Option<String>,

    /// UI configuration
    pub config: UiConfig,

    /// Effects waiting for the event loop
    pub effects: Vec<Effect>,
}

/// Field focus on the login and register screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsField {
    #[default]
    Username,
    Password,
}

impl CredentialsField {
    pub fn toggle(self) -> Self {
        match self {
            CredentialsField::Username => CredentialsField::Password,
            CredentialsField::Password => CredentialsField::Username,
        }
    }
}

/// Username/password form shared by login and register
#[derive(Debug, Clone)]
pub struct CredentialsForm {
    pub username: TextField,
    pub password: TextField,
    pub focus: CredentialsField,
    pub submitting: bool,
    pub error: Option<&'static str>,
}

impl Default for CredentialsForm {
    fn default() -> Self {
        Self {
            username: TextField::default(),
            password: TextField::masked(),
            focus: CredentialsField::default(),
            submitting: false,
            error: None,
        }
    }
}

impl CredentialsForm {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.text(), self.password.text())
    }

    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            CredentialsField::Username => &mut self.username,
            CredentialsField::Password => &mut self.password,
        }
    }
}

/// Sections of the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeSection {
    #[default]
    Patients,
    Referrals,
    Hospitals,
    Equipment,
}

impl HomeSection {
    pub const ALL: [HomeSection; 4] = [
        HomeSection::Patients,
        HomeSection::Referrals,
        HomeSection::Hospitals,
        HomeSection::Equipment,
    ];

    fn index(self) -> usize {
        match self {
            HomeSection::Patients => 0,
            HomeSection::Referrals => 1,
            HomeSection::Hospitals => 2,
            HomeSection::Equipment => 3,
        }
    }

    pub fn next(self) -> Self {
        match self {
            HomeSection::Patients => HomeSection::Referrals,
            HomeSection::Referrals => HomeSection::Hospitals,
            HomeSection::Hospitals => HomeSection::Equipment,
            HomeSection::Equipment => HomeSection::Patients,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            HomeSection::Patients => "Patients",
            HomeSection::Referrals => "Referrals",
            HomeSection::Hospitals => "Hospitals",
            HomeSection::Equipment => "Equipment",
        }
    }
}

/// Equipment search box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: TextField,
    pub editing: bool,
    /// `None` until a search has been issued
    pub results: Option<Loadable<Vec<EquipmentGroup>>>,
}

/// Home screen state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeState {
    pub data: Loadable<HomeData>,
    pub user: Option<User>,
    pub section: HomeSection,
    /// Highlighted row of each section, indexed like `HomeSection::ALL`
    pub rows: [usize; 4],
    pub search: SearchState,
}

impl HomeState {
    /// Highlighted row of `section`
    pub fn row(&self, section: HomeSection) -> usize {
        self.rows[section.index()]
    }

    /// Number of rows `section` currently shows
    ///
    /// Search results replace the equipment list: one row per hospital
    /// heading plus one per item.
    pub fn section_len(&self, section: HomeSection) -> usize {
        if section == HomeSection::Equipment {
            match &self.search.results {
                Some(Loadable::Ready(groups)) => {
                    return groups.iter().map(|g| 1 + g.equipment.len()).sum();
                }
                Some(_) => return 1,
                None => {}
            }
        }

        match self.data.ready() {
            Some(data) => match section {
                HomeSection::Patients => data.patients.len(),
                HomeSection::Referrals => data.referrals.len(),
                HomeSection::Hospitals => data.hospitals.len(),
                HomeSection::Equipment => data.equipment.len(),
            },
            None => 0,
        }
    }

    /// Move the focused section's highlight by `delta` rows, staying in range
    pub fn move_row(&mut self, delta: isize) {
        let section = self.section;
        let last = self.section_len(section).saturating_sub(1);
        let current = self.row(section);
        let moved = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.rows[section.index()] = moved.min(last);
    }

    /// Jump the focused section's highlight to its first or last row
    pub fn jump_row(&mut self, to_end: bool) {
        let section = self.section;
        self.rows[section.index()] = if to_end {
            self.section_len(section).saturating_sub(1)
        } else {
            0
        };
    }

    pub fn reset_row(&mut self, section: HomeSection) {
        self.rows[section.index()] = 0;
    }
}

/// Fields of the referral form, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferralField {
    #[default]
    Patient,
    ReferredFrom,
    ReferredTo,
    Reason,
    Date,
    Status,
}

impl ReferralField {
    pub const ALL: [ReferralField; 6] = [
        ReferralField::Patient,
        ReferralField::ReferredFrom,
        ReferralField::ReferredTo,
        ReferralField::Reason,
        ReferralField::Date,
        ReferralField::Status,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            ReferralField::Patient => "Patient",
            ReferralField::ReferredFrom => "Referred From",
            ReferralField::ReferredTo => "Referred To",
            ReferralField::Reason => "Referral Reason",
            ReferralField::Date => "Referral Date",
            ReferralField::Status => "Status",
        }
    }

    /// Free-text fields take typed characters; the rest are pickers
    pub fn is_text(self) -> bool {
        matches!(self, ReferralField::Reason | ReferralField::Date)
    }
}

/// Referral form screen state
///
/// Pickers live in `form`; the two free-text fields are edited in place and
/// copied into the form on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferralFormState {
    pub options: Loadable<ReferralOptions>,
    pub form: ReferralForm,
    pub reason: TextField,
    pub date: TextField,
    pub focus: ReferralField,
    pub submitting: bool,
    pub error: Option<&'static str>,
}

impl Default for ReferralFormState {
    fn default() -> Self {
        let form = ReferralForm::default();
        let date = TextField::new(form.date.clone());
        Self {
            options: Loadable::default(),
            form,
            reason: TextField::default(),
            date,
            focus: ReferralField::default(),
            submitting: false,
            error: None,
        }
    }
}

impl ReferralFormState {
    /// The text field that has focus, if any
    pub fn focused_text_mut(&mut self) -> Option<&mut TextField> {
        match self.focus {
            ReferralField::Reason => Some(&mut self.reason),
            ReferralField::Date => Some(&mut self.date),
            _ => None,
        }
    }

    /// The form as it will be sent
    pub fn submission(&self) -> ReferralForm {
        ReferralForm {
            reason: self.reason.text(),
            date: self.date.text(),
            ..self.form.clone()
        }
    }
}

/// Status bar state
#[derive(Debug, Clone, Default)]
pub struct StatusBarState {
    /// Current status message
    pub message: Option<String>,
}

/// UI configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Use colors?
    pub colors_enabled: bool,

    /// Tick rate in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err()
            && std::env::var("REFERRAL_TUI_NO_COLOR").is_err();

        let tick_rate_ms = std::env::var("REFERRAL_TUI_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            colors_enabled,
            tick_rate_ms,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            should_quit: false,
            route: Route::Index,
            visit: 0,
            help_visible: false,
            login: CredentialsForm::default(),
            register: CredentialsForm::default(),
            home: HomeState::default(),
            details: Loadable::Loading,
            details_scroll: 0,
            referral: ReferralFormState::default(),
            status: StatusBarState::default(),
            error: None,
            config: UiConfig::default(),
            effects: vec![Effect::ResolveStartRoute],
        }
    }
}

/// Number of lines the details pane shows for `details`
///
/// Three headings and two blank separators, then one or two lines per
/// history entry, two or three per diagnostic and five per referral.
pub fn details_line_count(details: &PatientDetails) -> usize {
    let history: usize = details
        .medical_history
        .iter()
        .map(|h| 1 + usize::from(h.notes.is_some()))
        .sum();
    let diagnostics: usize = details
        .diagnostics
        .iter()
        .map(|d| 2 + usize::from(d.notes.is_some()))
        .sum();

    5 + history + diagnostics + 5 * details.referrals.len()
}

impl AppState {
    /// Create new application state
    ///
    /// Starts on the index screen with the session guard queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain queued effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Scroll the details pane by `delta` lines
    ///
    /// The offset stays within the loaded content; the renderer additionally
    /// stops at the last full page.
    pub fn scroll_details(&mut self, delta: isize) {
        let last = self
            .details
            .ready()
            .map_or(0, |d| details_line_count(d).saturating_sub(1));
        let moved = if delta.is_negative() {
            self.details_scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.details_scroll.saturating_add(delta.unsigned_abs())
        };
        self.details_scroll = moved.min(last);
    }

    /// Whether typed characters go into a text field
    pub fn is_editing_text(&self) -> bool {
        match self.route {
            Route::Login | Route::Register => true,
            Route::Home => self.home.search.editing,
            Route::ReferralForm => self.referral.focus.is_text(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_credentials_form_debug_redacts_password() {
        let form = CredentialsForm {
            username: TextField::new("nurse"),
            password: {
                let mut password = TextField::masked();
                for c in "hunter2".chars() {
                    password.input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
                }
                password
            },
            ..Default::default()
        };

        let debug = format!("{:?}", form);
        assert!(debug.contains("nurse"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(form.password.display(), "*******");
        assert_eq!(form.credentials().username, "nurse");
    }

    #[test]
    fn test_referral_submission_takes_text_fields() {
        let mut state = ReferralFormState::default();
        assert_eq!(state.date.text(), state.form.date);

        state.reason = TextField::new("Cardiology consult");
        state.form.patient = Some(4);

        let form = state.submission();
        assert_eq!(form.reason, "Cardiology consult");
        assert_eq!(form.patient, Some(4));
        assert_eq!(form.date, state.date.text());
    }

    fn home_with(patients: usize, referrals: usize) -> HomeState {
        let data = HomeData {
            patients: (0..patients as i64)
                .map(|id| {
                    serde_json::from_value(serde_json::json!({
                        "id": id,
                        "first_name": "Ada",
                        "last_name": format!("Patient{}", id),
                        "dob": "1980-01-01",
                        "gender": "F",
                        "contact_info": "555-0100"
                    }))
                    .unwrap()
                })
                .collect(),
            referrals: (0..referrals as i64)
                .map(|id| {
                    serde_json::from_value(serde_json::json!({
                        "id": id,
                        "patient": 1,
                        "referred_from": 1,
                        "referred_to": 2,
                        "referral_reason": "Follow-up",
                        "referral_date": "2024-05-01",
                        "status": "Pending"
                    }))
                    .unwrap()
                })
                .collect(),
            ..Default::default()
        };
        HomeState {
            data: Loadable::Ready(data),
            ..Default::default()
        }
    }

    #[test]
    fn test_home_rows_move_per_section() {
        let mut home = home_with(3, 25);

        home.move_row(1);
        home.move_row(1);
        home.move_row(1);
        assert_eq!(home.row(HomeSection::Patients), 2);

        home.section = HomeSection::Referrals;
        home.move_row(PAGE_ROWS as isize);
        home.move_row(PAGE_ROWS as isize);
        home.move_row(PAGE_ROWS as isize);
        assert_eq!(home.row(HomeSection::Referrals), 24);
        assert_eq!(home.row(HomeSection::Patients), 2);

        home.move_row(-(PAGE_ROWS as isize));
        assert_eq!(home.row(HomeSection::Referrals), 14);

        home.jump_row(false);
        assert_eq!(home.row(HomeSection::Referrals), 0);

        home.section = HomeSection::Hospitals;
        home.move_row(1);
        assert_eq!(home.row(HomeSection::Hospitals), 0);
    }

    #[test]
    fn test_referral_field_cycle() {
        assert_eq!(ReferralField::Patient.next(), ReferralField::ReferredFrom);
        assert_eq!(ReferralField::Status.next(), ReferralField::Patient);
        assert_eq!(ReferralField::Patient.prev(), ReferralField::Status);
    }

    #[test]
    fn test_home_section_cycle() {
        let mut section = HomeSection::Patients;
        for _ in 0..HomeSection::ALL.len() {
            section = section.next();
        }
        assert_eq!(section, HomeSection::Patients);
    }
}
