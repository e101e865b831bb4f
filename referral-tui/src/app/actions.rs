//! Actions and effects for the reducer pattern
//!
//! Actions describe what happened (input, results coming back from the
//! service layer). Effects describe work the reducer wants done outside of
//! it.

use crossterm::event::KeyEvent;
use libreferral::service::details::PatientDetails;
use libreferral::service::home::{EquipmentGroup, HomeView};
use libreferral::service::referral::{ReferralForm, ReferralOptions};
use libreferral::types::{Credentials, Patient};
use libreferral::{Loadable, Route, Submission};

/// Actions that trigger state transitions
#[derive(Debug, Clone)]
pub enum Action {
    // === UI Events ===
    /// Keyboard input event
    Key(KeyEvent),

    /// Periodic tick
    Tick,

    /// Terminal resize event
    Resize(u16, u16),

    // === Navigation ===
    /// Mount a screen; starts a new visit
    Navigate(Route),

    /// Quit the application
    Quit,

    /// Show help overlay
    ShowHelp,

    /// Hide help overlay
    HideHelp,

    // === Service results ===
    HomeLoaded {
        visit: u64,
        view: HomeView,
    },

    EquipmentSearched {
        visit: u64,
        results: Loadable<Vec<EquipmentGroup>>,
    },

    DetailsLoaded {
        visit: u64,
        details: Loadable<PatientDetails>,
    },

    ReferralOptionsLoaded {
        visit: u64,
        options: Loadable<ReferralOptions>,
    },

    /// Outcome of the login, register or referral form
    Submitted {
        visit: u64,
        outcome: Submission,
    },

    // === Error Handling ===
    /// Show error overlay
    ShowError(String),

    /// Dismiss error overlay
    DismissError,

    // === Status Bar ===
    SetStatus(String),

    ClearStatus,
}

impl Action {
    /// Visit a service result belongs to, `None` for everything else
    pub fn visit(&self) -> Option<u64> {
        match self {
            Action::HomeLoaded { visit, .. }
            | Action::EquipmentSearched { visit, .. }
            | Action::DetailsLoaded { visit, .. }
            | Action::ReferralOptionsLoaded { visit, .. }
            | Action::Submitted { visit, .. } => Some(*visit),
            _ => None,
        }
    }
}

/// Side effects queued by the reducer
#[derive(Debug)]
pub enum Effect {
    /// Decide the first screen from the stored token
    ResolveStartRoute,
    LoadHome,
    SearchEquipment(String),
    LoadDetails(Patient),
    LoadReferralOptions,
    Login(Credentials),
    Register(Credentials),
    SubmitReferral(ReferralForm),
    Logout,
}

impl Effect {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Effect::ResolveStartRoute => "resolve_start_route",
            Effect::LoadHome => "load_home",
            Effect::SearchEquipment(_) => "search_equipment",
            Effect::LoadDetails(_) => "load_details",
            Effect::LoadReferralOptions => "load_referral_options",
            Effect::Login(_) => "login",
            Effect::Register(_) => "register",
            Effect::SubmitReferral(_) => "submit_referral",
            Effect::Logout => "logout",
        }
    }
}
