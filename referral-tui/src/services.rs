//! Service layer adapter for the TUI
//!
//! Bridges the async `ReferralService` to the synchronous event loop.
//!
//! # Architecture
//!
//! - `ServiceHandle` owns a tokio runtime and the shared service
//! - `dispatch` runs one [`Effect`]; async work is spawned on the runtime
//! - Results come back as [`Action`]s over a crossbeam channel, tagged with
//!   the visit that requested them
//! - `cancel_stale` aborts tasks that belong to a previous visit
//!
//! # Example
//!
//! ```no_run
//! use referral_tui::services::ServiceHandle;
//! use referral_tui::Effect;
//!
//! # fn example() -> referral_tui::Result<()> {
//! let config = libreferral::Config::load()?;
//! let mut services = ServiceHandle::new(config)?;
//!
//! services.dispatch(1, Effect::LoadHome);
//!
//! // In the event loop
//! for action in services.drain() {
//!     // reduce(state, action)
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use libreferral::{Config, ReferralService};
use tokio::task::JoinHandle;

use crate::app::{Action, Effect};
use crate::error::Result;

/// Service handle for TUI operations
pub struct ServiceHandle {
    service: Arc<ReferralService>,
    runtime: tokio::runtime::Runtime,
    tx: Sender<Action>,
    rx: Receiver<Action>,
    tasks: Vec<(u64, JoinHandle<()>)>,
}

impl ServiceHandle {
    /// Create a handle over a service built from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token store or API client cannot be set up
    /// - Tokio runtime cannot be created
    pub fn new(config: Config) -> Result<Self> {
        let service = ReferralService::from_config(config)?;
        Self::with_service(service)
    }

    /// Create a handle over an existing service
    pub fn with_service(service: ReferralService) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (tx, rx) = unbounded();

        Ok(Self {
            service: Arc::new(service),
            runtime,
            tx,
            rx,
            tasks: Vec::new(),
        })
    }

    pub fn service(&self) -> &ReferralService {
        &self.service
    }

    /// Receiver for results; useful for blocking waits in tests
    pub fn results(&self) -> &Receiver<Action> {
        &self.rx
    }

    /// Collect every result that has arrived so far
    pub fn drain(&self) -> Vec<Action> {
        self.rx.try_iter().collect()
    }

    /// Number of tracked tasks that have not finished
    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|(_, h)| !h.is_finished()).count()
    }

    fn spawn<F>(&mut self, visit: u64, task: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let tx = self.tx.clone();
        let handle = self.runtime.spawn(async move {
            let action = task.await;
            // The receiver only goes away at shutdown
            let _ = tx.send(action);
        });
        self.tasks.push((visit, handle));
    }

    fn send_now(&self, action: Action) {
        let _ = self.tx.send(action);
    }

    /// Run an effect on behalf of `visit`
    pub fn dispatch(&mut self, visit: u64, effect: Effect) {
        tracing::debug!(visit, effect = effect.name(), "Dispatching effect");
        let service = Arc::clone(&self.service);

        match effect {
            Effect::ResolveStartRoute => {
                let route = service.start_route();
                tracing::info!(route = route.title(), "Start route resolved");
                self.send_now(Action::Navigate(route));
            }
            Effect::Logout => {
                let route = service.auth().logout();
                self.send_now(Action::Navigate(route));
            }
            Effect::LoadHome => self.spawn(visit, async move {
                let view = service.home().load().await;
                Action::HomeLoaded { visit, view }
            }),
            Effect::SearchEquipment(query) => self.spawn(visit, async move {
                // The reducer filters blank queries; a `None` here never reaches the UI
                let results = service
                    .home()
                    .search_equipment(&query)
                    .await
                    .unwrap_or(libreferral::Loadable::Ready(Vec::new()));
                Action::EquipmentSearched { visit, results }
            }),
            Effect::LoadDetails(patient) => self.spawn(visit, async move {
                let details = service.details().load(&patient).await;
                Action::DetailsLoaded { visit, details }
            }),
            Effect::LoadReferralOptions => self.spawn(visit, async move {
                let options = service.referral().load_options().await;
                Action::ReferralOptionsLoaded { visit, options }
            }),
            Effect::Login(credentials) => self.spawn(visit, async move {
                let outcome = service.auth().login(&credentials).await;
                Action::Submitted { visit, outcome }
            }),
            Effect::Register(credentials) => self.spawn(visit, async move {
                let outcome = service.auth().register(&credentials).await;
                Action::Submitted { visit, outcome }
            }),
            Effect::SubmitReferral(form) => self.spawn(visit, async move {
                let outcome = service.referral().submit(&form).await;
                Action::Submitted { visit, outcome }
            }),
        }
    }

    /// Abort tasks started by any visit other than `current`
    ///
    /// Finished tasks are forgotten as well.
    pub fn cancel_stale(&mut self, current: u64) {
        self.tasks.retain(|(visit, handle)| {
            if handle.is_finished() {
                return false;
            }
            if *visit != current {
                tracing::debug!(visit, current, "Aborting task from previous visit");
                handle.abort();
                return false;
            }
            true
        });
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        for (_, handle) in &self.tasks {
            handle.abort();
        }
    }
}
