//! Dashboard page flow as an explicit state machine.
//!
//! Instead of implicit reactive recomputation, the dashboard load is a
//! single pass with named states: `Loading` while data is fetched, then
//! `Ready` or `Error`. A failed administered fetch does not fail the page:
//! the state machine transitions to `Ready` in degraded mode (past-due
//! inference only) and carries a transient warning for rendering.

use chanjo_client::AdministeredStore;
use chanjo_core::{AdministeredRecord, AdministeredSource, Baby, ChanjoError};
use chanjo_schedule::{
    is_locked, reconcile, resolve_schedule, Reconciliation, ResolvedDose, RuleTable,
};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// States of the dashboard page.
#[derive(Debug)]
pub enum DashboardState {
    /// Data is being fetched.
    Loading,
    /// Schedule resolved and reconciled; `warning` is set in degraded mode.
    Ready(Dashboard),
    /// The page could not load at all (e.g. the profile fetch failed).
    Error(String),
}

impl DashboardState {
    /// Transition used when a prerequisite fetch fails before the
    /// schedule can even be resolved.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(error = %message, "dashboard: error");
        DashboardState::Error(message)
    }
}

/// A loaded dashboard for one baby.
#[derive(Debug)]
pub struct Dashboard {
    pub baby: Baby,
    /// Full resolved schedule in rule-table order, including doses whose
    /// offset spec did not parse (no due date).
    pub schedule: Vec<ResolvedDose>,
    pub reconciliation: Reconciliation,
    pub today: NaiveDate,
    /// Transient warning carried when the page is degraded.
    pub warning: Option<String>,
}

/// Load the dashboard for a baby.
///
/// `today` is computed once by the caller and never re-polled during the
/// page's lifetime.
pub async fn load_dashboard(
    store: &dyn AdministeredStore,
    rules: &RuleTable,
    token: &str,
    baby: Baby,
    today: NaiveDate,
) -> DashboardState {
    let state = DashboardState::Loading;
    debug!(baby = %baby.name, state = ?state, "dashboard: loading");

    let schedule = resolve_schedule(&rules.rules, baby.date_of_birth);

    let (server, warning) = match store.administered(token, &baby.id).await {
        Ok(records) => (records, None),
        Err(e) => {
            warn!(baby = %baby.id, error = %e, "failed to load administered list from server");
            (
                Vec::new(),
                Some(
                    "Could not reach the server's administered history; \
                     showing past-due doses as administered"
                        .to_string(),
                ),
            )
        }
    };

    let reconciliation = reconcile(&schedule, &server, today);
    info!(
        baby = %baby.name,
        pending = reconciliation.pending.len(),
        administered = reconciliation.administered.len(),
        degraded = warning.is_some(),
        "dashboard: ready"
    );

    DashboardState::Ready(Dashboard {
        baby,
        schedule,
        reconciliation,
        today,
        warning,
    })
}

impl Dashboard {
    /// Optimistically mark a pending dose as administered.
    ///
    /// The dose leaves the pending set and joins the administered set
    /// before any network call happens; the caller persists the returned
    /// record best-effort afterwards. Future doses are locked.
    pub fn mark(&mut self, vaccine: &str) -> Result<AdministeredRecord, ChanjoError> {
        let idx = self
            .reconciliation
            .pending
            .iter()
            .position(|d| d.vaccine.eq_ignore_ascii_case(vaccine))
            .ok_or_else(|| self.not_pending_error(vaccine))?;

        let due = self.reconciliation.pending[idx].due_date.ok_or_else(|| {
            ChanjoError::Validation(format!("pending dose '{vaccine}' has no due date"))
        })?;

        if is_locked(due, self.today) {
            return Err(ChanjoError::DoseLocked(format!(
                "{vaccine} is due {due}; doses can only be marked once due"
            )));
        }

        let dose = self.reconciliation.pending.remove(idx);
        let record = AdministeredRecord {
            vaccine: dose.vaccine,
            due_date: due,
            source: AdministeredSource::Manual,
        };
        self.reconciliation.administered.push(record.clone());
        Ok(record)
    }

    /// Explain why a vaccine has no pending dose: already administered,
    /// or not on the schedule at all.
    fn not_pending_error(&self, vaccine: &str) -> ChanjoError {
        let administered = self
            .reconciliation
            .administered
            .iter()
            .any(|r| r.vaccine.eq_ignore_ascii_case(vaccine));
        if administered {
            return ChanjoError::Validation(format!("'{vaccine}' is already administered"));
        }
        let on_schedule = self
            .schedule
            .iter()
            .any(|d| d.vaccine.eq_ignore_ascii_case(vaccine));
        if on_schedule {
            ChanjoError::Validation(format!("'{vaccine}' has no pending dose"))
        } else {
            ChanjoError::Validation(format!("'{vaccine}' is not on the schedule"))
        }
    }
}
