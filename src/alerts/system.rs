use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alerts::notifications::{AlertMessage, Delivery, Notifier};
use crate::alerts::state::{AlertLedger, reconcile};
use crate::alerts::thresholds::{Tier, TierFlags};
use crate::analysis::{StudentPercentage, compute_percentages};
use crate::error::Result;
use crate::storage::RecordStore;

/// Per-student result of one escalation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentOutcome {
    pub student_id: String,
    pub name: String,
    pub percent: f64,
    pub tiers_hit: Vec<Tier>,
    pub email: Delivery,
    pub sms: Delivery,
    /// At least one channel succeeded.
    pub processed: bool,
    pub newly_crossed: Vec<Tier>,
    /// Alert count after reconciliation, when state was written.
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EscalationReport {
    pub processed_count: usize,
    pub outcomes: Vec<StudentOutcome>,
}

/// A student at or above the first tier together with their alert state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertOverview {
    #[serde(flatten)]
    pub row: StudentPercentage,
    pub flags: TierFlags,
    pub count: u32,
}

/// Runs aggregation, classification, notification and reconciliation
/// against one record store and one notifier.
pub struct Escalator<S, N> {
    store: S,
    notifier: N,
}

impl<S: RecordStore, N: Notifier> Escalator<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_parts(self) -> (S, N) {
        (self.store, self.notifier)
    }

    pub fn compute_percentages(
        &self,
        course_code: &str,
        group: &str,
        total_hours: f64,
    ) -> Result<Vec<StudentPercentage>> {
        compute_percentages(&self.store, course_code, group, total_hours)
    }

    /// Students currently hitting at least one tier, joined with their state.
    pub fn alert_overview(
        &self,
        course_code: &str,
        group: &str,
        total_hours: f64,
    ) -> Result<Vec<AlertOverview>> {
        let computed = self.compute_percentages(course_code, group, total_hours)?;
        let ledger = AlertLedger::load(&self.store)?;

        Ok(computed
            .into_iter()
            .filter(|row| !row.tiers_hit.is_empty())
            .map(|row| {
                let state = ledger.get(&row.student_id, course_code, group);
                AlertOverview {
                    flags: state.map(|s| s.flags).unwrap_or_default(),
                    count: state.map_or(0, |s| s.count),
                    row,
                }
            })
            .collect())
    }

    /// Notify the selected students and reconcile state for those reached.
    ///
    /// Selected ids not enrolled in (course_code, group) are ignored. A
    /// student whose channels all fail keeps their prior state so the next
    /// run retries from the same point. State is persisted after each
    /// processed student.
    pub fn process_alerts(
        &mut self,
        course_code: &str,
        group: &str,
        total_hours: f64,
        selected_student_ids: &[String],
    ) -> Result<EscalationReport> {
        let computed = self.compute_percentages(course_code, group, total_hours)?;
        let selected: HashSet<&str> = selected_student_ids.iter().map(String::as_str).collect();
        let mut ledger = AlertLedger::load(&self.store)?;
        let mut report = EscalationReport::default();

        for row in computed
            .iter()
            .filter(|row| selected.contains(row.student_id.as_str()))
        {
            let message = AlertMessage::build(&row.name, course_code, row.percent);
            let email = self
                .notifier
                .send_email(&row.email, &message.subject, &message.email_body);
            let sms = self.notifier.send_sms(&row.phone, &message.sms_text);
            let processed = email.success || sms.success;

            let mut outcome = StudentOutcome {
                student_id: row.student_id.clone(),
                name: row.name.clone(),
                percent: row.percent,
                tiers_hit: row.tiers_hit.clone(),
                email,
                sms,
                processed,
                newly_crossed: Vec::new(),
                count: None,
            };

            if processed {
                report.processed_count += 1;
                let prior = ledger.get(&row.student_id, course_code, group);
                match reconcile(row, prior) {
                    Some(reconciled) => {
                        debug!(
                            student_id = %row.student_id,
                            count = reconciled.state.count,
                            newly_crossed = ?reconciled.newly_crossed,
                            "reconciled alert state"
                        );
                        outcome.newly_crossed = reconciled.newly_crossed;
                        outcome.count = Some(reconciled.state.count);
                        ledger.upsert(reconciled.state);
                        ledger.persist(&mut self.store)?;
                    }
                    None => debug!(student_id = %row.student_id, "below first tier, state not kept"),
                }
            } else {
                warn!(
                    student_id = %row.student_id,
                    email = %outcome.email.detail,
                    sms = %outcome.sms.detail,
                    "all channels failed, state left for retry"
                );
            }

            report.outcomes.push(outcome);
        }

        info!(
            course_code,
            group,
            selected = selected.len(),
            processed = report.processed_count,
            "alerts processed"
        );
        Ok(report)
    }
}
