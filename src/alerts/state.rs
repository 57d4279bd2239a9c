use serde::Serialize;
use tracing::debug;

use crate::alerts::thresholds::{Tier, TierFlags};
use crate::analysis::{StudentPercentage, format_percent};
use crate::error::{AttendanceError, Result};
use crate::storage::{RecordStore, RecordStoreExt, Row, Table, TableRecord};

const SENT: &str = "yes";

/// Persisted escalation state for one (student_id, course_code, group).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertState {
    pub student_id: String,
    pub name: String,
    pub course_code: String,
    pub group: String,
    /// Percent at the last reconciliation; a snapshot, not a ratchet.
    pub percent: f64,
    /// Number of processing runs reconciled for this key.
    pub count: u32,
    pub flags: TierFlags,
}

impl AlertState {
    pub fn matches(&self, student_id: &str, course_code: &str, group: &str) -> bool {
        self.student_id == student_id && self.course_code == course_code && self.group == group
    }
}

fn parse_flag(field: &'static str, raw: &str) -> Result<bool> {
    match raw.trim() {
        "" => Ok(false),
        value if value.eq_ignore_ascii_case(SENT) => Ok(true),
        _ => Err(AttendanceError::data_format(
            field,
            raw,
            "expected \"yes\" or empty",
        )),
    }
}

fn flag_field(set: bool) -> String {
    if set { SENT.to_string() } else { String::new() }
}

impl TableRecord for AlertState {
    const TABLE: Table = Table::AlertState;

    fn from_row(row: &[String]) -> Result<Self> {
        Self::TABLE.check_width(row)?;

        let percent: f64 = row[4]
            .trim()
            .parse()
            .map_err(|e| AttendanceError::data_format("percent", &row[4], e))?;
        if !percent.is_finite() {
            return Err(AttendanceError::data_format(
                "percent",
                &row[4],
                "must be finite",
            ));
        }
        let count: u32 = row[5]
            .trim()
            .parse()
            .map_err(|e| AttendanceError::data_format("count", &row[5], e))?;

        Ok(Self {
            student_id: row[0].clone(),
            name: row[1].clone(),
            course_code: row[2].clone(),
            group: row[3].clone(),
            percent,
            count,
            flags: TierFlags {
                sent7: parse_flag("sent7", &row[6])?,
                sent10: parse_flag("sent10", &row[7])?,
                sent15: parse_flag("sent15", &row[8])?,
            },
        })
    }

    fn to_row(&self) -> Row {
        vec![
            self.student_id.clone(),
            self.name.clone(),
            self.course_code.clone(),
            self.group.clone(),
            format_percent(self.percent),
            self.count.to_string(),
            flag_field(self.flags.sent7),
            flag_field(self.flags.sent10),
            flag_field(self.flags.sent15),
        ]
    }
}

/// Result of reconciling one computed row against its prior state.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub state: AlertState,
    /// Tiers hit now whose flag was previously unset, ascending.
    pub newly_crossed: Vec<Tier>,
}

/// Compare a freshly computed row with the stored state for its key.
///
/// Returns `None` when there is no prior state and no tier is hit: such keys
/// are never persisted. Otherwise the count advances by exactly one, the
/// percent is overwritten, and flags for newly crossed tiers are set. Flags
/// already set stay set even when the percent has since dropped.
pub fn reconcile(row: &StudentPercentage, prior: Option<&AlertState>) -> Option<Reconciliation> {
    match prior {
        None if row.tiers_hit.is_empty() => None,
        None => Some(Reconciliation {
            state: AlertState {
                student_id: row.student_id.clone(),
                name: row.name.clone(),
                course_code: row.course_code.clone(),
                group: row.group.clone(),
                percent: row.percent,
                count: 1,
                flags: TierFlags::from_tiers(&row.tiers_hit),
            },
            newly_crossed: row.tiers_hit.clone(),
        }),
        Some(prior) => {
            let newly_crossed: Vec<Tier> = row
                .tiers_hit
                .iter()
                .copied()
                .filter(|tier| !prior.flags.is_set(*tier))
                .collect();

            let mut state = prior.clone();
            state.percent = row.percent;
            state.count = prior.count.saturating_add(1);
            for tier in &newly_crossed {
                state.flags.set(*tier);
            }

            Some(Reconciliation {
                state,
                newly_crossed,
            })
        }
    }
}

/// In-memory view of the AlertState table for one escalation run.
#[derive(Debug, Clone, Default)]
pub struct AlertLedger {
    states: Vec<AlertState>,
}

impl AlertLedger {
    pub fn load<S: RecordStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            states: store.load_records()?,
        })
    }

    pub fn get(&self, student_id: &str, course_code: &str, group: &str) -> Option<&AlertState> {
        self.states
            .iter()
            .find(|s| s.matches(student_id, course_code, group))
    }

    /// Replace the state with the same key in place, or append it.
    pub fn upsert(&mut self, state: AlertState) {
        match self
            .states
            .iter_mut()
            .find(|s| s.matches(&state.student_id, &state.course_code, &state.group))
        {
            Some(existing) => *existing = state,
            None => self.states.push(state),
        }
    }

    pub fn states(&self) -> &[AlertState] {
        &self.states
    }

    pub fn persist<S: RecordStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.replace_records(&self.states)?;
        debug!(states = self.states.len(), "persisted alert state");
        Ok(())
    }
}
