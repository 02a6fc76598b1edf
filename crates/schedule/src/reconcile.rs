//! Schedule resolution and pending/administered reconciliation.

use chanjo_core::{AdministeredRecord, AdministeredSource, DoseKey};
use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::offset::due_date;
use crate::rules::ImmunizationRule;

/// One scheduled dose for a concrete baby.
///
/// `due_date` is `None` when the rule's offset spec did not parse; such
/// doses stay visible in the full schedule but never enter either
/// reconciliation partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDose {
    pub age_label: String,
    pub vaccine: String,
    pub protection_against: String,
    pub note: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl ResolvedDose {
    pub fn key(&self) -> Option<DoseKey> {
        self.due_date.map(|due| DoseKey {
            vaccine: self.vaccine.clone(),
            due_date: due,
        })
    }
}

/// Resolve every rule against a birth date, preserving table order.
///
/// The resolved set regenerates entirely on birth-date change; there is no
/// partial mutation.
pub fn resolve_schedule(rules: &[ImmunizationRule], birth: NaiveDate) -> Vec<ResolvedDose> {
    rules
        .iter()
        .map(|rule| ResolvedDose {
            age_label: rule.age_label.clone(),
            vaccine: rule.vaccine.clone(),
            protection_against: rule.protection_against.clone(),
            note: rule.note.clone(),
            due_date: due_date(rule.offset_spec(), birth),
        })
        .collect()
}

/// Result of partitioning a resolved schedule against administered history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Doses due today or later, not yet administered. Schedule order.
    pub pending: Vec<ResolvedDose>,
    /// Union of past-due inference and server-confirmed records,
    /// deduplicated by (vaccine, due date). Schedule order first, then
    /// server-only records in server order.
    pub administered: Vec<AdministeredRecord>,
}

/// Partition resolved doses into pending and administered sets.
///
/// A dose whose due date has passed is presumed administered
/// (auto-past-due) unless the server already confirms it. On a key
/// collision the server record wins: its source tag is authoritative. The
/// due date itself is part of the key, so it never differs between origins
/// for the same record.
pub fn reconcile(
    resolved: &[ResolvedDose],
    server: &[AdministeredRecord],
    today: NaiveDate,
) -> Reconciliation {
    let mut administered: IndexMap<DoseKey, AdministeredRecord> = IndexMap::new();

    for dose in resolved {
        let Some(due) = dose.due_date else { continue };
        if due < today {
            administered.insert(
                DoseKey {
                    vaccine: dose.vaccine.clone(),
                    due_date: due,
                },
                AdministeredRecord {
                    vaccine: dose.vaccine.clone(),
                    due_date: due,
                    source: AdministeredSource::AutoPastDue,
                },
            );
        }
    }

    // Server records replace the inferred entry in place (IndexMap keeps
    // the first-insertion position), so output order stays deterministic.
    for record in server {
        administered.insert(record.key(), record.clone());
    }

    let pending = resolved
        .iter()
        .filter(|dose| match dose.due_date {
            Some(due) => {
                due >= today
                    && !administered.contains_key(&DoseKey {
                        vaccine: dose.vaccine.clone(),
                        due_date: due,
                    })
            }
            None => false,
        })
        .cloned()
        .collect();

    Reconciliation {
        pending,
        administered: administered.into_values().collect(),
    }
}

/// A dose may only be marked once it is due: anything strictly after today
/// is locked.
pub fn is_locked(due: NaiveDate, today: NaiveDate) -> bool {
    due > today
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTable;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(age: &str, vaccine: &str) -> ImmunizationRule {
        ImmunizationRule::new(age, vaccine, "test")
    }

    fn server_record(vaccine: &str, due: NaiveDate) -> AdministeredRecord {
        AdministeredRecord {
            vaccine: vaccine.to_string(),
            due_date: due,
            source: AdministeredSource::ServerConfirmed,
        }
    }

    #[test]
    fn resolution_preserves_table_order() {
        let rules = vec![
            rule("6 Weeks", "OPV 1"),
            rule("Birth", "BCG"),
            rule("garbled", "Mystery"),
        ];
        let resolved = resolve_schedule(&rules, date(2024, 1, 1));
        let vaccines: Vec<_> = resolved.iter().map(|d| d.vaccine.as_str()).collect();
        assert_eq!(vaccines, vec!["OPV 1", "BCG", "Mystery"]);
        assert_eq!(resolved[0].due_date, Some(date(2024, 2, 12)));
        assert_eq!(resolved[1].due_date, Some(date(2024, 1, 1)));
        assert_eq!(resolved[2].due_date, None);
    }

    #[test]
    fn past_due_is_administered_never_pending() {
        let rules = vec![rule("6 Weeks", "OPV 1")];
        let resolved = resolve_schedule(&rules, date(2024, 1, 1));
        // Due 2024-02-12, today 2024-03-01, empty server list.
        let rec = reconcile(&resolved, &[], date(2024, 3, 1));
        assert!(rec.pending.is_empty());
        assert_eq!(rec.administered.len(), 1);
        assert_eq!(rec.administered[0].vaccine, "OPV 1");
        assert_eq!(rec.administered[0].due_date, date(2024, 2, 12));
        assert_eq!(rec.administered[0].source, AdministeredSource::AutoPastDue);
    }

    #[test]
    fn due_today_is_pending() {
        let rules = vec![rule("Birth", "BCG")];
        let resolved = resolve_schedule(&rules, date(2024, 3, 1));
        let rec = reconcile(&resolved, &[], date(2024, 3, 1));
        assert_eq!(rec.pending.len(), 1);
        assert!(rec.administered.is_empty());
    }

    #[test]
    fn server_record_wins_key_collision() {
        let rules = vec![rule("6 Weeks", "OPV 1")];
        let resolved = resolve_schedule(&rules, date(2024, 1, 1));
        let server = vec![server_record("OPV 1", date(2024, 2, 12))];
        let rec = reconcile(&resolved, &server, date(2024, 3, 1));
        assert_eq!(rec.administered.len(), 1);
        assert_eq!(
            rec.administered[0].source,
            AdministeredSource::ServerConfirmed
        );
    }

    #[test]
    fn server_record_removes_future_dose_from_pending() {
        let rules = vec![rule("6 Weeks", "OPV 1")];
        let resolved = resolve_schedule(&rules, date(2024, 1, 1));
        let server = vec![server_record("OPV 1", date(2024, 2, 12))];
        // Today is before the due date, but the server already confirms it.
        let rec = reconcile(&resolved, &server, date(2024, 2, 1));
        assert!(rec.pending.is_empty());
        assert_eq!(rec.administered.len(), 1);
    }

    #[test]
    fn server_only_records_are_kept() {
        let resolved = resolve_schedule(&[rule("Birth", "BCG")], date(2024, 3, 1));
        let server = vec![server_record("Tetanus booster", date(2023, 12, 1))];
        let rec = reconcile(&resolved, &server, date(2024, 3, 1));
        assert_eq!(rec.pending.len(), 1);
        assert_eq!(rec.administered.len(), 1);
        assert_eq!(rec.administered[0].vaccine, "Tetanus booster");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let table = RuleTable::builtin();
        let resolved = resolve_schedule(&table.rules, date(2024, 1, 1));
        let server = vec![server_record("PCV 1", date(2024, 2, 12))];
        let today = date(2024, 3, 1);
        let first = reconcile(&resolved, &server, today);
        let second = reconcile(&resolved, &server, today);
        assert_eq!(first, second);
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let table = RuleTable::builtin();
        let resolved = resolve_schedule(&table.rules, date(2024, 1, 1));
        let today = date(2024, 3, 1);
        let rec = reconcile(&resolved, &[], today);

        let dated = resolved.iter().filter(|d| d.due_date.is_some()).count();
        assert_eq!(rec.pending.len() + rec.administered.len(), dated);

        let pending_keys: Vec<_> = rec.pending.iter().filter_map(|d| d.key()).collect();
        for record in &rec.administered {
            assert!(!pending_keys.contains(&record.key()));
        }
    }

    #[test]
    fn lock_boundary_is_strictly_after_today() {
        let today = date(2024, 3, 1);
        assert!(!is_locked(date(2024, 2, 12), today));
        assert!(!is_locked(today, today));
        assert!(is_locked(date(2024, 3, 2), today));
    }
}
