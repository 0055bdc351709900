use crate::core::provider::DnsProvider;
use crate::core::record::RecordRef;
use crate::error::Error;
use std::collections::BTreeSet;
use std::net::IpAddr;
use tracing::{info, warn};

/// One slot of a reconciliation plan, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOp {
    /// Record already holds the desired IP; no network call.
    Keep(RecordRef),
    /// Record exists but holds a different IP; one update call.
    Update { record: RecordRef, new_ip: IpAddr },
    /// More desired IPs than records; one create call.
    Create { ip: IpAddr },
    /// More records than desired IPs; one delete call.
    Delete { record: RecordRef },
}

/// Ordered set of operations for one reconciliation pass. Derived from the
/// desired set and the known records, never persisted.
#[derive(Debug, Default)]
pub struct Plan {
    pub ops: Vec<PlanOp>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, PlanOp::Keep(_)))
    }

    pub fn call_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| !matches!(op, PlanOp::Keep(_)))
            .count()
    }
}

/// The operation that failed, with enough context to name the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailedOp {
    Update { id: String, ip: IpAddr },
    Create { ip: IpAddr },
    Delete { id: String },
}

#[derive(Debug)]
pub struct Failure {
    pub op: FailedOp,
    pub error: Error,
}

/// Result of one pass: the record list to persist plus every per-operation
/// failure. The record list never drops a record that still exists remotely.
#[derive(Debug)]
pub struct Outcome {
    pub records: Vec<RecordRef>,
    pub failures: Vec<Failure>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pairs the desired IPs against the known records index-by-index. Pairing
/// positionally bounds the remote calls to max(n, m), one per slot; record
/// identity is opaque to the desired set, so which id ends up holding which
/// IP does not matter. Determinism comes from sorting the desired set by
/// textual value and from the persisted order of `existing`.
pub fn plan(desired: &BTreeSet<IpAddr>, existing: &[RecordRef]) -> Plan {
    let mut desired: Vec<IpAddr> = desired.iter().copied().collect();
    desired.sort_by(|a, b| a.to_string().cmp(&b.to_string()));

    let n = desired.len();
    let m = existing.len();
    let mut ops = Vec::with_capacity(n.max(m));

    for i in 0..n.min(m) {
        if existing[i].ip == desired[i] {
            ops.push(PlanOp::Keep(existing[i].clone()));
        } else {
            ops.push(PlanOp::Update {
                record: existing[i].clone(),
                new_ip: desired[i],
            });
        }
    }
    for &ip in &desired[n.min(m)..] {
        ops.push(PlanOp::Create { ip });
    }
    for record in &existing[n.min(m)..] {
        ops.push(PlanOp::Delete {
            record: record.clone(),
        });
    }

    Plan { ops }
}

/// Executes a plan strictly sequentially, one blocking round-trip per slot.
/// A failed slot is recorded and the pass moves on to the next; failure
/// handling keeps the record list truthful about what exists remotely:
/// a failed update or delete keeps the old record, a failed create adds
/// nothing.
pub async fn execute(provider: &dyn DnsProvider, plan: Plan) -> Outcome {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for op in plan.ops {
        match op {
            PlanOp::Keep(record) => records.push(record),
            PlanOp::Update { record, new_ip } => {
                match provider.update_record(&record.id, new_ip).await {
                    Ok(()) => {
                        info!(id = %record.id, old = %record.ip, new = %new_ip, "Updated record");
                        records.push(RecordRef::new(record.id, new_ip));
                    }
                    Err(error) => {
                        warn!(id = %record.id, %error, "Update failed; keeping old record");
                        failures.push(Failure {
                            op: FailedOp::Update {
                                id: record.id.clone(),
                                ip: new_ip,
                            },
                            error,
                        });
                        records.push(record);
                    }
                }
            }
            PlanOp::Create { ip } => match provider.create_record(ip).await {
                Ok(id) => {
                    info!(%id, %ip, "Created record");
                    records.push(RecordRef::new(id, ip));
                }
                Err(error) => {
                    warn!(%ip, %error, "Create failed; IP not represented this pass");
                    failures.push(Failure {
                        op: FailedOp::Create { ip },
                        error,
                    });
                }
            },
            PlanOp::Delete { record } => match provider.delete_record(&record.id).await {
                Ok(()) => {
                    info!(id = %record.id, ip = %record.ip, "Deleted record");
                }
                Err(error) => {
                    warn!(id = %record.id, %error, "Delete failed; keeping record");
                    failures.push(Failure {
                        op: FailedOp::Delete {
                            id: record.id.clone(),
                        },
                        error,
                    });
                    records.push(record);
                }
            },
        }
    }

    Outcome { records, failures }
}

/// Plans and executes one full pass.
pub async fn reconcile(
    provider: &dyn DnsProvider,
    desired: &BTreeSet<IpAddr>,
    existing: &[RecordRef],
) -> Outcome {
    let plan = plan(desired, existing);
    if plan.is_noop() {
        info!("All {} records already match; nothing to do", existing.len());
    } else {
        info!(calls = plan.call_count(), "Executing reconciliation plan");
    }
    execute(provider, plan).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::MockDnsProvider;
    use mockall::predicate::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn desired(ips: &[&str]) -> BTreeSet<IpAddr> {
        ips.iter().map(|s| ip(s)).collect()
    }

    fn rec(id: &str, addr: &str) -> RecordRef {
        RecordRef::new(id, ip(addr))
    }

    #[test]
    fn test_plan_noop_when_all_match() {
        let d = desired(&["1.1.1.1", "2.2.2.2"]);
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        let plan = plan(&d, &e);
        assert!(plan.is_noop());
        assert_eq!(plan.call_count(), 0);
        assert_eq!(plan.ops.len(), 2);
    }

    #[test]
    fn test_plan_all_creates_when_no_existing() {
        let d = desired(&["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
        let plan = plan(&d, &[]);
        assert_eq!(plan.call_count(), 3);
        assert!(plan.ops.iter().all(|op| matches!(op, PlanOp::Create { .. })));
    }

    #[test]
    fn test_plan_all_deletes_when_no_desired() {
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        let plan = plan(&BTreeSet::new(), &e);
        assert_eq!(plan.call_count(), 2);
        assert!(plan.ops.iter().all(|op| matches!(op, PlanOp::Delete { .. })));
    }

    #[test]
    fn test_plan_pairs_in_textual_order() {
        // BTreeSet orders IpAddr numerically; the plan must pair by the
        // textual sort of the literals instead.
        let d = desired(&["10.0.0.2", "2.2.2.2"]);
        let e = vec![rec("a", "10.0.0.2"), rec("b", "2.2.2.2")];
        let plan = plan(&d, &e);
        // "10.0.0.2" < "2.2.2.2" textually, so both slots line up.
        assert!(plan.is_noop());
    }

    #[test]
    fn test_plan_mixed_update_and_delete() {
        let d = desired(&["3.3.3.3"]);
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        let plan = plan(&d, &e);
        assert_eq!(
            plan.ops,
            vec![
                PlanOp::Update {
                    record: rec("a", "1.1.1.1"),
                    new_ip: ip("3.3.3.3"),
                },
                PlanOp::Delete {
                    record: rec("b", "2.2.2.2"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_reconcile_noop_issues_no_calls() {
        let d = desired(&["1.1.1.1", "2.2.2.2"]);
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        // No expectations set: any call would panic the mock.
        let provider = MockDnsProvider::new();

        let outcome = reconcile(&provider, &d, &e).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.records, e);
    }

    #[tokio::test]
    async fn test_reconcile_creates_for_surplus_desired() {
        let d = desired(&["1.1.1.1", "2.2.2.2"]);
        let e = vec![rec("a", "1.1.1.1")];
        let mut provider = MockDnsProvider::new();
        provider
            .expect_create_record()
            .with(eq(ip("2.2.2.2")))
            .times(1)
            .returning(|_| Ok("new-id".to_string()));

        let outcome = reconcile(&provider, &d, &e).await;
        assert!(outcome.is_success());
        assert_eq!(
            outcome.records,
            vec![rec("a", "1.1.1.1"), rec("new-id", "2.2.2.2")]
        );
    }

    #[tokio::test]
    async fn test_reconcile_update_and_delete_for_shrinking_set() {
        let d = desired(&["3.3.3.3"]);
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        let mut provider = MockDnsProvider::new();
        provider
            .expect_update_record()
            .with(eq("a"), eq(ip("3.3.3.3")))
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_delete_record()
            .with(eq("b"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = reconcile(&provider, &d, &e).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.records, vec![rec("a", "3.3.3.3")]);
    }

    #[tokio::test]
    async fn test_reconcile_empty_existing_creates_all() {
        let d = desired(&["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
        let mut provider = MockDnsProvider::new();
        let mut seq = 0;
        provider.expect_create_record().times(3).returning(move |_| {
            seq += 1;
            Ok(format!("id-{seq}"))
        });

        let outcome = reconcile(&provider, &d, &[]).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.records.len(), 3);
        // Slots execute in textual order of the desired IPs.
        assert_eq!(outcome.records[0], rec("id-1", "1.1.1.1"));
        assert_eq!(outcome.records[2], rec("id-3", "3.3.3.3"));
    }

    #[tokio::test]
    async fn test_update_failure_keeps_old_record() {
        let d = desired(&["9.9.9.9"]);
        let e = vec![rec("a", "1.1.1.1")];
        let mut provider = MockDnsProvider::new();
        provider
            .expect_update_record()
            .times(1)
            .returning(|_, _| Err(Error::Provider("500 - boom".to_string())));

        let outcome = reconcile(&provider, &d, &e).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.records, vec![rec("a", "1.1.1.1")]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures[0].op,
            FailedOp::Update {
                id: "a".to_string(),
                ip: ip("9.9.9.9"),
            }
        );
    }

    #[tokio::test]
    async fn test_create_failure_leaves_no_placeholder() {
        let d = desired(&["1.1.1.1", "2.2.2.2"]);
        let e = vec![rec("a", "1.1.1.1")];
        let mut provider = MockDnsProvider::new();
        provider
            .expect_create_record()
            .times(1)
            .returning(|_| Err(Error::Provider("429 - rate limited".to_string())));

        let outcome = reconcile(&provider, &d, &e).await;
        assert_eq!(outcome.records, vec![rec("a", "1.1.1.1")]);
        assert_eq!(
            outcome.failures[0].op,
            FailedOp::Create { ip: ip("2.2.2.2") }
        );
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_record_in_state() {
        let d = desired(&["1.1.1.1"]);
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        let mut provider = MockDnsProvider::new();
        provider
            .expect_delete_record()
            .times(1)
            .returning(|_| Err(Error::Provider("timeout".to_string())));

        let outcome = reconcile(&provider, &d, &e).await;
        // The remote record still exists, so it must stay in the state.
        assert_eq!(
            outcome.records,
            vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")]
        );
        assert_eq!(
            outcome.failures[0].op,
            FailedOp::Delete {
                id: "b".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_earlier_failure_does_not_block_later_slots() {
        let d = desired(&["5.5.5.5", "6.6.6.6"]);
        let e = vec![rec("a", "1.1.1.1"), rec("b", "2.2.2.2")];
        let mut provider = MockDnsProvider::new();
        provider
            .expect_update_record()
            .with(eq("a"), eq(ip("5.5.5.5")))
            .times(1)
            .returning(|_, _| Err(Error::Provider("503".to_string())));
        provider
            .expect_update_record()
            .with(eq("b"), eq(ip("6.6.6.6")))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = reconcile(&provider, &d, &e).await;
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.records,
            vec![rec("a", "1.1.1.1"), rec("b", "6.6.6.6")]
        );
    }
}
