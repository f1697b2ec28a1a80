//! End-to-end login flow: attempts stream in, anomalies come out, every
//! attempt lands on the audit chain.

mod common;

use std::sync::Arc;

use common::{at, login};
use sentinel_audit::{AuditAction, AuditChain, EntryFilter};
use sentinel_core::UserId;
use sentinel_monitor::{AlertLevel, AnomalyKind, AuthMonitor};

fn setup() -> (Arc<AuditChain>, AuthMonitor) {
    let audit = Arc::new(AuditChain::in_memory());
    let monitor = AuthMonitor::new(Arc::clone(&audit));
    (audit, monitor)
}

#[test]
fn login_stream_builds_a_verifiable_chain() {
    let (audit, monitor) = setup();

    for i in 0..6 {
        monitor
            .record_login_attempt(login("alice", true, "1.1.1.1", "firefox", at(i * 3600)))
            .unwrap();
    }
    for i in 0..4 {
        monitor
            .record_login_attempt(login("bob", i % 2 == 0, "2.2.2.2", "chrome", at(i * 3600)))
            .unwrap();
    }

    let report = audit.verify_chain(None).unwrap();
    assert!(report.valid);
    assert_eq!(report.total_entries, 10);
    assert_eq!(report.last_sequence, 10);

    let counts = audit.count_actions_by_type().unwrap();
    assert_eq!(counts.get(&AuditAction::Login), Some(&10));
}

#[test]
fn brute_force_fires_on_fifth_failed_attempt() {
    let (audit, monitor) = setup();

    for i in 0..4 {
        let anomalies = monitor
            .record_login_attempt(login("alice", false, "1.1.1.1", "firefox", at(i * 60)))
            .unwrap();
        assert!(anomalies.is_empty());
    }

    let anomalies = monitor
        .record_login_attempt(login("alice", false, "1.1.1.1", "firefox", at(240)))
        .unwrap();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].kind, AnomalyKind::BruteForce);
    assert_eq!(anomalies[0].level, AlertLevel::Critical);

    // All five failures are on the chain, marked unsuccessful.
    let failures = audit
        .query(EntryFilter::default().user("alice").action(AuditAction::Login))
        .unwrap();
    assert_eq!(failures.total_matched, 5);
    assert!(failures.entries.iter().all(|e| !e.success));
}

#[test]
fn first_login_establishes_baseline_second_device_flags() {
    let (_, monitor) = setup();

    let first = monitor
        .record_login_attempt(login("alice", true, "1.1.1.1", "firefox", at(0)))
        .unwrap();
    assert!(first.is_empty());

    // New device AND new IP an hour later: both fire, neither
    // suppresses the other.
    let second = monitor
        .record_login_attempt(login("alice", true, "2.2.2.2", "safari", at(3600)))
        .unwrap();
    let kinds: Vec<AnomalyKind> = second.iter().map(|a| a.kind).collect();
    assert!(kinds.contains(&AnomalyKind::NewDevice));
    assert!(kinds.contains(&AnomalyKind::NewIp));

    let device = second
        .iter()
        .find(|a| a.kind == AnomalyKind::NewDevice)
        .unwrap();
    assert_eq!(device.details["device"], "safari");
}

#[test]
fn impossible_travel_reports_both_addresses() {
    let (_, monitor) = setup();

    monitor
        .record_login_attempt(login("alice", true, "1.1.1.1", "firefox", at(0)))
        .unwrap();
    let anomalies = monitor
        .record_login_attempt(login("alice", true, "2.2.2.2", "firefox", at(600)))
        .unwrap();

    let travel = anomalies
        .iter()
        .find(|a| a.kind == AnomalyKind::ImpossibleTravel)
        .unwrap();
    assert_eq!(travel.level, AlertLevel::Warning);
    assert_eq!(travel.details["previous_ip"], "1.1.1.1");
    assert_eq!(travel.details["current_ip"], "2.2.2.2");

    // Same pair of logins from one address: no travel anomaly.
    let (_, monitor) = setup();
    monitor
        .record_login_attempt(login("carol", true, "1.1.1.1", "firefox", at(0)))
        .unwrap();
    let anomalies = monitor
        .record_login_attempt(login("carol", true, "1.1.1.1", "firefox", at(600)))
        .unwrap();
    assert!(
        !anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::ImpossibleTravel)
    );
}

#[test]
fn clear_history_leaves_other_users_alone() {
    let (_, monitor) = setup();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    monitor
        .record_login_attempt(login("alice", true, "1.1.1.1", "firefox", at(0)))
        .unwrap();
    monitor
        .record_login_attempt(login("bob", true, "2.2.2.2", "chrome", at(0)))
        .unwrap();

    monitor.clear_history(&alice);

    assert!(monitor.known_devices(&alice).is_empty());
    assert!(monitor.known_ips(&alice).is_empty());
    assert!(monitor.login_history(&alice, 30).is_empty());
    assert_eq!(monitor.known_devices(&bob), vec!["chrome"]);
    assert_eq!(monitor.known_ips(&bob), vec!["2.2.2.2"]);
}

#[test]
fn recent_activity_feeds_reporting() {
    let (audit, monitor) = setup();

    for i in 0..5 {
        monitor
            .record_login_attempt(login("alice", true, "1.1.1.1", "firefox", at(i * 600)))
            .unwrap();
    }

    let activity = audit
        .recent_user_activity(&UserId::new("alice"), at(1200))
        .unwrap();
    assert_eq!(activity.len(), 3);
    assert!(activity.windows(2).all(|w| w[0].sequence < w[1].sequence));
}
