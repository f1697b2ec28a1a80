//! The six login heuristics.
//!
//! Each heuristic is an independent pure function over the monitor
//! configuration, the user's **pre-update** state (history without the
//! current attempt, known sets before absorption), and the current
//! attempt. Several may fire on the same attempt; none can suppress
//! another. A heuristic that lacks the input it needs (empty
//! fingerprint, no baseline yet) degrades to "no anomaly".
//!
//! Window membership is decided by each attempt's declared timestamp.
//! All windows are trailing, ending at the current attempt, and
//! inclusive of their boundary.

use serde_json::json;

use crate::anomaly::{AlertLevel, Anomaly, AnomalyKind};
use crate::attempt::LoginAttempt;
use crate::config::MonitorConfig;
use crate::state::UserActivity;

/// Run every heuristic and collect what fires.
pub(crate) fn evaluate(
    config: &MonitorConfig,
    state: &UserActivity,
    attempt: &LoginAttempt,
) -> Vec<Anomaly> {
    [
        check_brute_force(config, state, attempt),
        check_new_device(state, attempt),
        check_new_ip(state, attempt),
        check_unusual_time(config, state, attempt),
        check_rapid_switching(config, state, attempt),
        check_impossible_travel(config, state, attempt),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// `brute_force`: failed attempts within the trailing window reach the
/// threshold, counting the current attempt if it failed.
fn check_brute_force(
    config: &MonitorConfig,
    state: &UserActivity,
    attempt: &LoginAttempt,
) -> Option<Anomaly> {
    let cutoff = attempt.timestamp.0 - config.brute_force_window();
    let prior = state
        .attempts
        .iter()
        .filter(|a| !a.success && a.timestamp.0 >= cutoff)
        .count();
    let failures = prior.saturating_add(usize::from(!attempt.success));

    if failures < config.brute_force_threshold as usize {
        return None;
    }

    Some(Anomaly::new(
        AnomalyKind::BruteForce,
        AlertLevel::Critical,
        format!(
            "{failures} failed login attempts within {} seconds",
            config.brute_force_window_secs
        ),
        json!({
            "failed_attempts": failures,
            "window_secs": config.brute_force_window_secs,
        }),
        attempt.timestamp,
    ))
}

/// `new_device`: a success from a fingerprint outside the known set.
/// Never fires without a baseline - the very first recorded login
/// establishes one instead of being judged against nothing.
fn check_new_device(state: &UserActivity, attempt: &LoginAttempt) -> Option<Anomaly> {
    if !attempt.success || attempt.device_info.is_empty() {
        return None;
    }
    if state.known_devices.is_empty() || state.known_devices.contains(&attempt.device_info) {
        return None;
    }

    Some(Anomaly::new(
        AnomalyKind::NewDevice,
        AlertLevel::Warning,
        format!("login from new device: {}", attempt.device_info),
        json!({ "device": attempt.device_info }),
        attempt.timestamp,
    ))
}

/// `new_ip`: same shape as `new_device`, over the known-IP set.
fn check_new_ip(state: &UserActivity, attempt: &LoginAttempt) -> Option<Anomaly> {
    if !attempt.success || attempt.ip_address.is_empty() {
        return None;
    }
    if state.known_ips.is_empty() || state.known_ips.contains(&attempt.ip_address) {
        return None;
    }

    Some(Anomaly::new(
        AnomalyKind::NewIp,
        AlertLevel::Info,
        format!("login from new IP address: {}", attempt.ip_address),
        json!({ "ip_address": attempt.ip_address }),
        attempt.timestamp,
    ))
}

/// `unusual_time`: with enough prior successes to form a baseline, the
/// attempt's hour-of-day is rare in the user's hour histogram.
#[allow(clippy::cast_precision_loss)]
fn check_unusual_time(
    config: &MonitorConfig,
    state: &UserActivity,
    attempt: &LoginAttempt,
) -> Option<Anomaly> {
    let sample_size = state.successes().count();
    if sample_size < config.unusual_hour_min_sample as usize {
        return None;
    }

    let hour = attempt.timestamp.hour();
    let occurrences = state
        .successes()
        .filter(|a| a.timestamp.hour() == hour)
        .count();
    let ratio = occurrences as f64 / sample_size as f64;

    if ratio >= config.unusual_hour_rarity {
        return None;
    }

    Some(Anomaly::new(
        AnomalyKind::UnusualTime,
        AlertLevel::Info,
        format!("login at unusual hour {hour:02}:00 UTC"),
        json!({
            "hour": hour,
            "occurrences": occurrences,
            "sample_size": sample_size,
        }),
        attempt.timestamp,
    ))
}

/// `rapid_session_switching`: successful logins within the trailing
/// window reach the threshold, counting the current attempt if it
/// succeeded.
fn check_rapid_switching(
    config: &MonitorConfig,
    state: &UserActivity,
    attempt: &LoginAttempt,
) -> Option<Anomaly> {
    let cutoff = attempt.timestamp.0 - config.rapid_switch_window();
    let prior = state
        .attempts
        .iter()
        .filter(|a| a.success && a.timestamp.0 >= cutoff)
        .count();
    let successes = prior.saturating_add(usize::from(attempt.success));

    if successes < config.rapid_switch_threshold as usize {
        return None;
    }

    Some(Anomaly::new(
        AnomalyKind::RapidSessionSwitching,
        AlertLevel::Warning,
        format!(
            "{successes} successful logins within {} seconds",
            config.rapid_switch_window_secs
        ),
        json!({
            "successful_logins": successes,
            "window_secs": config.rapid_switch_window_secs,
        }),
        attempt.timestamp,
    ))
}

/// `impossible_travel`: the most recent prior success (any device) is
/// within the travel window and came from a different address.
fn check_impossible_travel(
    config: &MonitorConfig,
    state: &UserActivity,
    attempt: &LoginAttempt,
) -> Option<Anomaly> {
    if !attempt.success || attempt.ip_address.is_empty() {
        return None;
    }

    let previous = state.last_success()?;
    if previous.ip_address.is_empty() || previous.ip_address == attempt.ip_address {
        return None;
    }

    let cutoff = attempt.timestamp.0 - config.travel_window();
    if previous.timestamp.0 < cutoff {
        return None;
    }

    Some(Anomaly::new(
        AnomalyKind::ImpossibleTravel,
        AlertLevel::Warning,
        format!(
            "logins from {} and {} within {} seconds",
            previous.ip_address, attempt.ip_address, config.travel_window_secs
        ),
        json!({
            "previous_ip": previous.ip_address,
            "current_ip": attempt.ip_address,
        }),
        attempt.timestamp,
    ))
}
