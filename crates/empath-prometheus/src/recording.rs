// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. With no recorder installed every call is a no-op.

use metrics::{describe_counter, describe_histogram};

/// Register all Empath metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "empath_frames_total",
        "Frames processed, by outcome (face, no_face, decode_error)"
    );
    describe_counter!(
        "empath_batches_total",
        "Frame batches processed, by outcome (accepted, rejected)"
    );
    describe_counter!(
        "empath_turns_total",
        "Chat turns completed, by outcome (reply, clear, farewell)"
    );
    describe_counter!(
        "empath_collaborator_failures_total",
        "Failed calls to outbound collaborators, by collaborator"
    );
    describe_histogram!(
        "empath_completion_latency_seconds",
        "Text-generation latency in seconds"
    );
}

/// Record one processed frame.
pub fn record_frame(outcome: &'static str) {
    metrics::counter!("empath_frames_total", "outcome" => outcome).increment(1);
}

/// Record one processed batch.
pub fn record_batch(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    metrics::counter!("empath_batches_total", "outcome" => outcome).increment(1);
}

/// Record one completed chat turn.
pub fn record_turn(outcome: &'static str) {
    metrics::counter!("empath_turns_total", "outcome" => outcome).increment(1);
}

/// Record a failed collaborator call.
pub fn record_collaborator_failure(collaborator: &'static str) {
    metrics::counter!("empath_collaborator_failures_total", "collaborator" => collaborator)
        .increment(1);
}

/// Record text-generation latency.
pub fn record_completion_latency(seconds: f64) {
    metrics::histogram!("empath_completion_latency_seconds").record(seconds);
}
