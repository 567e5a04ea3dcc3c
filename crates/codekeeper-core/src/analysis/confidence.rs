//! Per-response confidence estimation

use crate::agents::Agent;

use super::types::ChangeEvent;

const BASE_CONFIDENCE: f64 = 0.5;
const HIGH_SUCCESS_THRESHOLD: f64 = 0.8;
const HIGH_SUCCESS_BONUS: f64 = 0.3;
const MODERATE_SUCCESS_THRESHOLD: f64 = 0.6;
const MODERATE_SUCCESS_BONUS: f64 = 0.2;
const PATTERN_HIT_BONUS: f64 = 0.2;

/// Confidence in [0.5, 1.0] from success history and pattern-memory hits
///
/// Only one success bonus applies. The pattern bonus is flat and applies when
/// any remembered pattern key occurs inside the event's file path.
pub fn estimate_confidence(agent: &Agent, event: &ChangeEvent) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    let success_rate = agent.performance.success_rate;
    if success_rate > HIGH_SUCCESS_THRESHOLD {
        confidence += HIGH_SUCCESS_BONUS;
    } else if success_rate > MODERATE_SUCCESS_THRESHOLD {
        confidence += MODERATE_SUCCESS_BONUS;
    }

    if agent.memory.has_pattern_in_path(&event.file_path) {
        confidence += PATTERN_HIT_BONUS;
    }

    confidence.min(1.0)
}
