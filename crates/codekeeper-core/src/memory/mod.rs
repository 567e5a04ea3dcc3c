//! Pattern memory
//!
//! Each agent keeps one entry per pattern key (`<changeType>_<extension>`).
//! The first observation creates the entry with the response's confidence;
//! every later observation bumps the frequency and refreshes last-seen but
//! never re-scores confidence. Nothing here decays or prunes entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{Agent, AgentMemory, ContextEntry};

/// Extension used when the file path has none
pub const UNKNOWN_EXTENSION: &str = "unknown";

/// One recognized change pattern for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMemory {
    pub pattern_key: String,
    pub frequency: u32,
    /// Confidence of the response that first recorded the pattern
    pub confidence: f64,
    pub examples: Vec<String>,
    pub last_seen: DateTime<Utc>,
}

/// Substring after the last `.` of the path, or `unknown`
pub fn file_extension(file_path: &str) -> &str {
    match file_path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => UNKNOWN_EXTENSION,
    }
}

/// Memory index for a change type and file path
pub fn pattern_key(change_type: &str, file_path: &str) -> String {
    format!("{}_{}", change_type, file_extension(file_path))
}

/// Side effects of one agent responding to one event
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryUpdate {
    pub pattern_key: String,
    pub file_path: String,
    pub confidence: f64,
    pub observed_at: DateTime<Utc>,
    pub example_cap: usize,
    /// `last_<changeType>`
    pub context_key: String,
    pub context: ContextEntry,
}

impl MemoryUpdate {
    pub fn new(
        change_type: &str,
        file_path: &str,
        confidence: f64,
        analysis: &str,
        observed_at: DateTime<Utc>,
        example_cap: usize,
    ) -> Self {
        Self {
            pattern_key: pattern_key(change_type, file_path),
            file_path: file_path.to_string(),
            confidence,
            observed_at,
            example_cap,
            context_key: Agent::context_key(change_type),
            context: ContextEntry {
                file_path: file_path.to_string(),
                timestamp: observed_at,
                analysis: analysis.to_string(),
            },
        }
    }
}

impl AgentMemory {
    /// Apply an update in place, keeping patterns ordered most recent first
    pub fn apply(&mut self, update: &MemoryUpdate) {
        match self
            .patterns
            .iter()
            .position(|p| p.pattern_key == update.pattern_key)
        {
            Some(index) => {
                let mut entry = self.patterns.remove(index);
                entry.frequency += 1;
                entry.last_seen = update.observed_at;
                if entry.examples.len() < update.example_cap {
                    entry.examples.push(update.file_path.clone());
                }
                self.patterns.insert(0, entry);
            }
            None => {
                self.patterns.insert(
                    0,
                    PatternMemory {
                        pattern_key: update.pattern_key.clone(),
                        frequency: 1,
                        confidence: update.confidence,
                        examples: vec![update.file_path.clone()],
                        last_seen: update.observed_at,
                    },
                );
            }
        }

        self.context
            .insert(update.context_key.clone(), update.context.clone());
    }

    /// Whether any remembered pattern key occurs inside the file path
    pub fn has_pattern_in_path(&self, file_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| file_path.contains(&p.pattern_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn update_at(change_type: &str, path: &str, confidence: f64, at: DateTime<Utc>) -> MemoryUpdate {
        MemoryUpdate::new(change_type, path, confidence, "analysis", at, 5)
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("/utils/x.ts"), "ts");
        assert_eq!(file_extension("/api/login.test.tsx"), "tsx");
        assert_eq!(file_extension("Makefile"), "unknown");
        assert_eq!(file_extension("/src/trailing."), "unknown");
        assert_eq!(file_extension(""), "unknown");
    }

    #[test]
    fn test_pattern_key_is_deterministic() {
        let a = pattern_key("refactor", "/utils/x.ts");
        let b = pattern_key("refactor", "/utils/x.ts");
        assert_eq!(a, "refactor_ts");
        assert_eq!(a, b);
        assert_eq!(pattern_key("file-create", "Dockerfile"), "file-create_unknown");
    }

    #[test]
    fn test_first_observation_creates_entry() {
        let mut memory = AgentMemory::default();
        let now = Utc::now();
        memory.apply(&update_at("refactor", "/utils/x.ts", 0.7, now));

        assert_eq!(memory.patterns.len(), 1);
        let entry = &memory.patterns[0];
        assert_eq!(entry.pattern_key, "refactor_ts");
        assert_eq!(entry.frequency, 1);
        assert_eq!(entry.confidence, 0.7);
        assert_eq!(entry.examples, vec!["/utils/x.ts".to_string()]);
        assert_eq!(entry.last_seen, now);
    }

    #[test]
    fn test_repeat_observation_increments_without_rescoring() {
        let mut memory = AgentMemory::default();
        let first = Utc::now();
        let second = first + Duration::seconds(5);

        memory.apply(&update_at("refactor", "/utils/x.ts", 0.5, first));
        memory.apply(&update_at("refactor", "/utils/y.ts", 0.9, second));

        assert_eq!(memory.patterns.len(), 1);
        let entry = &memory.patterns[0];
        assert_eq!(entry.frequency, 2);
        assert_eq!(entry.confidence, 0.5);
        assert_eq!(entry.last_seen, second);
        assert_eq!(entry.examples.len(), 2);
    }

    #[test]
    fn test_examples_are_capped() {
        let mut memory = AgentMemory::default();
        let now = Utc::now();
        for i in 0..8 {
            let path = format!("/src/file{}.rs", i);
            memory.apply(&update_at("refactor", &path, 0.5, now));
        }

        let entry = &memory.patterns[0];
        assert_eq!(entry.frequency, 8);
        assert_eq!(entry.examples.len(), 5);
        assert_eq!(entry.examples[0], "/src/file0.rs");
    }

    #[test]
    fn test_patterns_ordered_by_recency() {
        let mut memory = AgentMemory::default();
        let t0 = Utc::now();

        memory.apply(&update_at("refactor", "/a.ts", 0.5, t0));
        memory.apply(&update_at("file-create", "/b.rs", 0.5, t0 + Duration::seconds(1)));
        memory.apply(&update_at("refactor", "/c.ts", 0.5, t0 + Duration::seconds(2)));

        let keys: Vec<_> = memory.patterns.iter().map(|p| p.pattern_key.as_str()).collect();
        assert_eq!(keys, vec!["refactor_ts", "file-create_rs"]);
    }

    #[test]
    fn test_context_overwritten_per_change_type() {
        let mut memory = AgentMemory::default();
        let now = Utc::now();

        memory.apply(&update_at("refactor", "/a.ts", 0.5, now));
        memory.apply(&update_at("refactor", "/b.ts", 0.5, now));
        memory.apply(&update_at("file-create", "/c.ts", 0.5, now));

        assert_eq!(memory.context.len(), 2);
        assert_eq!(memory.context["last_refactor"].file_path, "/b.ts");
        assert_eq!(memory.context["last_file-create"].file_path, "/c.ts");
    }

    #[test]
    fn test_has_pattern_in_path_is_substring_match() {
        let mut memory = AgentMemory::default();
        assert!(!memory.has_pattern_in_path("/refactor_ts/x.ts"));

        memory.apply(&update_at("refactor", "/utils/x.ts", 0.5, Utc::now()));
        assert!(memory.has_pattern_in_path("/generated/refactor_ts/x.ts"));
        assert!(!memory.has_pattern_in_path("/utils/x.ts"));
    }
}
