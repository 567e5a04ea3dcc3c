//! Name-keyed behavior table
//!
//! Known agent names carry a fixed analysis template and specification.
//! Every other name falls back to generic, capability-derived text.

use super::types::AgentSpecification;

/// Static behavior profile for a recognized agent name
#[derive(Debug)]
pub struct AgentProfile {
    pub name: &'static str,
    /// Analysis text; `{path}` and `{change_type}` are substituted
    pub analysis_template: &'static str,
    pub analysis_approach: &'static str,
    pub improvement_strategies: &'static [&'static str],
    pub communication_style: &'static str,
    pub learning_approach: &'static str,
}

static PROFILES: &[AgentProfile] = &[
    AgentProfile {
        name: "SecuritySentinel",
        analysis_template: "Security review of {path}: checked the {change_type} change for injection points, unvalidated input and credential exposure.",
        analysis_approach: "Traces untrusted input from entry points through validation and authentication boundaries.",
        improvement_strategies: &[
            "Validate and sanitize every external input",
            "Keep secrets out of source and logs",
            "Enforce least privilege on new endpoints",
        ],
        communication_style: "Direct and severity-ranked; critical findings first.",
        learning_approach: "Remembers which files repeatedly touch auth and validation code.",
    },
    AgentProfile {
        name: "PerformanceOptimizer",
        analysis_template: "Performance pass on {path}: looked for hot loops, redundant work and blocking calls introduced by the {change_type} change.",
        analysis_approach: "Estimates algorithmic cost and flags allocations or I/O on hot paths.",
        improvement_strategies: &[
            "Cache repeated computations",
            "Move blocking I/O off request paths",
            "Batch small queries",
        ],
        communication_style: "Quantitative where possible, with before/after expectations.",
        learning_approach: "Tracks which modules keep reappearing in performance-sensitive changes.",
    },
    AgentProfile {
        name: "CodeQualityGuardian",
        analysis_template: "Quality review of {path}: assessed readability, duplication and naming after the {change_type} change.",
        analysis_approach: "Reads the change for complexity, duplication and consistency with nearby code.",
        improvement_strategies: &[
            "Extract duplicated logic",
            "Shorten long functions",
            "Align naming with the surrounding module",
        ],
        communication_style: "Constructive, one concrete refactoring per finding.",
        learning_approach: "Learns the project's recurring style deviations.",
    },
    AgentProfile {
        name: "TestArchitect",
        analysis_template: "Test coverage check for {path}: identified behavior from the {change_type} change that lacks tests.",
        analysis_approach: "Maps new or changed behavior to existing tests and finds the gaps.",
        improvement_strategies: &[
            "Add tests for new branches",
            "Cover error paths",
            "Prefer behavior-level assertions",
        ],
        communication_style: "Lists missing cases as ready-to-write test names.",
        learning_approach: "Remembers which change types usually arrive without tests.",
    },
    AgentProfile {
        name: "DocumentationCurator",
        analysis_template: "Documentation check for {path}: verified that public surface touched by the {change_type} change is described.",
        analysis_approach: "Compares changed public items against their doc comments and guides.",
        improvement_strategies: &[
            "Document new public items",
            "Update examples after signature changes",
            "Keep the changelog current",
        ],
        communication_style: "Brief, points at the exact item needing docs.",
        learning_approach: "Notes which areas drift from their documentation.",
    },
    AgentProfile {
        name: "ArchitectureAdvisor",
        analysis_template: "Architecture review of {path}: checked layering and dependency direction after the {change_type} change.",
        analysis_approach: "Checks module boundaries and dependency direction against the detected architecture.",
        improvement_strategies: &[
            "Keep domain code free of infrastructure imports",
            "Introduce seams before adding a second implementation",
            "Split modules that mix responsibilities",
        ],
        communication_style: "Explains the boundary at stake and the smallest fix.",
        learning_approach: "Learns which boundaries the project crosses most often.",
    },
    AgentProfile {
        name: "DependencyWarden",
        analysis_template: "Dependency audit of {path}: reviewed added or updated packages from the {change_type} change.",
        analysis_approach: "Inspects manifest changes for version drift, duplicates and license issues.",
        improvement_strategies: &[
            "Pin versions for reproducible builds",
            "Remove unused dependencies",
            "Prefer maintained packages",
        ],
        communication_style: "Package-by-package verdicts.",
        learning_approach: "Remembers the project's preferred packages.",
    },
    AgentProfile {
        name: "AccessibilityChampion",
        analysis_template: "Accessibility review of {path}: checked semantics, labels and keyboard flow after the {change_type} change.",
        analysis_approach: "Audits markup and components for semantic structure and assistive technology support.",
        improvement_strategies: &[
            "Label interactive elements",
            "Preserve focus order",
            "Meet contrast requirements",
        ],
        communication_style: "Cites the affected element and who is impacted.",
        learning_approach: "Tracks components that regress repeatedly.",
    },
];

/// Look up the profile for an agent name
pub fn lookup(name: &str) -> Option<&'static AgentProfile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// Names with a dedicated profile
pub fn known_names() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|p| p.name)
}

/// Analysis text for an agent responding to a change
pub fn analysis_text(name: &str, role: &str, file_path: &str, change_type: &str) -> String {
    match lookup(name) {
        Some(profile) => profile
            .analysis_template
            .replace("{path}", file_path)
            .replace("{change_type}", change_type),
        None => format!("{} analyzed {} for {} improvements.", name, file_path, role),
    }
}

/// Specification block for a newly created agent
pub fn specification_for(name: &str, capabilities: &[String]) -> AgentSpecification {
    match lookup(name) {
        Some(profile) => AgentSpecification {
            analysis_approach: profile.analysis_approach.to_string(),
            improvement_strategies: profile
                .improvement_strategies
                .iter()
                .map(|s| s.to_string())
                .collect(),
            communication_style: profile.communication_style.to_string(),
            learning_approach: profile.learning_approach.to_string(),
        },
        None => generic_specification(capabilities),
    }
}

fn generic_specification(capabilities: &[String]) -> AgentSpecification {
    let focus = if capabilities.is_empty() {
        "general code health".to_string()
    } else {
        capabilities
            .iter()
            .map(|c| humanize(c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    AgentSpecification {
        analysis_approach: format!("Examines each matching change with a focus on {}.", focus),
        improvement_strategies: capabilities
            .iter()
            .map(|c| format!("Apply {} where the change warrants it", humanize(c)))
            .collect(),
        communication_style: "Concise, one suggestion per capability.".to_string(),
        learning_approach: "Counts recurring change patterns per file type.".to_string(),
    }
}

/// Turn a capability label such as `vulnerability-scanning` into prose
pub fn humanize(label: &str) -> String {
    label.replace(['-', '_'], " ")
}
