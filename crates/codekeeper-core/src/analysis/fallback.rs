//! Context-free suggestions
//!
//! Used when the agent store cannot be reached or a fan-out round runs past
//! its budget. Derived only from the file extension and change type; never
//! touches agent memory.

use crate::memory::file_extension;

use super::types::{ChangeEvent, Suggestion};

struct ToolingHint {
    suggestion_type: &'static str,
    description: &'static str,
    priority: u8,
}

const fn hint(suggestion_type: &'static str, description: &'static str, priority: u8) -> ToolingHint {
    ToolingHint {
        suggestion_type,
        description,
        priority,
    }
}

const TYPESCRIPT: &[ToolingHint] = &[
    hint("formatting", "Run the formatter (e.g. prettier) on the changed file", 3),
    hint("linting", "Run the linter (e.g. eslint) and fix new warnings", 2),
    hint("type-check", "Run the type checker (tsc --noEmit)", 2),
];

const JAVASCRIPT: &[ToolingHint] = &[
    hint("formatting", "Run the formatter (e.g. prettier) on the changed file", 3),
    hint("linting", "Run the linter (e.g. eslint) and fix new warnings", 2),
];

const RUST: &[ToolingHint] = &[
    hint("formatting", "Run cargo fmt", 3),
    hint("linting", "Run cargo clippy and fix new warnings", 2),
];

const PYTHON: &[ToolingHint] = &[
    hint("formatting", "Run the formatter (e.g. black) on the changed file", 3),
    hint("linting", "Run the linter (e.g. ruff) and fix new warnings", 2),
    hint("type-check", "Run the type checker (e.g. mypy)", 2),
];

const GO: &[ToolingHint] = &[
    hint("formatting", "Run gofmt", 3),
    hint("linting", "Run go vet", 2),
];

fn tooling_for(extension: &str) -> &'static [ToolingHint] {
    match extension {
        "ts" | "tsx" | "mts" | "cts" => TYPESCRIPT,
        "js" | "jsx" | "mjs" | "cjs" => JAVASCRIPT,
        "rs" => RUST,
        "py" => PYTHON,
        "go" => GO,
        _ => &[],
    }
}

fn to_suggestion(hint: &ToolingHint, file_path: &str) -> Suggestion {
    Suggestion {
        suggestion_type: hint.suggestion_type.to_string(),
        description: format!("{} ({})", hint.description, file_path),
        priority: hint.priority,
        effort: "low".to_string(),
        impact: "medium".to_string(),
    }
}

/// Suggestions for an event without consulting any agent
pub fn fallback_suggestions(event: &ChangeEvent) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = tooling_for(file_extension(&event.file_path))
        .iter()
        .map(|h| to_suggestion(h, &event.file_path))
        .collect();

    match event.change_type.as_str() {
        "function-add" => suggestions.push(to_suggestion(
            &hint("test-generation", "Add tests covering the new function", 2),
            &event.file_path,
        )),
        "file-create" => suggestions.push(to_suggestion(
            &hint("documentation", "Document the purpose of the new file", 3),
            &event.file_path,
        )),
        _ => {}
    }

    suggestions
}
