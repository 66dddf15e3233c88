//! Build command detection: first matching manifest wins, fixed order.

use crate::model::BuildCommands;
use std::path::Path;

fn makefile_targets(text: &str) -> Vec<String> {
    let mut targets = Vec::new();
    for line in text.lines() {
        if line.starts_with(char::is_whitespace) || line.starts_with('#') || line.starts_with('.') {
            continue;
        }
        if let Some((name, _)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() && !name.contains(' ') {
                targets.push(name.to_string());
            }
        }
    }
    targets
}

fn first_present<'a>(targets: &[String], candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| targets.iter().any(|t| t == c))
}

fn from_makefile(text: &str) -> BuildCommands {
    let targets = makefile_targets(text);
    BuildCommands {
        build: first_present(&targets, &["build", "all"]).map(|t| format!("make {t}")),
        test: first_present(&targets, &["test"]).map(|t| format!("make {t}")),
        test_full: first_present(&targets, &["test-all", "test-full", "test"]).map(|t| format!("make {t}")),
    }
}

fn from_package_json(text: &str) -> BuildCommands {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return BuildCommands::default();
    };
    let scripts = value.get("scripts").and_then(|s| s.as_object());
    let has = |name: &str| scripts.map(|s| s.contains_key(name)).unwrap_or(false);
    BuildCommands {
        build: has("build").then(|| "npm run build".to_string()),
        test: has("test").then(|| "npm test".to_string()),
        test_full: ["test:full", "test:all", "test:ci", "test"]
            .into_iter()
            .find(|n| has(n))
            .map(|n| if n == "test" { "npm test".to_string() } else { format!("npm run {n}") }),
    }
}

fn cargo_commands() -> BuildCommands {
    BuildCommands {
        build: Some("cargo build".to_string()),
        test: Some("cargo test".to_string()),
        test_full: Some("cargo test --all --all-features".to_string()),
    }
}

fn python_commands() -> BuildCommands {
    BuildCommands { build: Some("pip install -e .".to_string()), test: Some("pytest".to_string()), test_full: None }
}

fn go_commands() -> BuildCommands {
    BuildCommands {
        build: Some("go build ./...".to_string()),
        test: Some("go test ./...".to_string()),
        test_full: Some("go test ./... -v".to_string()),
    }
}

/// Detect in fixed order, stopping at the first manifest present.
pub fn detect(root: &Path) -> BuildCommands {
    if let Ok(text) = std::fs::read_to_string(root.join("Makefile")) {
        return from_makefile(&text);
    }
    if let Ok(text) = std::fs::read_to_string(root.join("package.json")) {
        return from_package_json(&text);
    }
    if root.join("Cargo.toml").is_file() {
        return cargo_commands();
    }
    if root.join("pyproject.toml").is_file() || root.join("setup.py").is_file() {
        return python_commands();
    }
    if root.join("go.mod").is_file() {
        return go_commands();
    }
    BuildCommands::default()
}
