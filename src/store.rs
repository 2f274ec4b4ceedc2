//! .forge/ state store - directory layout and document resolution
//!
//! Layout under the project root:
//!
//! ```text
//! .forge/
//!   config.yaml          project configuration
//!   learnings.md         knowledge base (append-only from the tool's side)
//!   templates/cycle.md   optional user override of the cycle template
//!   cycles/active/       one markdown document per running cycle
//!   cycles/completed/    archived cycle documents
//! ```

use crate::error::ForgeError;
use crate::{Context, Result};
use colored::Colorize;
use dialoguer::Select;
use std::path::{Path, PathBuf};

// Embedded defaults, overridable under .forge/templates/
const CYCLE_TEMPLATE: &str = include_str!("templates/cycle.md");
const LEARNINGS_TEMPLATE: &str = include_str!("templates/learnings.md");

/// Handle to an initialized `.forge/` directory.
#[derive(Debug)]
pub struct Store {
    forge_dir: PathBuf,
}

impl Store {
    /// Open the store under `project_root`, failing if it was never
    /// bootstrapped.
    pub fn open(project_root: &Path) -> std::result::Result<Self, ForgeError> {
        let forge_dir = project_root.join(".forge");
        if !forge_dir.exists() {
            return Err(ForgeError::NotInitialized);
        }
        Ok(Self { forge_dir })
    }

    /// Create the directory skeleton. Files (config, learnings, template)
    /// are written by the init service on top of this.
    pub fn create(project_root: &Path) -> Result<Self> {
        let forge_dir = project_root.join(".forge");
        std::fs::create_dir_all(forge_dir.join("cycles/active"))?;
        std::fs::create_dir_all(forge_dir.join("cycles/completed"))?;
        std::fs::create_dir_all(forge_dir.join("templates"))?;
        Ok(Self { forge_dir })
    }

    pub fn forge_dir(&self) -> &Path {
        &self.forge_dir
    }

    pub fn active_dir(&self) -> PathBuf {
        self.forge_dir.join("cycles/active")
    }

    pub fn completed_dir(&self) -> PathBuf {
        self.forge_dir.join("cycles/completed")
    }

    pub fn learnings_path(&self) -> PathBuf {
        self.forge_dir.join("learnings.md")
    }

    pub fn template_path(&self) -> PathBuf {
        self.forge_dir.join("templates/cycle.md")
    }

    /// Markdown documents under cycles/active/, sorted by filename.
    pub fn active_cycles(&self) -> Result<Vec<PathBuf>> {
        list_documents(&self.active_dir())
    }

    /// Markdown documents under cycles/completed/, sorted by filename.
    pub fn completed_cycles(&self) -> Result<Vec<PathBuf>> {
        list_documents(&self.completed_dir())
    }

    /// Locate a cycle by id, active partition first. The bool is true for
    /// an active cycle.
    pub fn find_cycle(&self, cycle_id: &str) -> Option<(PathBuf, bool)> {
        let active = self.active_dir().join(format!("{}.md", cycle_id));
        if active.exists() {
            return Some((active, true));
        }
        let completed = self.completed_dir().join(format!("{}.md", cycle_id));
        if completed.exists() {
            return Some((completed, false));
        }
        None
    }

    /// Resolve the active cycle an operation targets. Without an explicit id
    /// this only succeeds when exactly one active cycle exists; several are
    /// an ambiguity the caller must resolve by naming one.
    pub fn resolve_active(
        &self,
        cycle_id: Option<&str>,
    ) -> std::result::Result<PathBuf, ForgeError> {
        if let Some(id) = cycle_id {
            let path = self.active_dir().join(format!("{}.md", id));
            if !path.exists() {
                return Err(ForgeError::CycleNotFound(id.to_string()));
            }
            return Ok(path);
        }

        let cycles = self
            .active_cycles()
            .map_err(|_| ForgeError::CycleNotFound("<active>".to_string()))?;
        match cycles.as_slice() {
            [] => Err(ForgeError::CycleNotFound("<no active cycles>".to_string())),
            [only] => Ok(only.clone()),
            many => Err(ForgeError::AmbiguousCycle(
                many.iter().map(|p| cycle_id_of(p)).collect(),
            )),
        }
    }

    /// Load the cycle template, preferring a user override in
    /// `.forge/templates/cycle.md`, and substitute `{{key}}` variables.
    pub fn render_cycle_template(&self, vars: &[(&str, &str)]) -> Result<String> {
        let override_path = self.template_path();
        let template = if override_path.exists() {
            std::fs::read_to_string(&override_path).with_context(|| {
                format!("Failed to read template override '{}'", override_path.display())
            })?
        } else {
            CYCLE_TEMPLATE.to_string()
        };

        let mut result = template;
        for (key, value) in vars {
            let placeholder = format!("{{{{{}}}}}", key); // {{key}}
            result = result.replace(&placeholder, value);
        }
        Ok(result)
    }

    /// The embedded learnings template, written once by init.
    pub fn learnings_template() -> &'static str {
        LEARNINGS_TEMPLATE
    }
}

/// Filename stem used as the cycle id.
pub fn cycle_id_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    if !dir.exists() {
        return Ok(documents);
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "md") {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

/// Resolves a cycle-id collision when creating a new cycle: suggest the next
/// free numeric suffix, confirm interactively, and auto-accept when no
/// terminal is available.
pub fn resolve_cycle_id_conflict(cycle_id: &str, active_dir: &Path) -> Result<String> {
    if !active_dir.join(format!("{}.md", cycle_id)).exists() {
        return Ok(cycle_id.to_string());
    }

    let suggested_id = find_next_available_id(cycle_id, active_dir);

    println!();
    println!("{}", "⚠️  Cycle already exists".yellow().bold());
    println!();

    match prompt_conflict_resolution(&suggested_id) {
        Ok(true) => {
            println!("{}", format!("Using new ID: '{}'", suggested_id).green());
            println!();
            Ok(suggested_id)
        }
        Ok(false) => anyhow::bail!("Operation aborted by user"),
        Err(_) => {
            // Non-interactive mode or terminal not available
            println!(
                "{}",
                format!("(non-interactive mode: using new ID '{}')", suggested_id).bright_black()
            );
            println!();
            Ok(suggested_id)
        }
    }
}

/// Given a base id like "rate-limiter-20260807", finds the next available
/// numeric suffix (highest existing + 1, skipping gaps forward).
fn find_next_available_id(base_id: &str, active_dir: &Path) -> String {
    let mut highest = 1;

    if let Ok(entries) = std::fs::read_dir(active_dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if let Some(suffix) = name.strip_prefix(&format!("{}-", base_id)) {
                    if let Ok(num) = suffix.parse::<u32>() {
                        highest = highest.max(num);
                    }
                }
            }
        }
    }

    let mut counter = highest + 1;
    loop {
        let candidate = format!("{}-{}", base_id, counter);
        if !active_dir.join(format!("{}.md", candidate)).exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn prompt_conflict_resolution(suggested_id: &str) -> Result<bool> {
    let options = vec![
        format!("Use new ID '{}' (recommended)", suggested_id),
        "Abort (pick a different feature name)".to_string(),
    ];

    println!("{}", "What would you like to do?".cyan());

    let selection = Select::new()
        .items(&options)
        .default(0)
        .interact()
        .map_err(|e| anyhow::anyhow!("Terminal not available: {}", e))?;

    Ok(selection == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn initialized(temp: &TempDir) -> Store {
        Store::create(temp.path()).unwrap()
    }

    #[test]
    fn test_open_requires_init() {
        let temp = TempDir::new().unwrap();
        let err = Store::open(temp.path()).unwrap_err();
        assert!(matches!(err, ForgeError::NotInitialized));

        initialized(&temp);
        assert!(Store::open(temp.path()).is_ok());
    }

    #[test]
    fn test_find_cycle_checks_both_partitions() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp);

        std::fs::write(store.active_dir().join("alpha.md"), "a").unwrap();
        std::fs::write(store.completed_dir().join("omega.md"), "o").unwrap();

        let (path, active) = store.find_cycle("alpha").unwrap();
        assert!(active);
        assert!(path.ends_with("cycles/active/alpha.md"));

        let (_, active) = store.find_cycle("omega").unwrap();
        assert!(!active);

        assert!(store.find_cycle("missing").is_none());
    }

    #[test]
    fn test_resolve_active_implied_single() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp);

        let err = store.resolve_active(None).unwrap_err();
        assert!(matches!(err, ForgeError::CycleNotFound(_)));

        std::fs::write(store.active_dir().join("one.md"), "x").unwrap();
        let path = store.resolve_active(None).unwrap();
        assert_eq!(cycle_id_of(&path), "one");

        std::fs::write(store.active_dir().join("two.md"), "x").unwrap();
        let err = store.resolve_active(None).unwrap_err();
        match err {
            ForgeError::AmbiguousCycle(ids) => {
                assert_eq!(ids, vec!["one".to_string(), "two".to_string()])
            }
            other => panic!("expected AmbiguousCycle, got {:?}", other),
        }

        // Explicit id still resolves
        let path = store.resolve_active(Some("two")).unwrap();
        assert_eq!(cycle_id_of(&path), "two");
    }

    #[test]
    fn test_render_template_embedded_default() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp);

        let vars = [("FEATURE", "My feature"), ("DATE", "2026-08-07"), ("PRIORITY", "high")];
        let content = store.render_cycle_template(&vars).unwrap();
        assert!(content.contains("# Feature: My feature"));
        assert!(content.contains("**Priority**: high"));
        assert!(!content.contains("{{"));
    }

    #[test]
    fn test_render_template_override_wins() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp);

        std::fs::write(
            store.template_path(),
            "# Feature: {{FEATURE}}\n\ncustom body\n",
        )
        .unwrap();

        let content = store
            .render_cycle_template(&[("FEATURE", "Custom")])
            .unwrap();
        assert!(content.contains("# Feature: Custom"));
        assert!(content.contains("custom body"));
    }

    #[test]
    fn test_find_next_available_id() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp);
        let dir = store.active_dir();

        std::fs::write(dir.join("feat-20260807.md"), "x").unwrap();
        assert_eq!(find_next_available_id("feat-20260807", &dir), "feat-20260807-2");

        std::fs::write(dir.join("feat-20260807-5.md"), "x").unwrap();
        assert_eq!(find_next_available_id("feat-20260807", &dir), "feat-20260807-6");
    }
}
