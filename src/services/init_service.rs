//! Init service - .forge/ bootstrap

use crate::models::ForgeConfig;
use crate::store::Store;
use crate::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Outcome of `forge init`.
#[derive(Debug, Serialize)]
pub struct InitReport {
    pub project: String,
    pub path: String,
    pub created: Vec<String>,
    pub reinitialized: bool,
}

/// Create the `.forge/` directory structure with config, learnings file and
/// cycle template. Refuses when already initialized unless forced; a forced
/// run rewrites config and template but keeps an existing learnings file.
pub fn init_project(
    project_root: &Path,
    project_name: Option<&str>,
    force: bool,
) -> Result<InitReport> {
    let forge_dir = project_root.join(".forge");
    let reinitialized = forge_dir.exists();
    if reinitialized && !force {
        anyhow::bail!(
            ".forge/ already exists at {}. Use --force to reinitialize.",
            forge_dir.display()
        );
    }

    let store = Store::create(project_root)?;
    let mut created = Vec::new();

    let name = match project_name {
        Some(n) => n.to_string(),
        None => project_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string()),
    };

    let config = ForgeConfig::new(&name);
    config.save(project_root)?;
    created.push(".forge/config.yaml".to_string());

    // Never clobber accumulated learnings on a forced re-init
    let learnings_path = store.learnings_path();
    if !learnings_path.exists() {
        std::fs::write(&learnings_path, Store::learnings_template())
            .context("Failed to write learnings.md")?;
        created.push(".forge/learnings.md".to_string());
    }

    let template_path = store.template_path();
    std::fs::write(&template_path, include_str!("../templates/cycle.md"))
        .context("Failed to write cycle template")?;
    created.push(".forge/templates/cycle.md".to_string());

    Ok(InitReport {
        project: name,
        path: forge_dir.display().to_string(),
        created,
        reinitialized,
    })
}
