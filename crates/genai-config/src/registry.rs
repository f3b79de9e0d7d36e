//! Agent Registry (spec.md §4.D) — owns `agentId -> AgentDefinition`,
//! populated by a startup walk and kept current by File Watcher events.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use genai_core::{AgentDefinition, FileEvent, FileEventKind, WorkflowFileChanged};

use crate::loader;
use crate::watcher::FileWatcher;

/// Thread-safe `agentId -> AgentDefinition` cache with hot-reload.
///
/// Load errors for an individual file are logged and leave the previous
/// entry (if any) untouched — a typo in one agent's YAML never takes down
/// the rest of the fleet.
pub struct AgentRegistry {
    base_root: PathBuf,
    agents: DashMap<String, Arc<AgentDefinition>>,
    /// Tracks which agent id a given source path last loaded as, so a
    /// deleted file can be evicted by its actual id rather than a guess
    /// from its filename (`AgentConfig.id` is never required to match the
    /// file stem — spec.md §3 ties identity to `id` alone).
    ids_by_path: DashMap<PathBuf, String>,
    watcher: FileWatcher,
    workflow_tx: std::sync::mpsc::Sender<WorkflowFileChanged>,
}

impl AgentRegistry {
    /// Walk `base_root` once, loading every `.yaml` file found, then start
    /// watching it for `.yaml`/`.md` changes. `workflow_tx` receives a
    /// `WorkflowFileChanged` for every workflow YAML create/modify so the
    /// Workflow Engine can reload independently (spec.md §9: channel-based
    /// decoupling avoids a registry -> engine dependency cycle).
    pub fn start(base_root: impl Into<PathBuf>, workflow_tx: std::sync::mpsc::Sender<WorkflowFileChanged>) -> Arc<Self> {
        let base_root = base_root.into();
        let registry = Arc::new(Self {
            base_root: base_root.clone(),
            agents: DashMap::new(),
            ids_by_path: DashMap::new(),
            watcher: FileWatcher::new(),
            workflow_tx,
        });

        registry.initial_scan();

        let watched = registry.clone();
        registry.watcher.start(base_root, vec!["yaml".to_string(), "md".to_string()], move |event| {
            watched.handle_event(event);
        });

        registry
    }

    fn initial_scan(&self) {
        for path in walk_yaml_files(&self.base_root) {
            if is_under(&path, "agents") {
                self.load_and_insert(&path);
            }
        }
    }

    fn handle_event(&self, event: FileEvent) {
        let is_yaml = has_extension(&event.path, "yaml");
        let is_md = has_extension(&event.path, "md");

        match (event.kind, is_yaml, is_md) {
            (FileEventKind::Created | FileEventKind::Modified, true, _) if is_under(&event.path, "agents") => {
                self.load_and_insert(&event.path);
            }
            (FileEventKind::Created | FileEventKind::Modified, true, _) if is_under(&event.path, "workflows") => {
                let _ = self.workflow_tx.send(WorkflowFileChanged { path: event.path });
            }
            (FileEventKind::Created | FileEventKind::Modified, _, true) => {
                self.reload_siblings_of_prompt(&event.path);
            }
            (FileEventKind::Deleted, true, _) => {
                self.evict_by_path(&event.path);
            }
            (FileEventKind::Deleted, _, true) => {
                self.reload_siblings_of_prompt(&event.path);
            }
            _ => {}
        }
    }

    fn load_and_insert(&self, path: &Path) {
        match loader::load_agent(path, &self.base_root) {
            Ok(def) => {
                tracing::info!(agent_id = %def.id, path = %path.display(), "agent loaded");
                self.ids_by_path.insert(path.to_path_buf(), def.id.clone());
                self.agents.insert(def.id.clone(), Arc::new(def));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load agent, keeping previous entry");
            }
        }
    }

    /// A deleted file can't be re-parsed for its id, so eviction looks up
    /// the id this path last loaded as (spec.md §9 Open Question:
    /// event-driven removal, not a full rescan).
    fn evict_by_path(&self, path: &Path) {
        if let Some((_, id)) = self.ids_by_path.remove(path) {
            self.agents.remove(&id);
        }
    }

    fn reload_siblings_of_prompt(&self, prompt_path: &Path) {
        let dir = match prompt_path.parent() {
            Some(d) => d,
            None => return,
        };
        let siblings = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to list directory for prompt reload");
                return;
            }
        };
        for entry in siblings.flatten() {
            let path = entry.path();
            if has_extension(&path, "yaml") {
                self.load_and_insert(&path);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<AgentDefinition>> {
        self.agents.get(id).map(|entry| entry.value().clone())
    }

    /// A point-in-time snapshot, safe against concurrent mutation.
    pub fn get_all(&self) -> HashMap<String, Arc<AgentDefinition>> {
        self.agents.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn walk_yaml_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk_into(root, &mut out);
    out
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name == ".git" || name == "target" {
                continue;
            }
            walk_into(&path, out);
        } else if has_extension(&path, "yaml") {
            out.push(path);
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case(ext)).unwrap_or(false)
}

/// True if any path component equals `name` — used to classify a file as
/// living under an `agents` or `workflows` subtree regardless of nesting.
fn is_under(path: &Path, name: &str) -> bool {
    path.components().any(|c| c.as_os_str().to_str() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let full = dir.join(rel);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut f = std::fs::File::create(&full).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        full
    }

    #[test]
    fn initial_scan_loads_all_agents_under_agents_subtree() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "agents/summarizer.yaml",
            "id: summarizer\nname: Summarizer\nmodel:\n  provider: openai\n  name: gpt-4o-mini\n",
        );
        write_file(
            tmp.path(),
            "workflows/pipeline.yaml",
            "id: pipeline\nname: Pipeline\ntype: CHAIN\nsteps: []\n",
        );
        let (tx, _rx) = mpsc::channel();
        let registry = AgentRegistry::start(tmp.path(), tx);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("summarizer").is_some());
    }

    #[test]
    fn load_error_does_not_evict_previous_entry() {
        let tmp = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel();
        let registry = AgentRegistry::start(tmp.path(), tx);
        write_file(
            tmp.path(),
            "agents/a.yaml",
            "id: a\nname: A\nmodel:\n  provider: openai\n  name: gpt-4o-mini\n",
        );
        registry.load_and_insert(&tmp.path().join("agents/a.yaml"));
        assert!(registry.get("a").is_some());

        registry.load_and_insert(&tmp.path().join("agents/a.yaml"));
        write_file(tmp.path(), "agents/a.yaml", "name: A\n");
        registry.load_and_insert(&tmp.path().join("agents/a.yaml"));
        assert!(registry.get("a").is_some(), "previous valid entry must survive a bad reload");
    }

    #[test]
    fn evicts_by_tracked_id_even_when_filename_differs() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "agents/summarizer-v2.yaml",
            "id: summarizer\nname: Summarizer\nmodel:\n  provider: openai\n  name: gpt-4o-mini\n",
        );
        let (tx, _rx) = mpsc::channel();
        let registry = AgentRegistry::start(tmp.path(), tx);
        assert!(registry.get("summarizer").is_some());

        registry.evict_by_path(&tmp.path().join("agents/summarizer-v2.yaml"));
        assert!(registry.get("summarizer").is_none());
    }

    #[test]
    fn evicting_unrelated_path_does_not_touch_coincidentally_named_agent() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "agents/summarizer.yaml",
            "id: summarizer\nname: Summarizer\nmodel:\n  provider: openai\n  name: gpt-4o-mini\n",
        );
        let (tx, _rx) = mpsc::channel();
        let registry = AgentRegistry::start(tmp.path(), tx);

        registry.evict_by_path(&tmp.path().join("agents/summarizer-unrelated.yaml"));
        assert!(registry.get("summarizer").is_some(), "eviction of an untracked path must be a no-op");
    }

    #[test]
    fn is_under_matches_nested_agents_subtree() {
        assert!(is_under(Path::new("/base/env/agents/a.yaml"), "agents"));
        assert!(!is_under(Path::new("/base/env/workflows/a.yaml"), "agents"));
    }

    #[test]
    fn edited_prompt_is_visible_within_two_seconds() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "agents/prompts/system.md", "Be terse.");
        write_file(
            tmp.path(),
            "agents/writer.yaml",
            "id: writer\nname: Writer\nsystemPromptPath: prompts/system.md\nmodel:\n  provider: openai\n  name: gpt-4o-mini\n",
        );
        let (tx, _rx) = mpsc::channel();
        let registry = AgentRegistry::start(tmp.path(), tx);
        assert_eq!(registry.get("writer").unwrap().system_prompt, "Be terse.");

        write_file(tmp.path(), "agents/prompts/system.md", "Be exhaustive.");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        loop {
            if registry.get("writer").unwrap().system_prompt == "Be exhaustive." {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "prompt edit was not picked up within 2 seconds");
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
    }
}
