use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use skylark_llm::ProviderRegistry;
use skylark_sandbox::Sandbox;
use skylark_tools::ToolManager;
use tracing::debug;

use crate::error::CoreError;

/// A named persona: system prompt, model spec, and permitted tool set.
/// Loaded lazily from a `prompt.md`-like artifact and immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assistant {
    pub name: String,
    pub description: String,
    pub model_spec: String,
    pub tool_allowlist: HashSet<String>,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct AssistantFrontmatter {
    name: String,
    #[serde(default)]
    description: String,
    model: String,
    #[serde(default)]
    tools: Vec<String>,
}

/// Parse an assistant definition: YAML front matter delimited by `---\n`
/// lines, followed by a whitespace-trimmed prompt body. Fewer than three
/// `---`-separated segments is `InvalidAssistant`.
pub fn parse_assistant(content: &str) -> Result<Assistant, CoreError> {
    let content = content.trim();
    if !content.starts_with("---") {
        return Err(CoreError::InvalidAssistant {
            reason: "missing front-matter delimiter".to_string(),
        });
    }

    let after_start = &content[3..];
    let end_pos = after_start.find("\n---").ok_or_else(|| CoreError::InvalidAssistant {
        reason: "front-matter is not closed by a second `---` line".to_string(),
    })?;

    let yaml_content = after_start[..end_pos].trim();
    let body_start = end_pos + "\n---".len();
    let system_prompt = after_start.get(body_start..).unwrap_or("").trim().to_string();

    let frontmatter: AssistantFrontmatter =
        serde_yaml::from_str(yaml_content).map_err(|e| CoreError::InvalidAssistant {
            reason: format!("malformed front-matter YAML: {e}"),
        })?;

    Ok(Assistant {
        name: frontmatter.name.to_lowercase(),
        description: frontmatter.description,
        model_spec: frontmatter.model,
        tool_allowlist: frontmatter.tools.into_iter().collect(),
        system_prompt,
    })
}

/// Owns the tool manager, provider registry, and sandbox shared with every
/// loaded assistant; the orchestrator holds only borrowed references to
/// this manager. Assistant definitions are cached and immutable after load.
pub struct AssistantManager {
    base_dir: PathBuf,
    pub tools: Arc<ToolManager>,
    pub registry: Arc<ProviderRegistry>,
    pub sandbox: Arc<Sandbox>,
    cache: RwLock<HashMap<String, Arc<Assistant>>>,
}

impl AssistantManager {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        tools: Arc<ToolManager>,
        registry: Arc<ProviderRegistry>,
        sandbox: Arc<Sandbox>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            tools,
            registry,
            sandbox,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn definition_path(&self, name: &str) -> PathBuf {
        self.base_dir.join("assistants").join(format!("{name}.md"))
    }

    /// Load (and cache) the assistant named `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Result<Arc<Assistant>, CoreError> {
        let name = name.to_lowercase();
        if let Some(assistant) = self.cache.read().get(&name) {
            return Ok(Arc::clone(assistant));
        }

        let path = self.definition_path(&name);
        let content = std::fs::read_to_string(&path).map_err(|source| CoreError::InvalidAssistant {
            reason: format!("failed to read {}: {source}", path.display()),
        })?;

        let assistant = Arc::new(parse_assistant(&content)?);
        self.cache.write().insert(name.clone(), Arc::clone(&assistant));
        debug!(assistant = %name, "loaded assistant definition");
        Ok(assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "---\nname: Test\ndescription: a test assistant\nmodel: openai:gpt-4\ntools:\n  - summarize\n---\nYou are a helpful assistant.\n";

    #[test]
    fn parses_name_as_lowercase() {
        let assistant = parse_assistant(VALID).unwrap();
        assert_eq!(assistant.name, "test");
        assert_eq!(assistant.model_spec, "openai:gpt-4");
        assert!(assistant.tool_allowlist.contains("summarize"));
        assert_eq!(assistant.system_prompt, "You are a helpful assistant.");
    }

    #[test]
    fn missing_frontmatter_delimiter_is_invalid() {
        let err = parse_assistant("no front matter here").unwrap_err();
        assert!(matches!(err, CoreError::InvalidAssistant { .. }));
    }

    #[test]
    fn unclosed_frontmatter_is_invalid() {
        let err = parse_assistant("---\nname: Test\nno closing delimiter").unwrap_err();
        assert!(matches!(err, CoreError::InvalidAssistant { .. }));
    }

    #[test]
    fn manager_caches_the_same_instance() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("assistants")).unwrap();
        std::fs::write(tmp.path().join("assistants/test.md"), VALID).unwrap();

        let sandbox = Arc::new(
            Sandbox::new(skylark_sandbox::SandboxConfig::new(tmp.path().join("work"))).unwrap(),
        );
        let manager = AssistantManager::new(
            tmp.path(),
            Arc::new(ToolManager::new(tmp.path())),
            Arc::new(ProviderRegistry::new("openai")),
            sandbox,
        );

        let first = manager.get("Test").unwrap();
        let second = manager.get("test").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
