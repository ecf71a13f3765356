use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_INSTRUCTIONS: &str = "You are an expert cheminformatics assistant. Use the provided \
cheminformatics tools to answer questions about molecular properties, validate SMILES strings, and assist \
with chemistry-related queries. Respond clearly and accurately, providing helpful explanations when needed.";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    /// Literal key from the file. Used when `api_key_env` is unset.
    pub api_key: Option<String>,
    /// Key given on the command line. Outranks everything else.
    #[serde(skip)]
    pub api_key_override: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_override: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            instructions: default_instructions(),
            max_turns: default_max_turns(),
        }
    }
}

impl LlmConfig {
    /// Command-line key, else the named env var, else the file's literal
    /// key, else the local-server placeholder.
    pub fn resolve_api_key(&self) -> String {
        let non_empty = |k: &String| !k.is_empty();
        self.api_key_override
            .clone()
            .filter(non_empty)
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(non_empty))
            .or_else(|| self.api_key.clone().filter(non_empty))
            .unwrap_or_else(default_api_key)
    }
}

// Defaults
fn default_api_key() -> String {
    "ollama".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model() -> String {
    "gpt-oss:20b".into()
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_timeout_secs() -> u64 {
    180
}
fn default_max_retries() -> u32 {
    3
}
fn default_agent_name() -> String {
    "Assistant".into()
}
fn default_instructions() -> String {
    DEFAULT_INSTRUCTIONS.into()
}
fn default_max_turns() -> u32 {
    10
}
fn default_queries() -> Vec<String> {
    vec![
        "Calculate the molecular weight of the molecule with SMILES CC(=O)OC1=CC=CC=C1C(=O)O"
            .into(),
        "Is the SMILES string C1CCCCC1 valid?".into(),
        "What is the logP of the molecule with SMILES CCO?".into(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            agent: AgentConfig::default(),
            queries: default_queries(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    /// Load `path` if it exists, otherwise fall back to defaults. A file that
    /// exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            return Err(Error::config("llm.base_url must not be empty"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }
        if self.agent.max_turns == 0 {
            return Err(Error::config("agent.max_turns must be at least 1"));
        }
        if self.queries.is_empty() {
            return Err(Error::config("no queries to run"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn full_config_parses() {
        let toml = r#"
queries = ["Is CCO valid?"]

[llm]
api_key = "sk-test"
base_url = "https://api.example.com/v1"
model = "test-model"
max_tokens = 512
timeout_secs = 30
max_retries = 1

[agent]
name = "Chemist"
instructions = "Be brief."
max_turns = 4
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "test-model");
        assert_eq!(config.llm.max_retries, 1);
        assert_eq!(config.agent.name, "Chemist");
        assert_eq!(config.agent.max_turns, 4);
        assert_eq!(config.queries, vec!["Is CCO valid?".to_string()]);
        config.llm.api_key_env = "CHEM_AGENT_TEST_KEY_THAT_IS_NEVER_SET".into();
        assert_eq!(config.llm.resolve_api_key(), "sk-test");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.model, "gpt-oss:20b");
        assert_eq!(config.llm.timeout_secs, 180);
        assert_eq!(config.agent.name, "Assistant");
        assert_eq!(config.agent.max_turns, 10);
        assert_eq!(config.queries.len(), 3);
        assert!(config.queries[0].contains("CC(=O)OC1=CC=CC=C1C(=O)O"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn api_key_falls_back_to_placeholder() {
        let llm = LlmConfig {
            api_key_env: "CHEM_AGENT_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key(), "ollama");
    }

    #[test]
    fn api_key_precedence_is_cli_env_file() {
        let var = "CHEM_AGENT_TEST_KEY_PRECEDENCE";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "from-env") };

        let mut llm = LlmConfig {
            api_key: Some("from-file".into()),
            api_key_env: var.into(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key(), "from-env");

        llm.api_key_override = Some("from-cli".into());
        assert_eq!(llm.resolve_api_key(), "from-cli");

        llm.api_key_override = None;
        llm.api_key_env = "CHEM_AGENT_TEST_KEY_THAT_IS_NEVER_SET".into();
        assert_eq!(llm.resolve_api_key(), "from-file");

        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn validate_rejects_zero_turns_and_empty_queries() {
        let mut config = Config::default();
        config.agent.max_turns = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.queries.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_or_default_handles_missing_and_present_files() {
        let missing = Path::new("definitely/not/here/chem-agent.toml");
        let config = Config::load_or_default(missing).unwrap();
        assert_eq!(config.llm.model, "gpt-oss:20b");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodel = \"llama3.2\"").unwrap();
        let config = Config::load_or_default(file.path()).unwrap();
        assert_eq!(config.llm.model, "llama3.2");

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "[llm\nmodel = ").unwrap();
        assert!(matches!(
            Config::load_or_default(bad.path()),
            Err(Error::Config(_))
        ));
    }
}
