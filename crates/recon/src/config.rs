use serde::Deserialize;

use crate::error::ReconError;

/// Vendor prefix carried by every tag issued for the collection.
pub const DEFAULT_PREFIX: &str = "304DB75F19600014";

/// Number of hexadecimal digits following the prefix.
pub const DEFAULT_SUFFIX_LEN: usize = 8;

const MAX_SUFFIX_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub grammar: GrammarConfig,
    pub registry: RegistryConfig,
    pub scanned: ScannedConfig,
    pub on_hand: OnHandConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_suffix_len")]
    pub suffix_len: usize,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_suffix_len() -> usize {
    DEFAULT_SUFFIX_LEN
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            suffix_len: default_suffix_len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub file: String,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

/// What to do when the same tag appears on more than one valid registry row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later rows replace the description of earlier ones.
    #[default]
    Overwrite,
    /// The first row wins; later rows are dropped silently.
    FirstWins,
    /// The first row wins; later rows are reported as exceptions.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannedConfig {
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnHandConfig {
    pub file: String,
    #[serde(default)]
    pub ambiguous: OnHandAmbiguity,
}

/// Whether tags from on-hand rows carrying several tags count as on hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnHandAmbiguity {
    #[default]
    Include,
    Exclude,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_missing")]
    pub missing: String,
    #[serde(default = "default_registry_exceptions")]
    pub registry_exceptions: String,
    #[serde(default = "default_on_hand_exceptions")]
    pub on_hand_exceptions: String,
    #[serde(default)]
    pub json: Option<String>,
}

fn default_output_dir() -> String {
    ".".into()
}

fn default_missing() -> String {
    "missing_items.xlsx".into()
}

fn default_registry_exceptions() -> String {
    "bad_registry_rows.xlsx".into()
}

fn default_on_hand_exceptions() -> String {
    "bad_on_hand_rows.xlsx".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            missing: default_missing(),
            registry_exceptions: default_registry_exceptions(),
            on_hand_exceptions: default_on_hand_exceptions(),
            json: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config for a run driven purely by input paths, with default grammar and policies.
    pub fn with_inputs(
        registry: impl Into<String>,
        scanned: impl Into<String>,
        on_hand: impl Into<String>,
    ) -> Self {
        Self {
            name: "stocktake".into(),
            grammar: GrammarConfig::default(),
            registry: RegistryConfig {
                file: registry.into(),
                on_duplicate: DuplicatePolicy::default(),
            },
            scanned: ScannedConfig { file: scanned.into() },
            on_hand: OnHandConfig {
                file: on_hand.into(),
                ambiguous: OnHandAmbiguity::default(),
            },
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let prefix = &self.grammar.prefix;
        if prefix.is_empty() {
            return Err(ReconError::ConfigValidation("grammar.prefix must not be empty".into()));
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ReconError::ConfigValidation(format!(
                "grammar.prefix must be ASCII alphanumeric, got \"{prefix}\""
            )));
        }

        if self.grammar.suffix_len == 0 || self.grammar.suffix_len > MAX_SUFFIX_LEN {
            return Err(ReconError::ConfigValidation(format!(
                "grammar.suffix_len must be between 1 and {MAX_SUFFIX_LEN}, got {}",
                self.grammar.suffix_len
            )));
        }

        for (field, value) in [
            ("registry.file", &self.registry.file),
            ("scanned.file", &self.scanned.file),
            ("on_hand.file", &self.on_hand.file),
            ("output.missing", &self.output.missing),
            ("output.registry_exceptions", &self.output.registry_exceptions),
            ("output.on_hand_exceptions", &self.output.on_hand_exceptions),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "Branch 7"

[registry]
file = "registry.csv"

[scanned]
file = "list.txt"

[on_hand]
file = "on_hand.xlsx"
"#;

    #[test]
    fn parse_minimal_uses_defaults() {
        let config = ReconConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "Branch 7");
        assert_eq!(config.grammar.prefix, DEFAULT_PREFIX);
        assert_eq!(config.grammar.suffix_len, 8);
        assert_eq!(config.registry.on_duplicate, DuplicatePolicy::Overwrite);
        assert_eq!(config.on_hand.ambiguous, OnHandAmbiguity::Include);
        assert_eq!(config.output.dir, ".");
        assert_eq!(config.output.missing, "missing_items.xlsx");
        assert!(config.output.json.is_none());
    }

    #[test]
    fn parse_full() {
        let input = r#"
name = "Full"

[grammar]
prefix = "E280"
suffix_len = 4

[registry]
file = "reg.xlsx"
on_duplicate = "reject"

[scanned]
file = "scan.txt"

[on_hand]
file = "loans.xlsx"
ambiguous = "exclude"

[output]
dir = "out"
missing = "missing.csv"
json = "result.json"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.grammar.prefix, "E280");
        assert_eq!(config.grammar.suffix_len, 4);
        assert_eq!(config.registry.on_duplicate, DuplicatePolicy::Reject);
        assert_eq!(config.on_hand.ambiguous, OnHandAmbiguity::Exclude);
        assert_eq!(config.output.dir, "out");
        assert_eq!(config.output.missing, "missing.csv");
        assert_eq!(config.output.registry_exceptions, "bad_registry_rows.xlsx");
        assert_eq!(config.output.json.as_deref(), Some("result.json"));
    }

    #[test]
    fn reject_unknown_policy() {
        let input = MINIMAL.replace("file = \"registry.csv\"", "file = \"registry.csv\"\non_duplicate = \"merge\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_missing_section() {
        let input = r#"
name = "No scans"

[registry]
file = "registry.csv"

[on_hand]
file = "on_hand.xlsx"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("scanned"));
    }

    #[test]
    fn reject_non_alphanumeric_prefix() {
        let input = format!("{MINIMAL}\n[grammar]\nprefix = \"304D-B75F\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("alphanumeric"));
    }

    #[test]
    fn reject_zero_suffix() {
        let input = format!("{MINIMAL}\n[grammar]\nsuffix_len = 0\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("suffix_len"));
    }

    #[test]
    fn reject_blank_file_name() {
        let input = MINIMAL.replace("list.txt", "  ");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("scanned.file"));
    }

    #[test]
    fn with_inputs_is_valid() {
        let config = ReconConfig::with_inputs("a.csv", "b.txt", "c.xlsx");
        config.validate().unwrap();
        assert_eq!(config.registry.file, "a.csv");
        assert_eq!(config.on_hand.file, "c.xlsx");
    }
}
