use crate::domain::{BumpKind, Flow};
use crate::error::{ReleasePlanError, Result};
use crate::planner::PlanOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "releaseplan.toml";

/// Represents the complete configuration for release-plan.
///
/// Built once per run and passed by reference into the engine; nothing in the
/// engine reads process environment on its own.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub dry_run: bool,
}

fn default_feature_prefix() -> String {
    "feature/".to_string()
}

fn default_flow() -> String {
    "auto".to_string()
}

/// Flow classification settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlowConfig {
    /// Branches starting with this prefix are feature branches
    #[serde(default = "default_feature_prefix")]
    pub feature_prefix: String,

    /// `auto` to classify from the pipeline, or a fixed flow for replays
    #[serde(default = "default_flow")]
    pub force: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig {
            feature_prefix: default_feature_prefix(),
            force: default_flow(),
        }
    }
}

/// Version forecasting settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct VersionConfig {
    /// Explicit bump kind; when set, no merge-request lookup happens
    #[serde(default)]
    pub bump: Option<String>,
}

/// How the pre-release identifier of RC tags is chosen
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RcIdentifier {
    /// Fixed `rc.1`
    #[default]
    Rc,
    /// The commit's short SHA
    ShortSha,
}

/// Tag policy opt-ins.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TagsConfig {
    #[serde(default)]
    pub latest_on_feature: bool,

    #[serde(default)]
    pub latest_on_default: bool,

    #[serde(default)]
    pub tag_latest: bool,

    #[serde(default)]
    pub rc_identifier: RcIdentifier,
}

/// Publish policy opt-ins.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PublishConfig {
    /// Publish feature-branch builds triggered by a direct push
    #[serde(default)]
    pub feature: bool,
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_context() -> String {
    ".".to_string()
}

/// Image and build hand-off settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ImageConfig {
    /// Overrides the registry base's last path segment
    #[serde(default)]
    pub application_name: Option<String>,

    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,

    #[serde(default = "default_context")]
    pub context: String,

    #[serde(default)]
    pub pull: bool,

    #[serde(default)]
    pub no_cache: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            application_name: None,
            dockerfile: default_dockerfile(),
            context: default_context(),
            pull: false,
            no_cache: false,
        }
    }
}

/// Values supplied on the command line (or their env fallbacks).
///
/// `None` leaves the file value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub bump: Option<String>,
    pub flow: Option<String>,
    pub feature_prefix: Option<String>,
    pub application_name: Option<String>,
    pub latest_on_feature: Option<bool>,
    pub latest_on_default: Option<bool>,
    pub tag_latest: Option<bool>,
    pub publish_feature: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Layer overrides on top of this configuration.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(bump) = &overrides.bump {
            self.version.bump = Some(bump.clone());
        }
        if let Some(flow) = &overrides.flow {
            self.flow.force = flow.clone();
        }
        if let Some(prefix) = &overrides.feature_prefix {
            self.flow.feature_prefix = prefix.clone();
        }
        if let Some(name) = &overrides.application_name {
            self.image.application_name = Some(name.clone());
        }
        if let Some(v) = overrides.latest_on_feature {
            self.tags.latest_on_feature = v;
        }
        if let Some(v) = overrides.latest_on_default {
            self.tags.latest_on_default = v;
        }
        if let Some(v) = overrides.tag_latest {
            self.tags.tag_latest = v;
        }
        if let Some(v) = overrides.publish_feature {
            self.publish.feature = v;
        }
        if let Some(v) = overrides.dry_run {
            self.dry_run = v;
        }
    }

    /// Explicit bump override, if configured. Unknown text is a configuration error.
    pub fn bump_override(&self) -> Result<Option<BumpKind>> {
        match self.version.bump.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some),
        }
    }

    /// Forced flow (`Flow::Auto` unless configured). Unknown text is a configuration error.
    pub fn forced_flow(&self) -> Result<Flow> {
        let text = self.flow.force.trim();
        if text.is_empty() {
            return Ok(Flow::Auto);
        }
        text.parse()
    }

    /// Tag and publish opt-ins for the planner
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            latest_on_feature: self.tags.latest_on_feature,
            latest_on_default: self.tags.latest_on_default,
            tag_latest: self.tags.tag_latest,
            publish_feature: self.publish.feature,
        }
    }

    /// Check every textual setting up front so the run fails fast.
    pub fn validate(&self) -> Result<()> {
        self.bump_override()?;
        self.forced_flow()?;
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releaseplan.toml` in current directory
/// 3. `.releaseplan.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            ReleasePlanError::config(format!("cannot read config file '{}': {}", path, e))
        })?
    } else if local.exists() {
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_path.exists() {
            fs::read_to_string(user_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
