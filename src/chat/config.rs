//! Configuration for the chat client.
//!
//! Values are resolved from, in order of precedence, the command line (`arrrg`), an optional YAML
//! file, the environment, and finally the defaults of the selected [`Mode`].

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::Deserialize;

use crate::client::{DEFAULT_API_URL, DEFAULT_DEMO_API_URL};
use crate::error::{Error, Result};

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "CHATDESK_API_URL";

/// Environment variable overriding the state directory.
pub const ENV_STATE_DIR: &str = "CHATDESK_STATE_DIR";

/// Directory name under the platform config dir.
const STATE_DIR_NAME: &str = "chatdesk";

/// Command-line arguments for the chatdesk tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the backend API.
    #[arrrg(optional, "Backend API base URL", "URL")]
    pub api_url: Option<String>,

    /// Deployment mode.
    #[arrrg(optional, "Deployment mode: single or multi (default: multi)", "MODE")]
    pub mode: Option<String>,

    /// Where the session is persisted.
    #[arrrg(optional, "Directory holding the persisted session", "DIR")]
    pub state_dir: Option<String>,

    /// YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "FILE")]
    pub config: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Unauthenticated demo backend with one shared conversation.
    SingleTenant,
    /// Authenticated backend with per-user history.
    #[default]
    MultiTenant,
}

impl Mode {
    /// The API base used when nothing else is configured.
    pub fn default_api_url(self) -> &'static str {
        match self {
            Mode::SingleTenant => DEFAULT_DEMO_API_URL,
            Mode::MultiTenant => DEFAULT_API_URL,
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single-tenant" | "demo" => Ok(Mode::SingleTenant),
            "multi" | "multi-tenant" => Ok(Mode::MultiTenant),
            other => Err(Error::config(format!(
                "unknown mode {other:?}; expected single or multi"
            ))),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::SingleTenant => write!(f, "single"),
            Mode::MultiTenant => write!(f, "multi"),
        }
    }
}

/// The YAML configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub mode: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub color: Option<bool>,
}

impl FileConfig {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses YAML text.  An empty document is an empty configuration.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// The resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Which backend the client talks to.
    pub mode: Mode,

    /// Base URL of the backend API.
    pub api_url: String,

    /// Where the session is persisted.  `None` falls back to the platform config dir.
    pub state_dir: Option<PathBuf>,

    /// Per-request timeout.  `None` leaves it to the transport.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a multi-tenant configuration with defaults.
    pub fn new() -> Self {
        Self::for_mode(Mode::MultiTenant)
    }

    /// Creates the defaults for `mode`.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            api_url: mode.default_api_url().to_string(),
            state_dir: None,
            timeout: None,
            use_color: true,
        }
    }

    /// Resolves the command line, reading the YAML file it names and the process environment.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file, |key| std::env::var(key).ok())
    }

    /// Merges the sources, command line first.
    pub fn resolve(
        args: ChatArgs,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mode = match args.mode.or(file.mode) {
            Some(mode) => mode.parse()?,
            None => Mode::default(),
        };
        let api_url = args
            .api_url
            .or(file.api_url)
            .or_else(|| env(ENV_API_URL))
            .unwrap_or_else(|| mode.default_api_url().to_string());
        let state_dir = args
            .state_dir
            .map(PathBuf::from)
            .or(file.state_dir)
            .or_else(|| env(ENV_STATE_DIR).map(PathBuf::from));
        let timeout = args.timeout.or(file.timeout_secs).map(Duration::from_secs);
        let use_color = !args.no_color && file.color.unwrap_or(true);
        Ok(Self {
            mode,
            api_url,
            state_dir,
            timeout,
            use_color,
        })
    }

    /// The directory holding the persisted session.
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(STATE_DIR_NAME))
            .ok_or_else(|| Error::config("no config directory; pass --state-dir"))
    }

    /// Sets the mode.  The API base follows unless one was set explicitly.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        if self.api_url == self.mode.default_api_url() {
            self.api_url = mode.default_api_url().to_string();
        }
        self.mode = mode;
        self
    }

    /// Sets the API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the state directory.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}
