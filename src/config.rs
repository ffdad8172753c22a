//! Configuration, resolved once at startup from the command line, an INI file
//! with one section per instance, and the environment.
//!
//! ```ini
//! [default]
//! server_url = https://chat.example.com
//! tokencmd = pass show mattermost
//! auto_highlight = yes
//! max_message_length = 16383
//! ```

use crate::{
    cli::Cli,
    credentials::resolve_token,
    error::Failure,
    highlight::HighlightMode,
    mattermost::auth::AccessToken,
};
use ini::{Ini, ParseOption, Properties};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Mattermost's own default limit on post length.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4000;

/// One named instance from the config file. Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub server_url: String,
    pub token: String,
    pub token_command: Option<String>,
    pub max_message_length: usize,
    pub auto_highlight: bool,
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            token: String::new(),
            token_command: None,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            auto_highlight: false,
        }
    }
}

impl Instance {
    /// Load the named instance. A missing file or section yields the default
    /// instance; a malformed file or value is an error.
    pub fn load(path: &Path, name: &str) -> Result<Self, Failure> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        // `tokencmd` values are shell commands, so take them verbatim.
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };

        let ini = Ini::load_from_file_opt(path, opt)
            .map_err(|e| Failure::ConfigFile(path.to_owned(), e))?;

        match ini.section(Some(name)) {
            Some(props) => Self::from_keys(
                name,
                &Keys {
                    instance: props,
                    defaults: ini.section(Some(DEFAULTS_SECTION)),
                },
            ),
            None => {
                debug!("No instance [{}] in {}", name, path.display());
                Ok(Self::default())
            }
        }
    }

    fn from_keys(name: &str, keys: &Keys) -> Result<Self, Failure> {
        let invalid = |key: &'static str, value: &str| Failure::ConfigValue {
            instance: name.to_owned(),
            key,
            value: value.to_owned(),
        };

        let max_message_length = match keys.get("max_message_length") {
            Some(x) => x
                .trim()
                .parse()
                .map_err(|_| invalid("max_message_length", x))?,
            None => DEFAULT_MAX_MESSAGE_LENGTH,
        };

        let auto_highlight = match keys.get("auto_highlight") {
            Some(x) => parse_bool(x).ok_or_else(|| invalid("auto_highlight", x))?,
            None => false,
        };

        Ok(Self {
            server_url: keys.get("server_url").unwrap_or_default().trim().to_owned(),
            token: keys.get("token").unwrap_or_default().trim().to_owned(),
            token_command: keys
                .get("tokencmd")
                .map(str::trim)
                .filter(|x| !x.is_empty())
                .map(str::to_owned),
            max_message_length,
            auto_highlight,
        })
    }
}

/// Keys in this section are inherited by every instance.
const DEFAULTS_SECTION: &str = "DEFAULT";

/// An instance's section layered over `[DEFAULT]`. Key names match regardless
/// of case; section names don't, so `[default]` stays an ordinary instance.
struct Keys<'a> {
    instance: &'a Properties,
    defaults: Option<&'a Properties>,
}

impl<'a> Keys<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        let find = |props: &'a Properties| {
            props
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        };

        find(self.instance).or_else(|| self.defaults.and_then(find))
    }
}

/// The boolean spellings INI files conventionally accept.
fn parse_bool(x: &str) -> Option<bool> {
    match x.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

/// Fallbacks from the environment, lowest priority of all.
#[derive(Debug, Default)]
pub struct Env {
    pub server_url: Option<String>,
    pub token: Option<String>,
}

impl Env {
    pub fn from_process() -> Self {
        Self {
            server_url: env::var("MM_SERVER_URL").ok(),
            token: env::var("MM_TOKEN").ok(),
        }
    }
}

/// Everything the rest of the program needs, fully resolved.
pub struct Settings {
    pub server_url: String,
    pub token: AccessToken,
    pub max_message_length: usize,
    pub highlight: HighlightMode,
}

impl Settings {
    /// Command line beats config file beats environment, throughout. Doesn't
    /// check that anything is actually set; the client does that.
    pub fn resolve(cli: &Cli, instance: Instance, env: Env) -> Self {
        let server_url = [
            cli.server_url.as_deref(),
            Some(instance.server_url.as_str()),
            env.server_url.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|x| !x.trim().is_empty())
        .unwrap_or_default()
        .to_owned();

        let token = resolve_token(
            cli.token.as_deref(),
            instance.token_command.as_deref(),
            Some(instance.token.as_str()),
            env.token.as_deref(),
        );

        let highlight = match cli.highlight.as_deref() {
            Some(mode) => HighlightMode::from(mode),
            None if instance.auto_highlight => HighlightMode::Auto,
            None => HighlightMode::No,
        };

        debug!("Highlighting piped text: {}", highlight);

        Self {
            server_url,
            token: AccessToken(token),
            max_message_length: cli.max_length.unwrap_or(instance.max_message_length),
            highlight,
        }
    }
}
