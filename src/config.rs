use crate::util::{static_err, ApiErr, ErrOrigin};

use indexmap::IndexMap;
use serde::Deserialize;

use std::fs;
use std::path::Path;

pub const DEFAULT_ICON_KEY: &str = "default";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Extra internal attribute → API field pairs appended to (or
    /// overriding) the built-in post table.
    pub extra_fields: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poster_ids:       bool,
    pub country_flags:    bool,
    pub user_flag:        bool,
    pub slugify:          bool,
    pub secure_trip_salt: String,
    pub file_icons:       IndexMap<String, String>,
    pub file_thumb:       String,
    pub api:              ApiSection,
}

impl Default for Config {
    fn default() -> Self {
        let mut file_icons = IndexMap::new();
        file_icons.insert(DEFAULT_ICON_KEY.to_string(), "file.png".to_string());

        Config {
            poster_ids:       false,
            country_flags:    false,
            user_flag:        false,
            slugify:          false,
            secure_trip_salt: String::new(),
            file_icons,
            file_thumb:       String::from("static/%s"),
            api:              ApiSection::default(),
        }
    }
}

impl Config {
    pub fn from_str(s: &str) -> Result<Config, ApiErr> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, ApiErr> {
        let s = fs::read_to_string(path)?;
        Config::from_str(&s)
    }

    pub fn validate(&self) -> Result<(), ApiErr> {
        if self.file_thumb.matches("%s").count() > 1 {
            return Err(static_err(ErrOrigin::Config,
                                  "file_thumb may contain at most one %s placeholder"));
        }
        if !self.file_icons.contains_key(DEFAULT_ICON_KEY) {
            return Err(static_err(ErrOrigin::Config,
                                  "file_icons has no default icon"));
        }
        Ok(())
    }

    /// Icon for files of `extension`, falling back to the default icon.
    pub fn file_icon(&self, extension: Option<&str>) -> &str {
        extension
            .and_then(|ext| self.file_icons.get(ext))
            .or_else(|| self.file_icons.get(DEFAULT_ICON_KEY))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn show_flags(&self) -> bool {
        self.country_flags || self.user_flag
    }
}
