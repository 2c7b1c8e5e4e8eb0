use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use strum::Display;
use url::Url;

/// Which validation regex from the `[regex]` config table to apply.
#[derive(Clone, Copy, Debug, Display)]
pub enum RegexType {
    Username,
    Password,
    Email,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Uploaded images and the device vote ledger live under this directory.
    pub data_dir: PathBuf,
    /// Base URL clients use to reach objects in the image bucket.
    pub public_data_url: Url,
    /// Pepper mixed into every password hash.
    pub password_secret: String,
    pub max_images_per_post: usize,
    /// In bytes.
    pub max_image_size: usize,
    #[serde(rename = "regex")]
    regexes: RegexTable,
}

#[derive(Debug, Deserialize)]
struct RegexTable {
    #[serde(with = "serde_regex")]
    username: Regex,
    #[serde(with = "serde_regex")]
    password: Regex,
    #[serde(with = "serde_regex")]
    email: Regex,
}

impl Config {
    /// Reads the server configuration from config.toml.
    pub fn read() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(config_path()).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn regex(&self, regex_type: RegexType) -> &Regex {
        match regex_type {
            RegexType::Username => &self.regexes.username,
            RegexType::Password => &self.regexes.password,
            RegexType::Email => &self.regexes.email,
        }
    }

    pub fn bucket_path(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    pub fn vote_ledger_path(&self) -> PathBuf {
        self.data_dir.join("votes.json")
    }
}

// Use config.toml.dist if in development environment, config.toml if in production
fn config_path() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(var) => {
            let mut project_path = PathBuf::from(var);
            project_path.push("config.toml.dist");
            project_path
        }
        Err(_) => {
            let exe_path = std::env::current_exe().expect("Exe path should be readable");
            let mut parent_path = exe_path.parent().expect("Exe path should have parent").to_owned();
            parent_path.push("config.toml");
            parent_path
        }
    }
}

#[cfg(test)]
pub fn test_config(data_dir: Option<PathBuf>) -> Config {
    let mut config = Config::read().expect("config.toml.dist should deserialize");
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    config
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dist_config_deserializes() {
        let config = test_config(None);
        assert_eq!(config.max_images_per_post, 5);
        assert_eq!(config.max_image_size, 5 * 1024 * 1024);
    }

    #[test]
    fn validation_regexes() {
        let config = test_config(None);
        assert!(config.regex(RegexType::Username).is_match("latte_lover-42"));
        assert!(!config.regex(RegexType::Username).is_match("no"));
        assert!(!config.regex(RegexType::Username).is_match("spaces are bad"));
        assert!(config.regex(RegexType::Password).is_match("longenough"));
        assert!(!config.regex(RegexType::Password).is_match("short"));
        assert!(config.regex(RegexType::Email).is_match("user@example.com"));
        assert!(!config.regex(RegexType::Email).is_match("not-an-email"));
    }
}
