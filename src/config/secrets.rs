//! API secrets read from a local dotenv file.
//!
//! Only the keys in [`SECRET_KEYS`] are ever read or exported; anything else in
//! the file is ignored.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use tracing::debug;

use super::ConfigError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const HUGGINGFACEHUB_API_TOKEN: &str = "HUGGINGFACEHUB_API_TOKEN";

/// Every variable this crate consumes.
pub const SECRET_KEYS: [&str; 2] = [OPENAI_API_KEY, HUGGINGFACEHUB_API_TOKEN];

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    values: BTreeMap<&'static str, String>,
}

impl Secrets {
    /// Read secrets from `path`, letting variables already present in the
    /// process environment take precedence.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::resolve(path, |key| std::env::var(key).ok())
    }

    /// Like [`Secrets::from_env_file`] with an explicit process lookup.
    ///
    /// A missing file is not an error: the result then holds whatever `lookup`
    /// provides.
    pub fn resolve<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut from_file: HashMap<String, String> = HashMap::new();
        match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item?;
                    if SECRET_KEYS.contains(&key.as_str()) {
                        from_file.insert(key, value);
                    }
                }
            }
            Err(e) if e.not_found() => {
                debug!("env file {} not found, using process environment", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        let mut values = BTreeMap::new();
        for key in SECRET_KEYS {
            let value = lookup(key)
                .filter(|v| !v.is_empty())
                .or_else(|| from_file.remove(key))
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                values.insert(key, value);
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.get(OPENAI_API_KEY)
    }

    pub fn huggingface_token(&self) -> Option<&str> {
        self.get(HUGGINGFACEHUB_API_TOKEN)
    }

    /// Names of the secrets that resolved to a value.
    pub fn keys(&self) -> Vec<&'static str> {
        self.values.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy every resolved secret into the process environment and return the
    /// names that were set.
    ///
    /// Call this during start-up, before any thread other than the caller
    /// reads the environment.
    pub fn apply(&self) -> Vec<&'static str> {
        for (key, value) in &self.values {
            // SAFETY: start-up only, no concurrent environment access (see above).
            unsafe { std::env::set_var(key, value) };
            debug!("exported {}", key);
        }
        self.keys()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.values.keys() {
            map.entry(key, &"<redacted>");
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn env_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write env file");
        file
    }

    #[test]
    fn keeps_only_known_keys() {
        let file = env_file(
            "OPENAI_API_KEY=sk-test\nHUGGINGFACEHUB_API_TOKEN=hf-test\nUNRELATED_API_KEY=nope\n",
        );
        let secrets = Secrets::resolve(file.path(), |_| None).unwrap();
        assert_eq!(secrets.openai_api_key(), Some("sk-test"));
        assert_eq!(secrets.huggingface_token(), Some("hf-test"));
        assert_eq!(secrets.keys(), vec![HUGGINGFACEHUB_API_TOKEN, OPENAI_API_KEY]);
        assert_eq!(secrets.get("UNRELATED_API_KEY"), None);
    }

    #[test]
    fn process_environment_wins_over_file() {
        let file = env_file("OPENAI_API_KEY=from-file\n");
        let secrets = Secrets::resolve(file.path(), |key| {
            (key == OPENAI_API_KEY).then(|| "from-process".to_string())
        })
        .unwrap();
        assert_eq!(secrets.openai_api_key(), Some("from-process"));
        assert_eq!(secrets.huggingface_token(), None);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = Secrets::resolve(dir.path().join(".env"), |_| None).unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn empty_values_are_skipped() {
        let file = env_file("OPENAI_API_KEY=\n");
        let secrets = Secrets::resolve(file.path(), |_| None).unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn debug_output_redacts_values() {
        let file = env_file("OPENAI_API_KEY=sk-secret\n");
        let secrets = Secrets::resolve(file.path(), |_| None).unwrap();
        let shown = format!("{:?}", secrets);
        assert!(shown.contains("OPENAI_API_KEY"));
        assert!(!shown.contains("sk-secret"));
    }

    #[test]
    #[serial]
    fn apply_exports_named_variables_and_no_others() {
        let file = env_file(
            "OPENAI_API_KEY=sk-applied\nHUGGINGFACEHUB_API_TOKEN=hf-applied\nTOOL_AGENT_TEST_EXTRA=1\n",
        );
        let secrets = Secrets::resolve(file.path(), |_| None).unwrap();
        let set = secrets.apply();

        assert_eq!(set, vec![HUGGINGFACEHUB_API_TOKEN, OPENAI_API_KEY]);
        assert_eq!(std::env::var(OPENAI_API_KEY).unwrap(), "sk-applied");
        assert_eq!(std::env::var(HUGGINGFACEHUB_API_TOKEN).unwrap(), "hf-applied");
        assert!(std::env::var("TOOL_AGENT_TEST_EXTRA").is_err());

        unsafe {
            std::env::remove_var(OPENAI_API_KEY);
            std::env::remove_var(HUGGINGFACEHUB_API_TOKEN);
        }
    }
}
