use std::collections::HashMap;
use std::path::{Path, PathBuf};

const NAME_MARKER: &str = "--";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read query catalog {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("query {0:?} is defined more than once")]
    DuplicateQuery(String),
    #[error("query marker on line {0} has no name")]
    UnnamedQuery(usize),
    #[error("query {0:?} not found in catalog")]
    MissingQuery(String),
}

/// Immutable map from symbolic query name to SQL text.
///
/// A line starting with `--` names the block that follows; the block's lines
/// are joined with single spaces until the next marker or end of input.
#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    queries: HashMap<String, String>,
}

impl QueryCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), queries = catalog.len(), "query catalog loaded");
        Ok(catalog)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut queries = HashMap::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for (index, line) in text.lines().enumerate() {
            if let Some(name) = line.strip_prefix(NAME_MARKER) {
                if let Some((key, body)) = current.take() {
                    insert_unique(&mut queries, key, &body)?;
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(ConfigError::UnnamedQuery(index + 1));
                }
                current = Some((name.to_owned(), Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                let line = line.trim();
                if !line.is_empty() {
                    body.push(line);
                }
            }
        }

        if let Some((key, body)) = current {
            insert_unique(&mut queries, key, &body)?;
        }

        Ok(Self { queries })
    }

    pub fn get(&self, name: &str) -> Result<&str, ConfigError> {
        self.queries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingQuery(name.to_owned()))
    }

    /// Fails on the first name the catalog does not define.
    pub fn require_all(&self, names: &[&str]) -> Result<(), ConfigError> {
        names.iter().try_for_each(|name| self.get(name).map(|_| ()))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

fn insert_unique(
    queries: &mut HashMap<String, String>,
    key: String,
    body: &[&str],
) -> Result<(), ConfigError> {
    if queries.contains_key(&key) {
        return Err(ConfigError::DuplicateQuery(key));
    }
    queries.insert(key, body.join(" ").trim().to_owned());
    Ok(())
}
