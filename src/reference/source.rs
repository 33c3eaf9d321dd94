//! Where reference data comes from: a data directory, an HTTP endpoint, or memory.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::boss::Boss;
use crate::data::item::{Item, ItemId};
use crate::data::loader::{
    parse_dataset, LoadError, BOSSES_FILE, ITEMS_FILE, SPECIAL_ATTACKS_FILE,
};
use crate::data::lookup::ItemResolutionError;
use crate::data::special::SpecialAttack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSet {
    Items,
    Bosses,
    SpecialAttacks,
}

impl DataSet {
    pub const ALL: [DataSet; 3] = [DataSet::Items, DataSet::Bosses, DataSet::SpecialAttacks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Bosses => "bosses",
            Self::SpecialAttacks => "special_attacks",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Items => ITEMS_FILE,
            Self::Bosses => BOSSES_FILE,
            Self::SpecialAttacks => SPECIAL_ATTACKS_FILE,
        }
    }

    /// Share of bootstrap progress this data set accounts for. Items dominate the payload.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Items => 0.6,
            Self::Bosses => 0.25,
            Self::SpecialAttacks => 0.15,
        }
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSetPayload {
    Items(Vec<Item>),
    Bosses(Vec<Boss>),
    SpecialAttacks(Vec<SpecialAttack>),
}

impl DataSetPayload {
    pub fn dataset(&self) -> DataSet {
        match self {
            Self::Items(_) => DataSet::Items,
            Self::Bosses(_) => DataSet::Bosses,
            Self::SpecialAttacks(_) => DataSet::SpecialAttacks,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Bosses(bosses) => bosses.len(),
            Self::SpecialAttacks(specs) => specs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parse(dataset: DataSet, raw: &str, origin: &str) -> Result<Self, LoadError> {
        let path = PathBuf::from(origin);
        let key = dataset.as_str();
        Ok(match dataset {
            DataSet::Items => Self::Items(parse_dataset(raw, key, &path)?),
            DataSet::Bosses => Self::Bosses(parse_dataset(raw, key, &path)?),
            DataSet::SpecialAttacks => Self::SpecialAttacks(parse_dataset(raw, key, &path)?),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch(&self, dataset: DataSet) -> Result<DataSetPayload, SourceError>;

    /// Fetch items outside of a bootstrap. Results line up with `ids`. The default reads
    /// the whole item set once and picks every requested id out of it.
    async fn fetch_items(&self, ids: &[ItemId]) -> Vec<Result<Item, ItemResolutionError>> {
        if ids.is_empty() {
            return Vec::new();
        }
        let items: HashMap<ItemId, Item> = match self.fetch(DataSet::Items).await {
            Ok(DataSetPayload::Items(items)) => {
                items.into_iter().map(|item| (item.id, item)).collect()
            }
            Ok(other) => {
                let message = format!("source returned {} instead of items", other.dataset());
                return source_failures(ids, &message);
            }
            Err(err) => return source_failures(ids, &err.to_string()),
        };
        ids.iter()
            .map(|&id| items.get(&id).cloned().ok_or(ItemResolutionError::NotFound(id)))
            .collect()
    }

    fn describe(&self) -> String;
}

fn source_failures(ids: &[ItemId], message: &str) -> Vec<Result<Item, ItemResolutionError>> {
    ids.iter()
        .map(|&id| {
            Err(ItemResolutionError::Source {
                id,
                message: message.to_string(),
            })
        })
        .collect()
}

/// Reads `<dir>/items.json`, `<dir>/bosses.json` and `<dir>/special_attacks.json`.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReferenceSource for FileSource {
    async fn fetch(&self, dataset: DataSet) -> Result<DataSetPayload, SourceError> {
        let path = self.dir.join(dataset.file_name());
        debug!(path = %path.display(), "reading reference data");
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
        let origin = path.display().to_string();
        Ok(DataSetPayload::parse(dataset, &raw, &origin)?)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Fetches `{base}/items.json` etc. over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SourceError::Http {
                url: base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ReferenceSource for HttpSource {
    async fn fetch(&self, dataset: DataSet) -> Result<DataSetPayload, SourceError> {
        let url = format!("{}/{}", self.base_url, dataset.file_name());
        debug!(%url, "fetching reference data");
        let http_err = |message: String| SourceError::Http {
            url: url.clone(),
            message,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| http_err(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(http_err(format!("status {status}")));
        }
        let raw = response.text().await.map_err(|err| http_err(err.to_string()))?;
        Ok(DataSetPayload::parse(dataset, &raw, &url)?)
    }

    fn describe(&self) -> String {
        format!("url {}", self.base_url)
    }
}

/// Fixed in-memory data sets, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub items: Vec<Item>,
    pub bosses: Vec<Boss>,
    pub special_attacks: Vec<SpecialAttack>,
}

#[async_trait]
impl ReferenceSource for MemorySource {
    async fn fetch(&self, dataset: DataSet) -> Result<DataSetPayload, SourceError> {
        Ok(match dataset {
            DataSet::Items => DataSetPayload::Items(self.items.clone()),
            DataSet::Bosses => DataSetPayload::Bosses(self.bosses.clone()),
            DataSet::SpecialAttacks => DataSetPayload::SpecialAttacks(self.special_attacks.clone()),
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
