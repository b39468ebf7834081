//! Class-index to label table

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{argmax, LabelError};

/// On-disk label table format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// `{"0": "tench, Tinca tinca", ...}` or `["tench, Tinca tinca", ...]`
    Json,
    /// postcard-encoded `BTreeMap<u32, String>`
    Postcard,
    /// Python pickle of an `{int: str}` dict, any protocol
    Pickle,
    /// One label per line, line N is class N
    Text,
}

impl LabelFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(LabelFormat::Json),
            Some("bin") | Some("postcard") => Some(LabelFormat::Postcard),
            Some("pkl") | Some("pickle") => Some(LabelFormat::Pickle),
            Some("txt") => Some(LabelFormat::Text),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLabels {
    // Object keys stay strings; untagged buffering loses integer-key parsing
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

/// Read-only mapping from class index to label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTable {
    labels: BTreeMap<usize, String>,
}

impl LabelTable {
    pub fn new(labels: BTreeMap<usize, String>) -> Self {
        Self { labels }
    }

    /// Build a table where the n-th label is class n
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    /// Load a table, choosing the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let format = LabelFormat::from_path(path).ok_or_else(|| LabelError::Parse {
            path: path.to_path_buf(),
            reason: "unknown label table extension (expected json, bin, postcard, pkl or txt)"
                .to_string(),
        })?;
        Self::load_as(path, format)
    }

    pub fn load_as(path: impl AsRef<Path>, format: LabelFormat) -> Result<Self, LabelError> {
        let path = path.as_ref();
        info!("Loading label table from {} ({:?})", path.display(), format);

        let bytes = std::fs::read(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |reason: String| LabelError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let table = match format {
            LabelFormat::Json => Self::from_json(&bytes).map_err(|e| parse_err(e.to_string()))?,
            LabelFormat::Postcard => {
                Self::from_postcard(&bytes).map_err(|e| parse_err(e.to_string()))?
            }
            LabelFormat::Pickle => Self::from_pickle(&bytes).map_err(|e| parse_err(e.to_string()))?,
            LabelFormat::Text => {
                let text = std::str::from_utf8(&bytes).map_err(|e| parse_err(e.to_string()))?;
                Self::from_labels(text.lines())
            }
        };

        if !table.is_contiguous() {
            warn!("Label table {} has gaps in its class indices", path.display());
        }
        debug!("Loaded {} labels", table.len());

        Ok(table)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<JsonLabels>(bytes)? {
            JsonLabels::List(labels) => Ok(Self::from_labels(labels)),
            JsonLabels::Map(labels) => labels
                .into_iter()
                .map(|(key, label)| {
                    key.parse::<usize>().map(|index| (index, label)).map_err(|_| {
                        serde::de::Error::custom(format!("class index '{key}' is not an integer"))
                    })
                })
                .collect::<Result<BTreeMap<_, _>, serde_json::Error>>()
                .map(Self::new),
        }
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        let labels: BTreeMap<u32, String> = postcard::from_bytes(bytes)?;
        Ok(Self::new(
            labels.into_iter().map(|(index, label)| (index as usize, label)).collect(),
        ))
    }

    /// Python 2 `str` labels are decoded as UTF-8
    pub fn from_pickle(bytes: &[u8]) -> Result<Self, serde_pickle::Error> {
        let labels: BTreeMap<usize, String> =
            serde_pickle::from_slice(bytes, serde_pickle::DeOptions::new().decode_strings())?;
        Ok(Self::new(labels))
    }

    /// Encode as postcard; indices must fit in `u32`
    pub fn to_postcard(&self) -> Result<Vec<u8>, String> {
        let labels = self
            .labels
            .iter()
            .map(|(&index, label)| {
                u32::try_from(index)
                    .map(|index| (index, label.as_str()))
                    .map_err(|_| format!("class index {index} does not fit in u32"))
            })
            .collect::<Result<BTreeMap<u32, &str>, String>>()?;
        postcard::to_allocvec(&labels).map_err(|e| e.to_string())
    }

    /// Write the compact binary form
    pub fn save_postcard(&self, path: impl AsRef<Path>) -> Result<(), LabelError> {
        let path = path.as_ref();
        let bytes = self.to_postcard().map_err(|reason| LabelError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        std::fs::write(path, bytes).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Label for a class index
    pub fn get(&self, index: usize) -> Result<&str, LabelError> {
        self.labels
            .get(&index)
            .map(String::as_str)
            .ok_or(LabelError::MissingIndex {
                index,
                len: self.labels.len(),
            })
    }

    /// Argmax of `scores` and its label
    pub fn resolve(&self, scores: &[f32]) -> Result<(usize, &str), LabelError> {
        let index = argmax(scores).ok_or(LabelError::NoMaximum)?;
        Ok((index, self.get(index)?))
    }

    /// Keys are exactly 0..len
    pub fn is_contiguous(&self) -> bool {
        self.labels.keys().enumerate().all(|(expected, &index)| expected == index)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
