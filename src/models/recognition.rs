use crate::models::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Classifier output for a single region
///
/// `label` is None when nothing cleared the confidence threshold or the
/// slot is visually empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recognition {
    pub label: Option<String>,
    pub confidence: f32,
}

impl Recognition {
    /// An unrecognized or empty slot
    pub fn empty() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }

    /// A recognized label with its confidence
    pub fn confident(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: Some(label.into()),
            confidence,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.label.is_some()
    }
}

/// Recognition paired with the region it was taken from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognitionResult {
    pub region: Region,
    pub recognition: Recognition,
}

impl RecognitionResult {
    pub fn new(region: Region, recognition: Recognition) -> Self {
        Self {
            region,
            recognition,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.recognition.label.as_deref()
    }
}

/// Ordered class labels the classifier model was trained on
///
/// Loaded from the label file shipped next to the model. Order matters to
/// the model server; membership checks use the side index.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<String>,
    index: HashSet<String>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self, String> {
        if labels.is_empty() {
            return Err("label set is empty".to_string());
        }

        let index: HashSet<String> = labels.iter().cloned().collect();
        Ok(Self { labels, index })
    }

    /// Parse the label file content (a JSON array of class names)
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let labels: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| format!("failed to parse label set: {}", e))?;
        Self::new(labels)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
