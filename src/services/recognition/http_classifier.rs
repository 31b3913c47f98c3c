use super::classifier::AbilityClassifier;
use super::preprocess;
use crate::error::ClassifierError;
use crate::models::config::RecognitionConfig;
use crate::models::recognition::{LabelSet, Recognition};
use crate::models::region::Region;
use base64::{engine::general_purpose, Engine as _};
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for the local classification server
#[derive(Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
    labels: LabelSet,
    confidence_threshold: f32,
}

#[derive(Serialize)]
struct ClassifyRequest {
    image_base64: String,
}

#[derive(Serialize)]
struct BatchClassifyRequest {
    images_base64: Vec<String>,
}

#[derive(Deserialize)]
struct Prediction {
    label: String,
    confidence: f32,
}

#[derive(Deserialize)]
struct BatchResponse {
    predictions: Vec<Prediction>,
}

impl HttpClassifier {
    /// Create a new classifier client
    pub fn new(config: &RecognitionConfig, labels: LabelSet) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ClassifierError::Request(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            labels,
            confidence_threshold: config.confidence_threshold,
        })
    }

    /// Crop and encode regions off the async runtime
    async fn encode_regions(
        &self,
        frame: &RgbaImage,
        regions: &[Region],
    ) -> Result<Vec<String>, ClassifierError> {
        let frame = frame.clone();
        let rects: Vec<_> = regions.iter().map(|r| r.rect).collect();

        tokio::task::spawn_blocking(move || {
            rects
                .par_iter()
                .map(|rect| {
                    preprocess::region_to_png(&frame, rect)
                        .map(|png| general_purpose::STANDARD.encode(png))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| ClassifierError::Encoding(format!("encode task failed: {}", e)))?
    }

    /// Apply the confidence threshold and label-set check
    ///
    /// The server is trusted for confidence but not for label validity: a
    /// label outside the trained set is treated as an empty slot.
    fn normalize(&self, prediction: Prediction) -> Recognition {
        if prediction.confidence < self.confidence_threshold
            || !self.labels.contains(&prediction.label)
        {
            return Recognition {
                label: None,
                confidence: prediction.confidence,
            };
        }

        Recognition {
            label: Some(prediction.label),
            confidence: prediction.confidence,
        }
    }
}

impl AbilityClassifier for HttpClassifier {
    async fn recognize(
        &self,
        frame: &RgbaImage,
        region: &Region,
    ) -> Result<Recognition, ClassifierError> {
        let mut images = self.encode_regions(frame, std::slice::from_ref(region)).await?;
        let image_base64 = images
            .pop()
            .ok_or_else(|| ClassifierError::Encoding("no crop produced".to_string()))?;

        let url = format!("{}/classify", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ClassifyRequest { image_base64 })
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status().as_u16()));
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        Ok(self.normalize(prediction))
    }

    async fn recognize_batch(
        &self,
        frame: &RgbaImage,
        regions: &[Region],
    ) -> Result<Vec<Recognition>, ClassifierError> {
        if regions.is_empty() {
            return Ok(Vec::new());
        }

        let images_base64 = self.encode_regions(frame, regions).await?;

        let url = format!("{}/classify_batch", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&BatchClassifyRequest { images_base64 })
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status().as_u16()));
        }

        let data: BatchResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        if data.predictions.len() != regions.len() {
            return Err(ClassifierError::InvalidResponse(format!(
                "expected {} predictions, got {}",
                regions.len(),
                data.predictions.len()
            )));
        }

        Ok(data
            .predictions
            .into_iter()
            .map(|p| self.normalize(p))
            .collect())
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_classifier() -> HttpClassifier {
        let labels = LabelSet::new(vec![
            "cold_snap".to_string(),
            "chaos_bolt".to_string(),
        ])
        .unwrap();
        HttpClassifier::new(&RecognitionConfig::default(), labels).unwrap()
    }

    #[test]
    fn test_normalize_accepts_confident_known_label() {
        let classifier = test_classifier();
        let recognition = classifier.normalize(Prediction {
            label: "cold_snap".to_string(),
            confidence: 0.93,
        });

        assert_eq!(recognition.label.as_deref(), Some("cold_snap"));
        assert_eq!(recognition.confidence, 0.93);
    }

    #[test]
    fn test_normalize_rejects_low_confidence() {
        let classifier = test_classifier();
        let recognition = classifier.normalize(Prediction {
            label: "cold_snap".to_string(),
            confidence: 0.4,
        });

        assert!(recognition.label.is_none());
        assert_eq!(recognition.confidence, 0.4, "confidence is still reported");
    }

    #[test]
    fn test_normalize_rejects_unknown_label() {
        let classifier = test_classifier();
        let recognition = classifier.normalize(Prediction {
            label: "not_in_training_set".to_string(),
            confidence: 0.99,
        });

        assert!(recognition.label.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let labels = LabelSet::new(vec!["a".to_string()]).unwrap();
        let config = RecognitionConfig {
            server_url: "http://127.0.0.1:39817/".to_string(),
            ..RecognitionConfig::default()
        };
        let classifier = HttpClassifier::new(&config, labels).unwrap();
        assert_eq!(classifier.base_url, "http://127.0.0.1:39817");
    }
}
