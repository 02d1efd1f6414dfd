use chrono::Utc;
use ndarray::Array4;
use shared::{INPUT_CHANNELS, INPUT_SIZE, InferenceResponse, LabelSet, TOP_K};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{InferenceError, StartupError};
use crate::model::{Classifier, softmax};
use crate::preprocess::{check_media_type, preprocess};

/// One uploaded file, as read from the multipart body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// Owns the loaded model and the label set it was validated against.
pub struct Analyzer {
    classifier: Box<dyn Classifier>,
    labels: LabelSet,
    apply_softmax: bool,
}

impl Analyzer {
    /// Runs the model once on a blank input and refuses to start when the
    /// output length does not match the label set.
    pub fn new(
        classifier: Box<dyn Classifier>,
        labels: LabelSet,
        apply_softmax: bool,
    ) -> Result<Self, StartupError> {
        let probe = Array4::<f32>::zeros((1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS));
        let output = classifier.predict(&probe)?;
        labels.check_output_len(output.len())?;

        log::info!(
            "Model ready on {} with {} classes",
            classifier.backend_name(),
            labels.len()
        );

        Ok(Self {
            classifier,
            labels,
            apply_softmax,
        })
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn backend_name(&self) -> &'static str {
        self.classifier.backend_name()
    }

    pub fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let scores = self.classifier.predict(input)?;
        self.labels.check_output_len(scores.len())?;

        if self.apply_softmax {
            Ok(softmax(&scores))
        } else {
            Ok(scores)
        }
    }

    pub fn analyze(&self, upload: &Upload) -> Result<InferenceResponse, InferenceError> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();

        check_media_type(upload.content_type.as_deref(), &upload.bytes)?;
        let input = preprocess(&upload.bytes)?;
        let probabilities = self.classify(&input)?;
        let predictions = shared::rank(&self.labels, &probabilities, TOP_K)?;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if let Some(top) = predictions.first() {
            log::info!(
                "Request {}: {} ({}) in {:.1} ms",
                request_id,
                top.label,
                top.confidence_label(),
                elapsed_ms
            );
        }

        Ok(InferenceResponse {
            request_id,
            file_name: upload.file_name.clone(),
            predictions,
            probabilities,
            elapsed_ms,
            analyzed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::testing::FixedClassifier;
    use crate::preprocess::tests::gradient_png;

    pub(crate) const SAMPLE: [f32; 15] = [
        0.05, 0.02, 0.01, 0.01, 0.01, 0.02, 0.01, 0.01, 0.01, 0.70, 0.05, 0.03, 0.03, 0.02, 0.02,
    ];

    pub(crate) fn sample_analyzer() -> Analyzer {
        Analyzer::new(
            Box::new(FixedClassifier::new(&SAMPLE)),
            LabelSet::animals(),
            false,
        )
        .unwrap()
    }

    fn png_upload() -> Upload {
        Upload {
            bytes: gradient_png(320, 240),
            content_type: Some("image/png".to_string()),
            file_name: Some("horse.png".to_string()),
        }
    }

    #[test]
    fn test_analyze_end_to_end() {
        let response = sample_analyzer().analyze(&png_upload()).unwrap();

        let labels: Vec<&str> = response.predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Horse", "Bear", "Lion"]);

        let confidences: Vec<String> = response
            .predictions
            .iter()
            .map(|p| p.confidence_label())
            .collect();
        assert_eq!(confidences, vec!["70.00%", "5.00%", "3.00%"]);

        assert_eq!(response.probabilities.len(), 15);
        assert_eq!(response.file_name.as_deref(), Some("horse.png"));
    }

    #[test]
    fn test_label_mismatch_fails_at_startup() {
        let result = Analyzer::new(
            Box::new(FixedClassifier::new(&[0.1; 1000])),
            LabelSet::animals(),
            false,
        );
        assert!(matches!(result, Err(StartupError::LabelMismatch(_))));
    }

    #[test]
    fn test_softmax_applied_to_logits() {
        let mut logits = [0.0f32; 15];
        logits[4] = 5.0;
        let analyzer = Analyzer::new(
            Box::new(FixedClassifier::new(&logits)),
            LabelSet::animals(),
            true,
        )
        .unwrap();

        let response = analyzer.analyze(&png_upload()).unwrap();
        let sum: f32 = response.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(response.predictions[0].label, "Deer");
    }

    #[test]
    fn test_rejected_uploads() {
        let analyzer = sample_analyzer();

        let corrupt = Upload {
            bytes: b"not an image".to_vec(),
            content_type: Some("image/jpeg".to_string()),
            file_name: None,
        };
        assert!(matches!(
            analyzer.analyze(&corrupt),
            Err(InferenceError::Decode(_))
        ));

        let text = Upload {
            content_type: Some("text/plain".to_string()),
            ..png_upload()
        };
        assert!(matches!(
            analyzer.analyze(&text),
            Err(InferenceError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_each_analysis_is_independent() {
        let analyzer = sample_analyzer();
        let first = analyzer.analyze(&png_upload()).unwrap();
        let second = analyzer.analyze(&png_upload()).unwrap();
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(first.predictions, second.predictions);
    }
}
