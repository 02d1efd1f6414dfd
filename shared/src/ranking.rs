use serde::{Deserialize, Serialize};

use crate::labels::{LabelMismatch, LabelSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Index into the model output vector.
    pub index: usize,
    pub label: String,
    pub probability: f32,
}

impl Prediction {
    pub fn confidence_percent(&self) -> f64 {
        f64::from(self.probability) * 100.0
    }

    pub fn confidence_label(&self) -> String {
        format_confidence(self.probability)
    }

    pub fn bar_width(&self) -> f32 {
        bar_width(self.probability)
    }
}

/// Formats a probability as a percentage with two decimals, e.g. `96.34%`.
/// NaN renders as `0.00%`, matching its empty bar.
pub fn format_confidence(probability: f32) -> String {
    if probability.is_nan() {
        return "0.00%".to_string();
    }
    format!("{:.2}%", f64::from(probability) * 100.0)
}

/// Width of a confidence bar in percent of its container.
pub fn bar_width(probability: f32) -> f32 {
    if probability.is_nan() {
        return 0.0;
    }
    (probability * 100.0).clamp(0.0, 100.0)
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() { f32::NEG_INFINITY } else { score }
}

/// Returns the `k` highest scores as `(index, score)` pairs, best first.
///
/// Equal scores keep ascending index order, so a lower label index wins a
/// tie. NaN scores rank below every number.
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        sort_key(b.1)
            .total_cmp(&sort_key(a.1))
            .then_with(|| a.0.cmp(&b.0))
    });
    indexed.truncate(k);
    indexed
}

/// Pairs the `k` best scores with their labels.
pub fn rank(
    labels: &LabelSet,
    probabilities: &[f32],
    k: usize,
) -> Result<Vec<Prediction>, LabelMismatch> {
    labels.check_output_len(probabilities.len())?;

    let predictions = top_k(probabilities, k)
        .into_iter()
        .enumerate()
        .filter_map(|(position, (index, probability))| {
            labels.get(index).map(|label| Prediction {
                rank: position + 1,
                index,
                label: label.to_string(),
                probability,
            })
        })
        .collect();
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TOP_K;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SAMPLE: [f32; 15] = [
        0.05, 0.02, 0.01, 0.01, 0.01, 0.02, 0.01, 0.01, 0.01, 0.70, 0.05, 0.03, 0.03, 0.02, 0.02,
    ];

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.9634), "96.34%");
        assert_eq!(format_confidence(0.70), "70.00%");
        assert_eq!(format_confidence(0.05), "5.00%");
        assert_eq!(format_confidence(0.0), "0.00%");
        assert_eq!(format_confidence(1.0), "100.00%");
        assert_eq!(format_confidence(f32::NAN), "0.00%");
    }

    #[test]
    fn test_bar_width_is_clamped() {
        assert_eq!(bar_width(0.5), 50.0);
        assert_eq!(bar_width(1.7), 100.0);
        assert_eq!(bar_width(-0.2), 0.0);
        assert_eq!(bar_width(f32::NAN), 0.0);
    }

    #[test]
    fn test_sample_vector_ranking() {
        let predictions = rank(&LabelSet::animals(), &SAMPLE, TOP_K).unwrap();

        let summary: Vec<(&str, String)> = predictions
            .iter()
            .map(|p| (p.label.as_str(), p.confidence_label()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Horse", "70.00%".to_string()),
                ("Bear", "5.00%".to_string()),
                ("Lion", "3.00%".to_string()),
            ]
        );
        assert_eq!(
            predictions.iter().map(|p| p.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(predictions[0].index, 9);
    }

    #[test]
    fn test_ties_break_by_ascending_index() {
        let scores = [0.2, 0.2, 0.2, 0.2];
        let indices: Vec<usize> = top_k(&scores, 3).into_iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_nan_ranks_last() {
        let scores = [f32::NAN, 0.1, 0.4, f32::NAN, 0.3];
        let indices: Vec<usize> = top_k(&scores, 3).into_iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![2, 4, 1]);
    }

    #[test]
    fn test_k_larger_than_input() {
        assert_eq!(top_k(&[0.3, 0.7], 3), vec![(1, 0.7), (0, 0.3)]);
        assert!(top_k(&[], 3).is_empty());
    }

    #[test]
    fn test_rank_rejects_wrong_length() {
        let err = rank(&LabelSet::animals(), &[0.5, 0.5], TOP_K).unwrap_err();
        assert_eq!(err.expected, 15);
        assert_eq!(err.actual, 2);
    }

    #[test]
    fn test_top_three_dominates_rest() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let mut scores: Vec<f32> = (0..15).map(|_| rng.random_range(0.0..1.0)).collect();
            // Force some ties.
            if rng.random_bool(0.3) {
                scores[3] = scores[7];
            }

            let picked = top_k(&scores, 3);
            assert_eq!(picked.len(), 3);
            assert!(picked.windows(2).all(|w| w[0].1 >= w[1].1));

            let lowest_picked = picked[2].1;
            for (i, &s) in scores.iter().enumerate() {
                if !picked.iter().any(|(p, _)| *p == i) {
                    assert!(lowest_picked >= s);
                }
            }
        }
    }

    #[test]
    fn test_prediction_serialization() {
        let prediction = Prediction {
            rank: 1,
            index: 9,
            label: "Horse".into(),
            probability: 0.5,
        };
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["label"], "Horse");
        assert_eq!(json["index"], 9);
        let back: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(back, prediction);
    }
}
