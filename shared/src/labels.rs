use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// Classes the model was trained on. The discriminant of each variant is the
/// index of its score in the model output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumCount,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
    FromRepr,
)]
#[repr(usize)]
pub enum Animal {
    Bear = 0,
    Bird = 1,
    Cat = 2,
    Cow = 3,
    Deer = 4,
    Dog = 5,
    Dolphin = 6,
    Elephant = 7,
    Giraffe = 8,
    Horse = 9,
    Kangaroo = 10,
    Lion = 11,
    Panda = 12,
    Tiger = 13,
    Zebra = 14,
}

impl Animal {
    pub fn index(self) -> usize {
        self as usize
    }
}

pub const NUM_CLASSES: usize = Animal::COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("model produced {actual} scores but the label set has {expected} entries")]
pub struct LabelMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Ordered class names, index-aligned with the model output vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn animals() -> Self {
        Self::new(Animal::iter().map(|a| a.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn check_output_len(&self, actual: usize) -> Result<(), LabelMismatch> {
        if actual == self.labels.len() {
            Ok(())
        } else {
            Err(LabelMismatch {
                expected: self.labels.len(),
                actual,
            })
        }
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::animals()
    }
}
