//! Placeholder animal classifier for report photos.
//!
//! This is NOT a trained model. It buckets a photo by pixel area and aspect
//! ratio into fixed labels with fixed confidences so that report forms can
//! be pre-filled. Treat its output as a hint, never as ground truth.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::AnimalType;

/// Best-guess label for a photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Option<AnimalType>,
    pub confidence: f64,
}

impl Classification {
    /// Result for input that could not be decoded
    pub fn unknown() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBucket {
    Reddish,
    Greenish,
    Bluish,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Large,
    Small,
}

/// Coarse, informational image features; never used to pick a label
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    #[serde(rename = "dominantColor")]
    pub dominant_color: Option<ColorBucket>,
    pub size: Option<SizeBucket>,
}

/// Fixed threshold and confidence table
///
/// Fields missing from a config table keep their default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Pixel area above which a photo counts as a large animal
    pub large_area: f64,
    /// Pixel area above which a photo counts as a medium animal
    pub medium_area: f64,
    /// Width/height ratio above which a large animal is labelled a dog
    pub dog_aspect_ratio: f64,
    pub dog_confidence: f64,
    pub cat_confidence: f64,
    pub rabbit_confidence: f64,
    pub bird_confidence: f64,
    /// Pixel area above which the feature probe reports `large`
    pub large_image_area: f64,
    /// How far a channel mean must exceed the others to dominate (0.1 = 10%)
    pub color_dominance: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            large_area: 10_000.0,
            medium_area: 5_000.0,
            dog_aspect_ratio: 1.2,
            dog_confidence: 0.65,
            cat_confidence: 0.60,
            rabbit_confidence: 0.55,
            bird_confidence: 0.50,
            large_image_area: 500_000.0,
            color_dominance: 0.10,
        }
    }
}

/// Size/aspect-ratio heuristic classifier
///
/// Stateless apart from its threshold table; construct one at startup and
/// share it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimalClassifier {
    thresholds: ClassifierThresholds,
}

impl AnimalClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Classify encoded image bytes (any format the `image` crate decodes)
    pub fn classify_bytes(&self, bytes: &[u8]) -> Classification {
        match image::load_from_memory(bytes) {
            Ok(img) => self.classify_image(&img),
            Err(e) => {
                tracing::debug!("Could not decode image for classification: {}", e);
                Classification::unknown()
            }
        }
    }

    /// Classify an image file on disk
    pub fn classify_path(&self, path: &Path) -> Classification {
        match image::open(path) {
            Ok(img) => self.classify_image(&img),
            Err(e) => {
                tracing::debug!("Could not open {:?} for classification: {}", path, e);
                Classification::unknown()
            }
        }
    }

    /// Classify an already decoded image
    pub fn classify_image(&self, img: &DynamicImage) -> Classification {
        let (width, height) = img.dimensions();
        self.classify_dimensions(width, height)
    }

    /// The heuristic itself, on raw dimensions
    pub fn classify_dimensions(&self, width: u32, height: u32) -> Classification {
        let t = &self.thresholds;
        let area = width as f64 * height as f64;
        let aspect_ratio = if height > 0 {
            width as f64 / height as f64
        } else {
            1.0
        };

        let (label, confidence) = if area > t.large_area {
            if aspect_ratio > t.dog_aspect_ratio {
                (AnimalType::Dog, t.dog_confidence)
            } else {
                (AnimalType::Cat, t.cat_confidence)
            }
        } else if area > t.medium_area {
            (AnimalType::Rabbit, t.rabbit_confidence)
        } else {
            (AnimalType::Bird, t.bird_confidence)
        };

        Classification {
            label: Some(label),
            confidence,
        }
    }

    /// Probe dominant colour and size of encoded image bytes
    ///
    /// Undecodable input yields empty features.
    pub fn probe_bytes(&self, bytes: &[u8]) -> ImageFeatures {
        match image::load_from_memory(bytes) {
            Ok(img) => self.probe_image(&img),
            Err(_) => ImageFeatures::default(),
        }
    }

    /// Classify and extract features from a single decode
    pub fn analyze_bytes(&self, bytes: &[u8]) -> (Classification, ImageFeatures) {
        match image::load_from_memory(bytes) {
            Ok(img) => (self.classify_image(&img), self.probe_image(&img)),
            Err(e) => {
                tracing::debug!("Could not decode image for analysis: {}", e);
                (Classification::unknown(), ImageFeatures::default())
            }
        }
    }

    pub fn probe_image(&self, img: &DynamicImage) -> ImageFeatures {
        let (width, height) = img.dimensions();
        let area = width as f64 * height as f64;

        let size = if area > self.thresholds.large_image_area {
            SizeBucket::Large
        } else {
            SizeBucket::Small
        };

        ImageFeatures {
            dominant_color: self.dominant_color(img),
            size: Some(size),
        }
    }

    fn dominant_color(&self, img: &DynamicImage) -> Option<ColorBucket> {
        let rgb = img.to_rgb8();
        let pixels = rgb.width() as usize * rgb.height() as usize;
        if pixels == 0 {
            return None;
        }

        let mut sums = [0u64; 3];
        for pixel in rgb.pixels() {
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += channel as u64;
            }
        }
        let means = sums.map(|s| s as f64 / pixels as f64);

        let factor = 1.0 + self.thresholds.color_dominance;
        let dominates = |i: usize| {
            (0..3)
                .filter(|&j| j != i)
                .all(|j| means[i] > means[j] * factor)
        };

        Some(if dominates(0) {
            ColorBucket::Reddish
        } else if dominates(1) {
            ColorBucket::Greenish
        } else if dominates(2) {
            ColorBucket::Bluish
        } else {
            ColorBucket::Mixed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_buckets() {
        let classifier = AnimalClassifier::default();

        let dog = classifier.classify_dimensions(200, 100);
        assert_eq!(dog.label, Some(AnimalType::Dog));
        assert_eq!(dog.confidence, 0.65);

        let cat = classifier.classify_dimensions(120, 120);
        assert_eq!(cat.label, Some(AnimalType::Cat));
        assert_eq!(cat.confidence, 0.60);

        let rabbit = classifier.classify_dimensions(80, 80);
        assert_eq!(rabbit.label, Some(AnimalType::Rabbit));

        let bird = classifier.classify_dimensions(50, 50);
        assert_eq!(bird.label, Some(AnimalType::Bird));
        assert_eq!(bird.confidence, 0.50);
    }

    #[test]
    fn test_area_thresholds_are_exclusive() {
        let classifier = AnimalClassifier::default();
        // exactly 10_000 pixels is not "large"
        assert_eq!(classifier.classify_dimensions(100, 100).label, Some(AnimalType::Rabbit));
        // exactly 5_000 pixels is not "medium"
        assert_eq!(classifier.classify_dimensions(100, 50).label, Some(AnimalType::Bird));
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        let classifier = AnimalClassifier::default();
        assert_eq!(classifier.classify_dimensions(500, 0).label, Some(AnimalType::Bird));
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = AnimalClassifier::new(ClassifierThresholds {
            dog_confidence: 0.9,
            ..ClassifierThresholds::default()
        });
        assert_eq!(classifier.classify_dimensions(300, 100).confidence, 0.9);
    }

    #[test]
    fn test_undecodable_bytes() {
        let classifier = AnimalClassifier::default();
        assert_eq!(classifier.classify_bytes(b"not an image"), Classification::unknown());
        assert_eq!(classifier.probe_bytes(b""), ImageFeatures::default());
    }

    #[test]
    fn test_missing_file() {
        let classifier = AnimalClassifier::default();
        let result = classifier.classify_path(Path::new("/nonexistent/photo.jpg"));
        assert_eq!(result, Classification::unknown());
    }

    #[test]
    fn test_dominant_color() {
        let classifier = AnimalClassifier::default();

        let solid = |rgb: [u8; 3]| {
            DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 4, image::Rgb(rgb)))
        };

        let red = solid([200, 40, 40]);
        assert_eq!(classifier.probe_image(&red).dominant_color, Some(ColorBucket::Reddish));

        let blue = solid([10, 20, 90]);
        assert_eq!(classifier.probe_image(&blue).dominant_color, Some(ColorBucket::Bluish));

        let grey = solid([100, 100, 100]);
        let features = classifier.probe_image(&grey);
        assert_eq!(features.dominant_color, Some(ColorBucket::Mixed));
        assert_eq!(features.size, Some(SizeBucket::Small));
    }
}
