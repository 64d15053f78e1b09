//! Descriptor and keypoint types produced by the extraction layer.
//!
//! These types are part of the public contract between the extractor and the
//! matcher: the matcher treats a [`Descriptor`] as opaque beyond its Hamming
//! distance, and a [`DescriptorSet`] preserves extraction order so downstream
//! pairings can refer to descriptors by index.

use serde::{Deserialize, Serialize};

/// Number of bytes in one binary descriptor (256 bits).
pub const DESCRIPTOR_BYTES: usize = 32;

/// 256-bit binary descriptor summarizing one local image neighborhood.
///
/// Bit `i` records a single smoothed-intensity comparison between two sample
/// points of the extractor's sampling pattern. Two descriptors produced with
/// different [`crate::config::ExtractorConfig`] values (and therefore
/// different patterns) are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor(pub [u8; DESCRIPTOR_BYTES]);

impl Descriptor {
    /// Bit-wise Hamming distance to `other`.
    ///
    /// Ranges from 0 (identical) to `8 * DESCRIPTOR_BYTES`.
    pub fn hamming(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Detected corner position with its detector response.
///
/// Coordinates are pixel positions in the source image; `response` is the
/// detector's contrast score, used only to rank keypoints when capping a set
/// at `max_features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: u32,
    pub y: u32,
    pub response: u32,
}

/// Ordered descriptors (with their keypoints) for one image.
///
/// May be empty: a uniform or low-texture image yields no keypoints, and that
/// is an expected outcome rather than an error. Invariant: `keypoints` and
/// `descriptors` have equal length and correspond index-for-index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    /// Build a set from matching keypoint/descriptor sequences.
    ///
    /// Panics in debug builds if the lengths disagree; the extractor is the
    /// only producer and always emits them pairwise.
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> Self {
        debug_assert_eq!(keypoints.len(), descriptors.len());
        Self {
            keypoints,
            descriptors,
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }
}
