//! Keypoint detection and binary descriptor extraction.
//!
//! ## Contract
//!
//! - Extraction is a pure function of `(pixels, config)`: no I/O, no clocks,
//!   no global state. The same [`ExtractorConfig`] always yields the same
//!   [`DescriptorSet`] for the same pixels.
//! - A keypoint-free image (uniform color, or too small for the sampling
//!   patch) yields an **empty** set, never an error.
//! - The query and every candidate of a session must go through the same
//!   extractor instance so descriptor distances stay comparable.
//!
//! The default [`FastBriefExtractor`] detects FAST-9 corners on raw luma,
//! ranks them by contrast response with 3x3 non-maximum suppression, and
//! describes the strongest ones with 256 smoothed-intensity comparisons
//! drawn once per extractor from a seeded generator.

use image::{imageops, GrayImage};

use crate::config::{ConfigError, ExtractorConfig};
use crate::descriptor::{Descriptor, DescriptorSet, Keypoint, DESCRIPTOR_BYTES};

/// Current extraction algorithm version.
pub const EXTRACT_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const EXTRACT_ALGORITHM: &str = "fast9_brief256_v1";

/// Sigma of the Gaussian pre-blur applied before descriptor sampling.
/// Detection runs on the raw luma; only sampling sees the smoothed pixels.
const SAMPLING_BLUR_SIGMA: f32 = 1.0;

/// Minimum contiguous circle pixels for the FAST-9 segment test.
const FAST_ARC: u32 = 9;

/// Radius of the FAST test circle.
const FAST_RADIUS: u32 = 3;

/// Bresenham circle of radius 3 around a candidate corner, clockwise from
/// twelve o'clock. Compass points are indices 0, 4, 8, 12.
const CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Turns one image into a set of local binary descriptors.
///
/// Implementations must be deterministic for a fixed configuration and must
/// return an empty set (rather than fail) when the image has no detectable
/// keypoints. `Send + Sync` so sessions can fan candidates out to a worker
/// pool.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &GrayImage) -> DescriptorSet;
}

/// FAST-9 corner detector + seeded BRIEF-256 descriptors.
pub struct FastBriefExtractor {
    cfg: ExtractorConfig,
    pattern: Vec<((i32, i32), (i32, i32))>,
}

impl FastBriefExtractor {
    /// Build an extractor, validating the config and deriving the sampling
    /// pattern from its seed.
    pub fn new(cfg: ExtractorConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let span = (cfg.patch_size as i32 - 1) / 2;
        Ok(Self {
            cfg,
            pattern: sampling_pattern(cfg.seed, span),
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }

    fn describe(&self, smoothed: &GrayImage, kp: &Keypoint) -> Descriptor {
        let mut bytes = [0u8; DESCRIPTOR_BYTES];
        let (cx, cy) = (kp.x as i32, kp.y as i32);
        for (i, ((ax, ay), (bx, by))) in self.pattern.iter().enumerate() {
            let a = smoothed.get_pixel((cx + ax) as u32, (cy + ay) as u32)[0];
            let b = smoothed.get_pixel((cx + bx) as u32, (cy + by) as u32)[0];
            if a < b {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Descriptor(bytes)
    }
}

impl FeatureExtractor for FastBriefExtractor {
    fn extract(&self, image: &GrayImage) -> DescriptorSet {
        let (width, height) = image.dimensions();
        let span = (self.cfg.patch_size as u32 - 1) / 2;
        let border = span.max(FAST_RADIUS);
        if width <= 2 * border || height <= 2 * border {
            return DescriptorSet::default();
        }

        // Segment test on raw luma; the response map doubles as the
        // non-maximum-suppression workspace (0 = not a corner, and any
        // accepted corner scores at least FAST_ARC * threshold > 0).
        let threshold = i32::from(self.cfg.fast_threshold);
        let mut response = vec![0u32; (width * height) as usize];
        for y in border..height - border {
            for x in border..width - border {
                if let Some(score) = fast9_score(image, x, y, threshold) {
                    response[(y * width + x) as usize] = score;
                }
            }
        }

        let mut keypoints = Vec::new();
        for y in border..height - border {
            for x in border..width - border {
                let r = response[(y * width + x) as usize];
                if r == 0 {
                    continue;
                }
                let suppressed = (-1..=1).any(|dy: i32| {
                    (-1..=1).any(|dx: i32| {
                        let nx = (x as i32 + dx) as u32;
                        let ny = (y as i32 + dy) as u32;
                        response[(ny * width + nx) as usize] > r
                    })
                });
                if !suppressed {
                    keypoints.push(Keypoint { x, y, response: r });
                }
            }
        }

        // Strongest first; row-major position as the deterministic tie-break.
        keypoints.sort_by(|a, b| {
            b.response
                .cmp(&a.response)
                .then(a.y.cmp(&b.y))
                .then(a.x.cmp(&b.x))
        });
        keypoints.truncate(self.cfg.max_features);

        if keypoints.is_empty() {
            return DescriptorSet::default();
        }

        let smoothed = imageops::blur(image, SAMPLING_BLUR_SIGMA);
        let descriptors = keypoints
            .iter()
            .map(|kp| self.describe(&smoothed, kp))
            .collect();
        DescriptorSet::new(keypoints, descriptors)
    }
}

/// FAST-9 segment test at (x, y). Returns the contrast response when the
/// circle has >= 9 contiguous pixels all brighter than center + t or all
/// darker than center - t, else `None`. The caller guarantees the circle is
/// in bounds.
fn fast9_score(image: &GrayImage, x: u32, y: u32, threshold: i32) -> Option<u32> {
    let center = i32::from(image.get_pixel(x, y)[0]);
    let circle_pixel = |k: usize| {
        let (dx, dy) = CIRCLE[k];
        i32::from(image.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0])
    };

    // Quick reject on the four compass pixels: any 9-arc covers at least two
    // of them on the same side of the threshold.
    let compass = [
        circle_pixel(0),
        circle_pixel(4),
        circle_pixel(8),
        circle_pixel(12),
    ];
    let bright = compass.iter().filter(|&&v| v > center + threshold).count();
    let dark = compass.iter().filter(|&&v| v < center - threshold).count();
    if bright < 2 && dark < 2 {
        return None;
    }

    let mut brighter: u16 = 0;
    let mut darker: u16 = 0;
    let mut contrast: u32 = 0;
    for k in 0..CIRCLE.len() {
        let v = circle_pixel(k);
        if v > center + threshold {
            brighter |= 1 << k;
        } else if v < center - threshold {
            darker |= 1 << k;
        }
        contrast += v.abs_diff(center);
    }

    if has_contiguous_arc(brighter, FAST_ARC) || has_contiguous_arc(darker, FAST_ARC) {
        Some(contrast)
    } else {
        None
    }
}

/// Longest run of set bits in a 16-bit ring (wrapping) is >= `arc`.
fn has_contiguous_arc(ring: u16, arc: u32) -> bool {
    let doubled = u32::from(ring) | (u32::from(ring) << 16);
    let mut run = 0u32;
    let mut longest = 0u32;
    for i in 0..32 {
        if doubled >> i & 1 == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest >= arc
}

/// 256 point pairs inside the sampling patch, derived from `seed` with an
/// xorshift generator so extractors with equal configs agree bit-for-bit.
fn sampling_pattern(seed: u64, span: i32) -> Vec<((i32, i32), (i32, i32))> {
    debug_assert!(span >= 4);
    let mut state = seed | 1;
    let mut offset = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % (2 * span as u64 + 1)) as i32 - span
    };
    (0..DESCRIPTOR_BYTES * 8)
        .map(|_| ((offset(), offset()), (offset(), offset())))
        .collect()
}
