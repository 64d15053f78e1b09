//! Shared fixture helpers: deterministic synthetic images, saved as PNGs
//! into per-test scratch directories.
#![allow(dead_code)] // each test binary uses its own subset of helpers

use std::path::Path;

use image::{GrayImage, Luma};

/// Deterministic per-pixel noise. Rich in FAST corners and unique local
/// texture everywhere, so two images from different seeds share no
/// descriptors while two from the same seed are byte-identical.
pub fn noise_image(seed: u64, width: u32, height: u32) -> GrayImage {
    let mut state = seed | 1;
    GrayImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        Luma([(state >> 24) as u8])
    })
}

/// A near-duplicate of `noise_image(seed, ..)`: identical except for one
/// rectangle re-rolled from a different seed.
pub fn perturbed_noise_image(seed: u64, patch_seed: u64, width: u32, height: u32) -> GrayImage {
    let mut img = noise_image(seed, width, height);
    let patch = noise_image(patch_seed, 24, 24);
    for y in 0..24 {
        for x in 0..24 {
            img.put_pixel(width / 2 + x, height / 2 + y, *patch.get_pixel(x, y));
        }
    }
    img
}

/// Uniform image: no detectable keypoints by construction.
pub fn blank_image(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([128]))
}

/// Save `img` as `<dir>/<name>` (PNG) and return the path as a string id.
pub fn save_png(dir: &Path, name: &str, img: &GrayImage) -> String {
    let path = dir.join(name);
    img.save(&path).expect("failed to write PNG fixture");
    path.to_string_lossy().into_owned()
}

/// Write deliberately undecodable bytes as `<dir>/<name>`.
pub fn save_garbage(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not an image").expect("failed to write fixture");
    path.to_string_lossy().into_owned()
}
