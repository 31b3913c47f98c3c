use crate::models::config::DiffConfig;
use crate::models::region::{Rect, Region};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Per-region change flags between two frames, aligned with `regions`
///
/// `previous: None` means there is nothing to compare against, so every
/// region counts as changed. Frame size mismatches and regions the frame
/// cannot contain also report changed: recognition re-runs instead of
/// silently serving stale labels.
pub fn changed_mask(
    current: &RgbaImage,
    previous: Option<&RgbaImage>,
    regions: &[Region],
    config: &DiffConfig,
) -> Vec<bool> {
    let previous = match previous {
        Some(frame) => frame,
        None => return vec![true; regions.len()],
    };

    if current.dimensions() != previous.dimensions() {
        return vec![true; regions.len()];
    }

    regions
        .par_iter()
        .map(|region| region_changed(current, previous, &region.rect, config))
        .collect()
}

/// Compare one region between two same-sized frames
///
/// Samples every `sample_step`-th pixel on both axes; a sample counts as
/// changed when any RGB channel moved by more than `pixel_threshold`, and
/// the region as a whole when the changed fraction exceeds `change_ratio`.
pub fn region_changed(
    current: &RgbaImage,
    previous: &RgbaImage,
    rect: &Rect,
    config: &DiffConfig,
) -> bool {
    let (frame_width, frame_height) = current.dimensions();
    let clamped = match rect.clamped(frame_width, frame_height) {
        Some(rect) => rect,
        None => return true,
    };

    let step = config.sample_step.max(1) as usize;
    let mut sampled = 0u32;
    let mut changed = 0u32;

    for y in (clamped.y..clamped.y2()).step_by(step) {
        for x in (clamped.x..clamped.x2()).step_by(step) {
            let a = current.get_pixel(x as u32, y as u32);
            let b = previous.get_pixel(x as u32, y as u32);
            sampled += 1;
            if pixel_differs(a, b, config.pixel_threshold) {
                changed += 1;
            }
        }
    }

    if sampled == 0 {
        return true;
    }

    changed as f64 / sampled as f64 > config.change_ratio
}

fn pixel_differs(a: &Rgba<u8>, b: &Rgba<u8>, threshold: u8) -> bool {
    a[0].abs_diff(b[0]) > threshold
        || a[1].abs_diff(b[1]) > threshold
        || a[2].abs_diff(b[2]) > threshold
}
