//! Hough-gradient circle detection over a binary mask.
//!
//! Every edge pixel of the mask votes along its gradient direction for circle
//! centers at each candidate radius. Accumulator peaks above the center
//! threshold become candidates, and each candidate is confirmed against the
//! edge map: enough radially-aligned edge pixels must agree on one radius,
//! spread around the whole perimeter.
//! The confirmation step rejects the side lobes that radial voting smears
//! along gradient lines outside a dot, which would otherwise read as extra
//! circles. The whole pass is deterministic: peaks are visited in row-major
//! order and ties are broken by vote count, then by accumulator index.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use serde::Deserialize;

const DEFAULT_ACCUMULATOR_SCALE: f32 = 1.0;
const DEFAULT_MIN_CENTER_DISTANCE: f32 = 8.0;
const DEFAULT_EDGE_THRESHOLD: u32 = 20;
const DEFAULT_CENTER_THRESHOLD: u32 = 7;
const DEFAULT_MIN_RADIUS: u32 = 0;
const DEFAULT_MAX_RADIUS: u32 = 50;

/// Minimum |cos| between an edge pixel's gradient and its offset from a
/// candidate center for the pixel to count as ring support. Loose enough to
/// absorb Sobel quantization on small discs, tight enough that only the few
/// collinear pixels support an off-center candidate.
const RADIAL_ALIGNMENT: f64 = 0.8;

/// Angular sectors used to check that ring support surrounds a candidate,
/// and how many must be occupied. A circle's perimeter covers every sector;
/// a side lobe only sees a narrow arc of some dot's boundary.
const SUPPORT_SECTORS: usize = 12;
const MIN_SECTOR_COVERAGE: usize = 8;

/// Sensitivity parameters for circle detection.
///
/// `accumulator_scale` downsamples the center accumulator (a value of 2 halves
/// its resolution), `edge_threshold` gates which mask pixels vote, and
/// `center_threshold` is both the minimum vote count for an accumulator peak
/// and the minimum radius-aligned edge support needed to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HoughCircleParams {
    pub accumulator_scale: f32,
    pub min_center_distance: f32,
    pub edge_threshold: u32,
    pub center_threshold: u32,
    pub min_radius: u32,
    pub max_radius: u32,
}

impl Default for HoughCircleParams {
    fn default() -> Self {
        Self {
            accumulator_scale: DEFAULT_ACCUMULATOR_SCALE,
            min_center_distance: DEFAULT_MIN_CENTER_DISTANCE,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            center_threshold: DEFAULT_CENTER_THRESHOLD,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
        }
    }
}

/// A confirmed circle center, in mask pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedCircle {
    pub center: (f32, f32),
    pub votes: u32,
}

/// An edge pixel with its unit gradient direction.
struct EdgePixel {
    x: f64,
    y: f64,
    ux: f64,
    uy: f64,
}

/// Detects circles in a binary mask and returns them strongest-first.
pub fn detect_circles(mask: &GrayImage, params: &HoughCircleParams) -> Vec<DetectedCircle> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let edges = edge_pixels(mask, params);
    if edges.is_empty() {
        return Vec::new();
    }

    let scale = f64::from(params.accumulator_scale.max(1.0));
    let acc_w = ((f64::from(width) / scale).ceil() as usize).max(1);
    let acc_h = ((f64::from(height) / scale).ceil() as usize).max(1);
    let mut accumulator = vec![0u32; acc_w * acc_h];

    let radius_lo = params.min_radius.max(1);
    let radius_hi = params.max_radius.max(radius_lo);

    for edge in &edges {
        // Vote both ways along the gradient line: the mask polarity does not
        // tell us whether the center lies up- or down-gradient.
        for radius in radius_lo..=radius_hi {
            let r = f64::from(radius);
            for sign in [-1.0, 1.0] {
                let cx = edge.x + sign * edge.ux * r;
                let cy = edge.y + sign * edge.uy * r;
                if cx < 0.0 || cy < 0.0 {
                    continue;
                }
                let ax = (cx / scale).round() as usize;
                let ay = (cy / scale).round() as usize;
                if ax >= acc_w || ay >= acc_h {
                    continue;
                }
                accumulator[ay * acc_w + ax] += 1;
            }
        }
    }

    let peaks = collect_peaks(&accumulator, acc_w, acc_h, params.center_threshold);
    confirm_circles(&peaks, &edges, scale, radius_lo, radius_hi, params)
}

fn edge_pixels(mask: &GrayImage, params: &HoughCircleParams) -> Vec<EdgePixel> {
    let (width, height) = mask.dimensions();
    let gx = horizontal_sobel(mask);
    let gy = vertical_sobel(mask);
    let edge_threshold = f64::from(params.edge_threshold);

    let mut edges = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let dx = i64::from(gx.get_pixel(x, y)[0]);
            let dy = i64::from(gy.get_pixel(x, y)[0]);
            let magnitude = ((dx * dx + dy * dy) as f64).sqrt();
            if magnitude < edge_threshold {
                continue;
            }
            edges.push(EdgePixel {
                x: f64::from(x),
                y: f64::from(y),
                ux: dx as f64 / magnitude,
                uy: dy as f64 / magnitude,
            });
        }
    }
    edges
}

/// Extracts 3x3 local maxima above the center threshold, strongest first.
/// Equal-vote plateaus fall back to accumulator index so the ordering never
/// depends on allocation or hash state.
fn collect_peaks(
    accumulator: &[u32],
    acc_w: usize,
    acc_h: usize,
    center_threshold: u32,
) -> Vec<(usize, usize, u32)> {
    let mut peaks: Vec<(usize, usize, u32)> = Vec::new();

    for ay in 0..acc_h {
        for ax in 0..acc_w {
            let votes = accumulator[ay * acc_w + ax];
            if votes < center_threshold {
                continue;
            }

            let mut is_max = true;
            'nms: for ny in ay.saturating_sub(1)..=(ay + 1).min(acc_h - 1) {
                for nx in ax.saturating_sub(1)..=(ax + 1).min(acc_w - 1) {
                    if (nx, ny) == (ax, ay) {
                        continue;
                    }
                    if accumulator[ny * acc_w + nx] > votes {
                        is_max = false;
                        break 'nms;
                    }
                }
            }
            if is_max {
                peaks.push((ax, ay, votes));
            }
        }
    }

    peaks.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)).then(a.0.cmp(&b.0)));
    peaks
}

/// Thins peaks to the minimum separation and keeps only those with enough
/// radius-consistent edge support.
fn confirm_circles(
    peaks: &[(usize, usize, u32)],
    edges: &[EdgePixel],
    scale: f64,
    radius_lo: u32,
    radius_hi: u32,
    params: &HoughCircleParams,
) -> Vec<DetectedCircle> {
    let min_dist_sq = f64::from(params.min_center_distance).powi(2);
    let mut circles: Vec<DetectedCircle> = Vec::new();

    for &(ax, ay, votes) in peaks {
        let cx = (ax as f64 + 0.5) * scale;
        let cy = (ay as f64 + 0.5) * scale;
        let too_close = circles.iter().any(|c| {
            let dx = cx - f64::from(c.center.0);
            let dy = cy - f64::from(c.center.1);
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }
        let support = ring_support(edges, cx, cy, radius_lo, radius_hi);
        if support.count < params.center_threshold || support.sectors < MIN_SECTOR_COVERAGE {
            continue;
        }
        circles.push(DetectedCircle {
            center: (cx as f32, cy as f32),
            votes,
        });
    }

    circles
}

struct RingSupport {
    /// Aligned edge pixels at the best-supported radius.
    count: u32,
    /// Occupied angular sectors at that radius.
    sectors: usize,
}

/// Measures how well the edge map supports a circle centered at (cx, cy).
///
/// Edge pixels whose gradient points through the candidate are binned by
/// rounded distance; the best two adjacent bins pick the radius (adjacent
/// bins merged so a radius straddling an integer still counts), and the
/// pixels at that radius are then spread over angular sectors. A true center
/// collects most of a dot's perimeter in one radius bin all the way around,
/// while a side lobe on a gradient line only sees the handful of edge pixels
/// roughly collinear with it.
fn ring_support(
    edges: &[EdgePixel],
    cx: f64,
    cy: f64,
    radius_lo: u32,
    radius_hi: u32,
) -> RingSupport {
    let lo = (f64::from(radius_lo) - 1.0).max(0.5);
    let hi = f64::from(radius_hi) + 1.0;

    let mut aligned: Vec<(f64, f64)> = Vec::new();
    for edge in edges {
        let dx = edge.x - cx;
        let dy = edge.y - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < lo || dist > hi {
            continue;
        }
        let alignment = (dx * edge.ux + dy * edge.uy).abs() / dist;
        if alignment < RADIAL_ALIGNMENT {
            continue;
        }
        aligned.push((dist, dy.atan2(dx)));
    }

    let mut bins = vec![0u32; radius_hi as usize + 3];
    for &(dist, _) in &aligned {
        let bin = dist.round() as usize;
        if bin < bins.len() {
            bins[bin] += 1;
        }
    }

    let mut best_bin = 0;
    let mut count = 0;
    for i in 0..bins.len() - 1 {
        let sum = bins[i] + bins[i + 1];
        if sum > count {
            count = sum;
            best_bin = i;
        }
    }

    let mut occupied = [false; SUPPORT_SECTORS];
    for &(dist, angle) in &aligned {
        let bin = dist.round() as usize;
        if bin == best_bin || bin == best_bin + 1 {
            let turn = (angle + std::f64::consts::PI) / std::f64::consts::TAU;
            let sector = ((turn * SUPPORT_SECTORS as f64) as usize).min(SUPPORT_SECTORS - 1);
            occupied[sector] = true;
        }
    }

    RingSupport {
        count,
        sectors: occupied.iter().filter(|&&s| s).count(),
    }
}
