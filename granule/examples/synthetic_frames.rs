//! Runs the detector over a short synthetic video of drifting granules.
//!
//! ```text
//! cargo run --release -p granule --example synthetic_frames
//! ```

use std::time::Instant;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use granule::{BlobDetector, Config, Plane};

const ROWS: usize = 256;
const COLS: usize = 320;
const FRAMES: usize = 32;
const GRANULES: usize = 12;

struct Granule {
    row: f64,
    col: f64,
    sigma: f64,
    velocity: (f64, f64),
}

fn render(granules: &[Granule], frame: usize, rng: &mut StdRng) -> Plane {
    let t = frame as f64;
    Plane::from_fn(ROWS, COLS, |r, c| {
        let signal: f64 = granules
            .iter()
            .map(|g| {
                let dr = r as f64 - (g.row + g.velocity.0 * t);
                let dc = c as f64 - (g.col + g.velocity.1 * t);
                (-(dr * dr + dc * dc) / (2.0 * g.sigma * g.sigma)).exp()
            })
            .sum();
        signal + 0.05 * rng.random::<f64>()
    })
}

fn main() -> Result<()> {
    let _logger = common::setup_logging("info");

    let mut rng = StdRng::seed_from_u64(7);
    let granules: Vec<Granule> = (0..GRANULES)
        .map(|_| Granule {
            row: rng.random_range(40.0..ROWS as f64 - 40.0),
            col: rng.random_range(40.0..COLS as f64 - 40.0),
            sigma: rng.random_range(2.0..6.0),
            velocity: (rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5)),
        })
        .collect();
    let frames: Vec<Plane> = (0..FRAMES)
        .map(|i| render(&granules, i, &mut rng))
        .collect();

    let start = Instant::now();
    let detector = BlobDetector::new(Config::default(), (ROWS, COLS))?;
    log::info!(
        "Kernel bank: {} probes, kernel {}, transform {} ({:.1?})",
        detector.bank().probe_count(),
        detector.bank().base_kernel_size(),
        detector.bank().transform_length(),
        start.elapsed()
    );

    let start = Instant::now();
    let results = detector.detect_all(&frames);
    let elapsed = start.elapsed();

    for (index, result) in results.into_iter().enumerate() {
        let blobs = result?;
        let sizes: Vec<String> = blobs.iter().map(|b| format!("{:.1}", b.radius())).collect();
        log::info!("Frame {:>2}: {} granules, radii [{}]", index, blobs.len(), sizes.join(", "));
    }
    log::info!(
        "Detected {} frames in {:.1?} ({:.1?} per frame)",
        FRAMES,
        elapsed,
        elapsed / FRAMES as u32
    );

    Ok(())
}
