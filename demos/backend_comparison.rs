//! Compare the neighborhood backends on random clouds of increasing size
//!
//! Times every backend and reports pairs on which the GPU result disagrees
//! with the R*-tree, ignoring pairs within float round-off of the radius.

use clap::Parser;
use keycloud_algorithms::{BruteForceIndex, RTreeIndex};
use keycloud_core::{NeighborhoodIndex, Neighborhoods, Point3d};
use keycloud_gpu::GpuRadiusIndex;
use log::warn;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

/// Time CPU and GPU radius neighborhood search
#[derive(Parser, Debug)]
#[command(name = "backend_comparison", version, about)]
struct Cli {
    /// Cloud sizes to test
    #[arg(long, value_delimiter = ',', default_values_t = [1000, 5000, 20000])]
    sizes: Vec<usize>,

    /// Search radius inside the unit cube
    #[arg(long, default_value_t = 0.05)]
    radius: f64,

    /// Skip brute force above this many points
    #[arg(long, default_value_t = 5000)]
    brute_force_limit: usize,

    /// Distance band around the radius excluded from comparison
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn random_cloud(n: usize, rng: &mut StdRng) -> Vec<Point3d> {
    (0..n)
        .map(|_| Point3d::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect()
}

fn timed(index: &dyn NeighborhoodIndex, points: &[Point3d], radius: f64) -> anyhow::Result<Neighborhoods> {
    let start = Instant::now();
    let neighborhoods = index.radius_neighborhoods(points, radius)?;
    println!(
        "  {:<12} {:>9.2} ms  ({} pairs, mean size {:.1})",
        index.name(),
        start.elapsed().as_secs_f64() * 1000.0,
        neighborhoods.pair_count(),
        neighborhoods.mean_size()
    );
    Ok(neighborhoods)
}

fn compare_backends(cli: &Cli, gpu: Option<&GpuRadiusIndex>) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(cli.seed);

    for &size in &cli.sizes {
        let points = random_cloud(size, &mut rng);
        println!("{} points, radius {}", size, cli.radius);

        let reference = timed(&RTreeIndex, &points, cli.radius)?;

        if size <= cli.brute_force_limit {
            let brute = timed(&BruteForceIndex, &points, cli.radius)?;
            if brute != reference {
                println!("  brute-force and rtree neighborhoods differ");
            }
        }

        if let Some(gpu) = gpu {
            let gpu_result = match timed(gpu, &points, cli.radius) {
                Ok(result) => result,
                Err(e) => {
                    println!("  gpu          failed: {}", e);
                    continue;
                }
            };
            let mismatched = gpu_result.disagreements(&reference, &points, cli.radius, cli.tolerance)?;
            println!("  gpu vs rtree: {} disagreeing pairs", mismatched.len());
            for (i, j) in mismatched.iter().take(5) {
                println!("    ({}, {}) at distance {:.6}", i, j, (points[*i] - points[*j]).norm());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let gpu = match GpuRadiusIndex::new().await {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            warn!("GPU backend unavailable: {}", e);
            None
        }
    };

    // Every backend call blocks, the GPU one on its own readback
    tokio::task::spawn_blocking(move || compare_backends(&cli, gpu.as_ref())).await?
}
