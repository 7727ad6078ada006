use argh::FromArgs;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use ndtile::array::AlignedBuffer;
use ndtile::device::CpuDevice;
use ndtile::ops::matmul::{matmul, matmul_tiled, tile_matrix, untile_matrix};

#[derive(FromArgs)]
/// Multiply two random square matrices with the naive and the tiled kernel
struct Args {
    /// side length of the matrices, a multiple of the tile size
    #[argh(option, short = 's', default = "256")]
    size: usize,

    /// seed of the random matrices
    #[argh(option, default = "0")]
    seed: u64,

    /// number of timed repetitions per kernel
    #[argh(option, short = 'n', default = "5")]
    repeats: usize,
}

fn random_matrix(rng: &mut StdRng, size: usize) -> Result<AlignedBuffer, Box<dyn std::error::Error>> {
    let data: Vec<f32> = (0..size * size)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect();
    Ok(AlignedBuffer::from_slice(&data)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let size = args.size;
    if size % CpuDevice::TILE_SIZE != 0 {
        return Err(format!(
            "size {} is not a multiple of the tile size {}",
            size,
            CpuDevice::TILE_SIZE
        )
        .into());
    }

    log::debug!("device: {}, tile size: {}", CpuDevice, CpuDevice::TILE_SIZE);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let a = random_matrix(&mut rng, size)?;
    let b = random_matrix(&mut rng, size)?;

    // naive product
    let mut naive = AlignedBuffer::new(size * size)?;
    let start = Instant::now();
    for _ in 0..args.repeats {
        matmul(&a, &b, &mut naive, size, size, size)?;
    }
    let naive_time = start.elapsed() / args.repeats.max(1) as u32;

    // tiled product
    let mut a_tiled = AlignedBuffer::new(size * size)?;
    let mut b_tiled = AlignedBuffer::new(size * size)?;
    tile_matrix(&a, &mut a_tiled, size, size)?;
    tile_matrix(&b, &mut b_tiled, size, size)?;

    let mut out_tiled = AlignedBuffer::new(size * size)?;
    let start = Instant::now();
    for _ in 0..args.repeats {
        matmul_tiled(&a_tiled, &b_tiled, &mut out_tiled, size, size, size)?;
    }
    let tiled_time = start.elapsed() / args.repeats.max(1) as u32;

    let mut tiled = AlignedBuffer::new(size * size)?;
    untile_matrix(&out_tiled, &mut tiled, size, size)?;

    let max_diff = naive
        .as_slice()
        .iter()
        .zip(tiled.as_slice())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max);

    println!("matrix size: {}x{}", size, size);
    println!("naive: {:?}", naive_time);
    println!("tiled: {:?}", tiled_time);
    println!("max abs difference: {}", max_diff);

    Ok(())
}
