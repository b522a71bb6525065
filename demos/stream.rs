//! Stream depth from the first camera and print the range at the image center.
//!
//! Usage: cargo run --features native --example stream
//! Set REALSENSE_DEMO_FRAMES to change the number of frames (default 300).

use realsense::ffi::NativeDriver;
use realsense::{Context, Float2, Format, Stream, StreamSet};
use std::time::Instant;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {} ({}: {})", e, e.failed_function(), e.failed_args());
        std::process::exit(1);
    }
}

fn run() -> realsense::Result<()> {
    let frames: u64 = std::env::var("REALSENSE_DEMO_FRAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);

    let ctx = Context::new(NativeDriver)?;
    let dev = ctx.device(0)?;
    println!("Using {}", dev.name()?);

    dev.enable_stream(Stream::Depth, 480, 360, Format::Z16, 60)?;
    let intrin = dev.stream_intrinsics(Stream::Depth)?;
    let scale = dev.depth_scale()?;
    dev.start()?;

    let start = Instant::now();
    let (cx, cy) = (intrin.width() / 2, intrin.height() / 2);

    for count in 1..=frames {
        dev.wait_for_frames(StreamSet::DEPTH)?;

        // Print every ~30th frame to avoid flooding the terminal
        if count % 30 == 1 {
            let bytes = unsafe { dev.frame_bytes(Stream::Depth)? };
            let offset = ((cy * intrin.width() + cx) * 2) as usize;
            let Some(&[lo, hi]) = bytes.get(offset..offset + 2) else {
                println!("frame={:<8} no depth data", count);
                continue;
            };
            let depth = u16::from_le_bytes([lo, hi]) as f32 * scale;
            let center = Float2 { x: cx as f32, y: cy as f32 };
            let point = intrin.deproject(ctx.geometry(), center, depth);
            println!(
                "frame={:<8} center depth={:.3} m  point=[{:+.3}, {:+.3}, {:+.3}]",
                dev.frame_number(Stream::Depth)?,
                depth,
                point.x,
                point.y,
                point.z
            );
        }
    }

    dev.stop()?;
    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "\nTotal: {} frames in {:.1}s ({:.1} Hz)",
        frames,
        elapsed,
        frames as f64 / elapsed
    );
    Ok(())
}
