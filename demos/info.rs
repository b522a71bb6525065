//! Print calibration details of the first connected camera.

use realsense::ffi::NativeDriver;
use realsense::{Context, Preset, Stream};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {} ({}: {})", e, e.failed_function(), e.failed_args());
        std::process::exit(1);
    }
}

fn run() -> realsense::Result<()> {
    let ctx = Context::new(NativeDriver)?;
    let dev = ctx.device(0)?;

    println!("Name:        {}", dev.name()?);
    println!("Depth scale: {} m/unit", dev.depth_scale()?);

    for stream in [Stream::Depth, Stream::Color] {
        dev.enable_stream_preset(stream, Preset::BestQuality)?;
        let intrin = dev.stream_intrinsics(stream)?;
        println!(
            "{:<10} {}x{} {} @ {} fps  f=({:.2}, {:.2}) pp=({:.2}, {:.2}) {}",
            stream,
            intrin.width(),
            intrin.height(),
            dev.stream_format(stream)?,
            dev.stream_framerate(stream)?,
            intrin.focal_length.x,
            intrin.focal_length.y,
            intrin.principal_point.x,
            intrin.principal_point.y,
            intrin.distortion_model,
        );
    }

    let extrin = dev.extrinsics(Stream::Depth, Stream::Color)?;
    println!(
        "Depth -> color translation: [{:+.4}, {:+.4}, {:+.4}] identity={}",
        extrin.translation.x,
        extrin.translation.y,
        extrin.translation.z,
        extrin.is_identity()
    );
    Ok(())
}
