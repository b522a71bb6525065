//! List every connected RealSense camera and the options it supports.

use realsense::ffi::NativeDriver;
use realsense::{Context, DeviceOption};

fn main() {
    env_logger::init();

    let ctx = match Context::new(NativeDriver) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {} ({}: {})", e, e.failed_function(), e.failed_args());
            std::process::exit(1);
        }
    };

    match ctx.devices() {
        Ok(devices) => {
            println!("Found {} device(s):", devices.len());
            for (i, dev) in devices.iter().enumerate() {
                let name = dev.name().unwrap_or_else(|e| format!("<{}>", e));
                println!("  [{}] {}", i, name);
                for &option in DeviceOption::ALL {
                    if let Ok(true) = dev.supports_option(option) {
                        match dev.option(option) {
                            Ok(value) => println!("      {:<32} {}", option, value),
                            Err(e) => println!("      {:<32} <{}>", option, e),
                        }
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
