//! # realsense - safe Rust facade over the librealsense C API
//!
//! Wraps the native depth-camera library in owned and borrowed handle types:
//! - [`Context`] owns the native context and enumerates devices
//! - [`Device`] configures streams and options, starts streaming and fetches frames
//! - typed enums and calibration structs ([`Intrinsics`], [`Extrinsics`])
//!
//! Every native call is checked immediately; failures surface as
//! [`RealsenseError`] carrying the failing function and its arguments.
//!
//! The wrapper is generic over [`Driver`], the native function set. Enable
//! the `native` feature to link librealsense and use [`ffi::NativeDriver`].
//!
//! ## Quick Start
//! ```ignore
//! use realsense::{ffi::NativeDriver, Context, Format, Stream, StreamSet};
//!
//! let ctx = Context::new(NativeDriver)?;
//! let dev = ctx.device(0)?;
//! dev.enable_stream(Stream::Depth, 480, 360, Format::Z16, 60)?;
//! dev.start()?;
//! for _ in 0..100 {
//!     dev.wait_for_frames(StreamSet::DEPTH)?;
//!     println!("frame #{}", dev.frame_number(Stream::Depth)?);
//! }
//! # Ok::<(), realsense::RealsenseError>(())
//! ```

pub mod error;
pub mod sys;
pub mod types;
pub mod driver;
pub mod context;
pub mod device;
#[cfg(feature = "native")]
pub mod ffi;
#[cfg(test)]
mod testing;

pub use error::{NativeError, RealsenseError};
pub use types::*;
pub use driver::{Driver, Geometry};
pub use context::Context;
pub use device::Device;

/// Result type alias for realsense operations.
pub type Result<T> = std::result::Result<T, RealsenseError>;
