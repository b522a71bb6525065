use crate::context::Context;
use crate::driver::Driver;
use crate::error::check;
use crate::types::{DeviceOption, Extrinsics, Format, Intrinsics, Preset, Stream, StreamSet};
use crate::{RealsenseError, Result};
use std::ffi::{c_int, c_void};
use std::fmt;

/// A device enumerated by a [`Context`].
///
/// This is a borrowed view: the native device belongs to the context, and
/// copies of a `Device` all refer to the same hardware. Every call is a
/// blocking passthrough to the library.
pub struct Device<'ctx, D: Driver> {
    context: &'ctx Context<D>,
    handle: D::DeviceHandle,
}

impl<D: Driver> Clone for Device<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Device<'_, D> {}

impl<D: Driver> fmt::Debug for Device<'_, D>
where
    D::DeviceHandle: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device").field("handle", &self.handle).finish()
    }
}

// SAFETY: every driver call below passes `self.handle`, which came from
// `self.context` and stays valid for as long as that borrow lives.
impl<'ctx, D: Driver> Device<'ctx, D> {
    pub(crate) fn new(context: &'ctx Context<D>, handle: D::DeviceHandle) -> Self {
        Self { context, handle }
    }

    /// Raw native handle.
    pub fn handle(&self) -> D::DeviceHandle {
        self.handle
    }

    fn driver(&self) -> &'ctx D {
        self.context.driver()
    }

    /// Human-readable device name, e.g. "Intel RealSense R200".
    pub fn name(&self) -> Result<String> {
        check(|err| unsafe { self.driver().device_name(self.handle, err) })
    }

    /// Rigid transform from the frame of stream `from` to that of `to`.
    pub fn extrinsics(&self, from: Stream, to: Stream) -> Result<Extrinsics> {
        let raw = check(|err| unsafe {
            self.driver()
                .device_extrinsics(self.handle, from.code(), to.code(), err)
        })?;
        Ok(Extrinsics::from(raw))
    }

    /// Meters per depth unit.
    pub fn depth_scale(&self) -> Result<f32> {
        check(|err| unsafe { self.driver().device_depth_scale(self.handle, err) })
    }

    pub fn supports_option(&self, option: DeviceOption) -> Result<bool> {
        check(|err| unsafe {
            self.driver()
                .device_supports_option(self.handle, option.code(), err)
        })
    }

    /// Enable `stream` with an explicit mode. Fails if the hardware does not
    /// offer the combination.
    pub fn enable_stream(
        &self,
        stream: Stream,
        width: i32,
        height: i32,
        format: Format,
        framerate: i32,
    ) -> Result<()> {
        check(|err| unsafe {
            self.driver().enable_stream(
                self.handle,
                stream.code(),
                width,
                height,
                format.code(),
                framerate,
                err,
            )
        })?;
        log::debug!(
            "Enabled {} stream: {}x{} {} @ {} fps",
            stream,
            width,
            height,
            format,
            framerate
        );
        Ok(())
    }

    /// Enable `stream` with a mode chosen by the library.
    pub fn enable_stream_preset(&self, stream: Stream, preset: Preset) -> Result<()> {
        check(|err| unsafe {
            self.driver()
                .enable_stream_preset(self.handle, stream.code(), preset.code(), err)
        })?;
        log::debug!("Enabled {} stream with preset {}", stream, preset);
        Ok(())
    }

    pub fn is_stream_enabled(&self, stream: Stream) -> Result<bool> {
        check(|err| unsafe {
            self.driver()
                .stream_is_enabled(self.handle, stream.code(), err)
        })
    }

    /// All streams currently enabled, suitable for [`Device::wait_for_frames`].
    pub fn enabled_streams(&self) -> Result<StreamSet> {
        let mut set = StreamSet::empty();
        for &stream in Stream::ALL {
            if self.is_stream_enabled(stream)? {
                set |= StreamSet::from(stream);
            }
        }
        Ok(set)
    }

    pub fn stream_intrinsics(&self, stream: Stream) -> Result<Intrinsics> {
        let raw = check(|err| unsafe {
            self.driver()
                .stream_intrinsics(self.handle, stream.code(), err)
        })?;
        Intrinsics::try_from(raw)
            .map_err(|code| unknown_code("distortion", code, "rs_get_stream_intrinsics", stream))
    }

    pub fn stream_format(&self, stream: Stream) -> Result<Format> {
        let code =
            check(|err| unsafe { self.driver().stream_format(self.handle, stream.code(), err) })?;
        Format::try_from(code)
            .map_err(|code| unknown_code("format", code, "rs_get_stream_format", stream))
    }

    pub fn stream_framerate(&self, stream: Stream) -> Result<i32> {
        check(|err| unsafe {
            self.driver()
                .stream_framerate(self.handle, stream.code(), err)
        })
    }

    /// Begin streaming every enabled stream.
    pub fn start(&self) -> Result<()> {
        check(|err| unsafe { self.driver().start_device(self.handle, err) })?;
        log::info!("Device streaming started");
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        check(|err| unsafe { self.driver().stop_device(self.handle, err) })?;
        log::info!("Device streaming stopped");
        Ok(())
    }

    pub fn is_streaming(&self) -> Result<bool> {
        check(|err| unsafe { self.driver().device_is_streaming(self.handle, err) })
    }

    /// Set a device option. Range checking is done by the library.
    pub fn set_option(&self, option: DeviceOption, value: i32) -> Result<()> {
        check(|err| unsafe {
            self.driver()
                .set_device_option(self.handle, option.code(), value, err)
        })
    }

    pub fn option(&self, option: DeviceOption) -> Result<i32> {
        check(|err| unsafe { self.driver().device_option(self.handle, option.code(), err) })
    }

    /// Block until new frames are available for every stream in `streams`.
    /// There is no timeout.
    pub fn wait_for_frames(&self, streams: StreamSet) -> Result<()> {
        check(|err| unsafe {
            self.driver()
                .wait_for_frames(self.handle, streams.bits(), err)
        })
    }

    pub fn frame_number(&self, stream: Stream) -> Result<i32> {
        check(|err| unsafe { self.driver().frame_number(self.handle, stream.code(), err) })
    }

    /// Raw pointer to the latest frame of `stream`. The buffer belongs to
    /// the library and is only valid until the next `wait_for_frames`.
    pub fn frame_data(&self, stream: Stream) -> Result<*const c_void> {
        check(|err| unsafe { self.driver().frame_data(self.handle, stream.code(), err) })
    }

    /// The latest frame of `stream` as bytes, sized from the stream's
    /// intrinsics and pixel format. Empty when the library has no frame yet.
    ///
    /// # Safety
    /// The slice aliases library memory that is overwritten by the next
    /// `wait_for_frames` on this device and freed with the context. The
    /// caller must not hold it across either.
    pub unsafe fn frame_bytes(&self, stream: Stream) -> Result<&'ctx [u8]> {
        let intrin = self.stream_intrinsics(stream)?;
        let format = self.stream_format(stream)?;
        let bytes_per_pixel = format
            .bytes_per_pixel()
            .ok_or_else(|| unknown_code("format", format.code(), "rs_get_stream_format", stream))?;
        let data = self.frame_data(stream)?;
        if data.is_null() {
            return Ok(&[]);
        }
        let pixels = intrin.width().max(0) as usize * intrin.height().max(0) as usize;
        Ok(std::slice::from_raw_parts(data.cast::<u8>(), pixels * bytes_per_pixel))
    }
}

fn unknown_code(kind: &str, code: c_int, function: &str, stream: Stream) -> RealsenseError {
    RealsenseError::new(
        format!("unsupported {} code {}", kind, code),
        function,
        format!("stream:{}", stream),
    )
}
