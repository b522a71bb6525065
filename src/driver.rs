//! The native function set wrapped by [`Context`](crate::Context) and
//! [`Device`](crate::Device).
//!
//! Each fallible method takes an error slot as its last argument, as the C
//! API takes an `rs_error **`. The slot is empty on entry; an implementation
//! reports failure by filling it, and the return value is then ignored.
//! Enumeration values cross this boundary as their raw `c_int` codes and
//! structs as their `sys` mirrors.
//!
//! Every method that takes a handle is `unsafe`: a native implementation
//! dereferences it without any check. Safe code goes through [`Context`]
//! and [`Device`], which only pass handles they own or borrow.
//!
//! ```compile_fail
//! fn delete_twice<D: realsense::Driver>(driver: &D, ctx: D::ContextHandle) {
//!     driver.delete_context(ctx, &mut None);
//! }
//! ```
//!
//! [`Context`]: crate::Context
//! [`Device`]: crate::Device

use crate::error::NativeError;
use crate::sys::{rs_extrinsics, rs_intrinsics};
use std::ffi::{c_int, c_void};

/// Error slot handed to a single driver call.
pub type ErrorSlot<E> = Option<E>;

/// Context, device and streaming calls of the native library.
///
/// # Safety
/// For every `unsafe` method:
/// - a `ContextHandle` must have been returned by `create_context` of this
///   driver and not yet passed to `delete_context`;
/// - a `DeviceHandle` must have been returned by `device` for such a live
///   context.
pub trait Driver {
    /// Raw context handle, owned by [`Context`](crate::Context).
    type ContextHandle: Copy;
    /// Raw device handle, owned by the native context.
    type DeviceHandle: Copy;
    /// Native error object written into the slot on failure.
    type Error: NativeError;

    fn create_context(
        &self,
        api_version: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> Self::ContextHandle;
    /// Frees the context and every device it enumerated. `ctx` is dead
    /// afterwards, even when an error is reported.
    unsafe fn delete_context(&self, ctx: Self::ContextHandle, err: &mut ErrorSlot<Self::Error>);
    unsafe fn device_count(
        &self,
        ctx: Self::ContextHandle,
        err: &mut ErrorSlot<Self::Error>,
    ) -> c_int;
    unsafe fn device(
        &self,
        ctx: Self::ContextHandle,
        index: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> Self::DeviceHandle;

    unsafe fn device_name(
        &self,
        dev: Self::DeviceHandle,
        err: &mut ErrorSlot<Self::Error>,
    ) -> String;
    unsafe fn device_extrinsics(
        &self,
        dev: Self::DeviceHandle,
        from: c_int,
        to: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> rs_extrinsics;
    unsafe fn device_depth_scale(
        &self,
        dev: Self::DeviceHandle,
        err: &mut ErrorSlot<Self::Error>,
    ) -> f32;
    unsafe fn device_supports_option(
        &self,
        dev: Self::DeviceHandle,
        option: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> bool;

    #[allow(clippy::too_many_arguments)]
    unsafe fn enable_stream(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        width: c_int,
        height: c_int,
        format: c_int,
        framerate: c_int,
        err: &mut ErrorSlot<Self::Error>,
    );
    unsafe fn enable_stream_preset(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        preset: c_int,
        err: &mut ErrorSlot<Self::Error>,
    );
    unsafe fn stream_is_enabled(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> bool;
    unsafe fn stream_intrinsics(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> rs_intrinsics;
    unsafe fn stream_format(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> c_int;
    unsafe fn stream_framerate(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> c_int;

    unsafe fn start_device(&self, dev: Self::DeviceHandle, err: &mut ErrorSlot<Self::Error>);
    unsafe fn stop_device(&self, dev: Self::DeviceHandle, err: &mut ErrorSlot<Self::Error>);
    unsafe fn device_is_streaming(
        &self,
        dev: Self::DeviceHandle,
        err: &mut ErrorSlot<Self::Error>,
    ) -> bool;

    unsafe fn set_device_option(
        &self,
        dev: Self::DeviceHandle,
        option: c_int,
        value: c_int,
        err: &mut ErrorSlot<Self::Error>,
    );
    unsafe fn device_option(
        &self,
        dev: Self::DeviceHandle,
        option: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> c_int;

    /// Blocks until frames for every stream in `stream_bits` are ready.
    unsafe fn wait_for_frames(
        &self,
        dev: Self::DeviceHandle,
        stream_bits: c_int,
        err: &mut ErrorSlot<Self::Error>,
    );
    unsafe fn frame_number(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> c_int;
    /// Pointer into driver-owned memory, valid until the next `wait_for_frames`.
    unsafe fn frame_data(
        &self,
        dev: Self::DeviceHandle,
        stream: c_int,
        err: &mut ErrorSlot<Self::Error>,
    ) -> *const c_void;
}

/// Infallible projection helpers of the native library (`rsutil.h`).
pub trait Geometry {
    fn deproject_pixel_to_point(
        &self,
        intrin: &rs_intrinsics,
        pixel: [f32; 2],
        depth: f32,
    ) -> [f32; 3];
    fn project_point_to_pixel(&self, intrin: &rs_intrinsics, point: [f32; 3]) -> [f32; 2];
    fn transform_point_to_point(&self, extrin: &rs_extrinsics, from_point: [f32; 3]) -> [f32; 3];
}
