//! Native backend: links librealsense and implements [`Driver`] and
//! [`Geometry`] on top of its C API.
//!
//! The `rsutil.h` projection helpers are `static` in the C header, so
//! `build.rs` compiles a small shim (`csrc/rsutil_shim.c`) that exports them.
#![allow(non_camel_case_types)]

use crate::driver::{Driver, ErrorSlot, Geometry};
use crate::error::NativeError;
use crate::sys::{rs_extrinsics, rs_intrinsics};
use std::ffi::{c_char, c_float, c_int, c_void, CStr};
use std::ptr::{self, NonNull};

/// Opaque native context.
#[repr(C)]
pub struct rs_context {
    _private: [u8; 0],
}

/// Opaque native device.
#[repr(C)]
pub struct rs_device {
    _private: [u8; 0],
}

/// Opaque native error object.
#[repr(C)]
pub struct rs_error {
    _private: [u8; 0],
}

type ErrOut = *mut *mut rs_error;

#[link(name = "realsense")]
extern "C" {
    fn rs_create_context(api_version: c_int, error: ErrOut) -> *mut rs_context;
    fn rs_delete_context(context: *mut rs_context, error: ErrOut);
    fn rs_get_device_count(context: *const rs_context, error: ErrOut) -> c_int;
    fn rs_get_device(context: *mut rs_context, index: c_int, error: ErrOut) -> *mut rs_device;

    fn rs_get_device_name(device: *const rs_device, error: ErrOut) -> *const c_char;
    fn rs_get_device_extrinsics(
        device: *const rs_device,
        from: c_int,
        to: c_int,
        extrin: *mut rs_extrinsics,
        error: ErrOut,
    );
    fn rs_get_device_depth_scale(device: *const rs_device, error: ErrOut) -> c_float;
    fn rs_device_supports_option(device: *const rs_device, option: c_int, error: ErrOut) -> c_int;

    fn rs_enable_stream(
        device: *mut rs_device,
        stream: c_int,
        width: c_int,
        height: c_int,
        format: c_int,
        framerate: c_int,
        error: ErrOut,
    );
    fn rs_enable_stream_preset(device: *mut rs_device, stream: c_int, preset: c_int, error: ErrOut);
    fn rs_stream_is_enabled(device: *const rs_device, stream: c_int, error: ErrOut) -> c_int;
    fn rs_get_stream_intrinsics(
        device: *const rs_device,
        stream: c_int,
        intrin: *mut rs_intrinsics,
        error: ErrOut,
    );
    fn rs_get_stream_format(device: *const rs_device, stream: c_int, error: ErrOut) -> c_int;
    fn rs_get_stream_framerate(device: *const rs_device, stream: c_int, error: ErrOut) -> c_int;

    fn rs_start_device(device: *mut rs_device, error: ErrOut);
    fn rs_stop_device(device: *mut rs_device, error: ErrOut);
    fn rs_device_is_streaming(device: *const rs_device, error: ErrOut) -> c_int;

    fn rs_set_device_option(device: *mut rs_device, option: c_int, value: c_int, error: ErrOut);
    fn rs_get_device_option(device: *const rs_device, option: c_int, error: ErrOut) -> c_int;

    fn rs_wait_for_frames(device: *mut rs_device, stream_bits: c_int, error: ErrOut);
    fn rs_get_frame_number(device: *const rs_device, stream: c_int, error: ErrOut) -> c_int;
    fn rs_get_frame_data(device: *const rs_device, stream: c_int, error: ErrOut) -> *const c_void;

    fn rs_get_error_message(error: *const rs_error) -> *const c_char;
    fn rs_get_failed_function(error: *const rs_error) -> *const c_char;
    fn rs_get_failed_args(error: *const rs_error) -> *const c_char;
    fn rs_free_error(error: *mut rs_error);
}

extern "C" {
    fn realsense_rs_deproject_pixel_to_point(
        point: *mut c_float,
        intrin: *const rs_intrinsics,
        pixel: *const c_float,
        depth: c_float,
    );
    fn realsense_rs_project_point_to_pixel(
        pixel: *mut c_float,
        intrin: *const rs_intrinsics,
        point: *const c_float,
    );
    fn realsense_rs_transform_point_to_point(
        to_point: *mut c_float,
        extrin: *const rs_extrinsics,
        from_point: *const c_float,
    );
}

/// Owned `rs_error`, freed with `rs_free_error` on drop.
pub struct ErrorObject(NonNull<rs_error>);

impl NativeError for ErrorObject {
    fn message(&self) -> String {
        unsafe { c_string(rs_get_error_message(self.0.as_ptr())) }
    }

    fn failed_function(&self) -> String {
        unsafe { c_string(rs_get_failed_function(self.0.as_ptr())) }
    }

    fn failed_args(&self) -> String {
        unsafe { c_string(rs_get_failed_args(self.0.as_ptr())) }
    }
}

impl Drop for ErrorObject {
    fn drop(&mut self) {
        unsafe { rs_free_error(self.0.as_ptr()) };
    }
}

/// Copy a library-owned C string. Null yields an empty string.
unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Hand a fresh `rs_error *` to one native call and move any error it
/// reports into `err`.
fn capture<T>(err: &mut ErrorSlot<ErrorObject>, f: impl FnOnce(ErrOut) -> T) -> T {
    let mut raw: *mut rs_error = ptr::null_mut();
    let value = f(ptr::addr_of_mut!(raw));
    *err = NonNull::new(raw).map(ErrorObject);
    value
}

/// The system librealsense.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDriver;

type Slot = ErrorSlot<ErrorObject>;

impl Driver for NativeDriver {
    type ContextHandle = *mut rs_context;
    type DeviceHandle = *mut rs_device;
    type Error = ErrorObject;

    fn create_context(&self, api_version: c_int, err: &mut Slot) -> *mut rs_context {
        capture(err, |e| unsafe { rs_create_context(api_version, e) })
    }

    unsafe fn delete_context(&self, ctx: *mut rs_context, err: &mut Slot) {
        capture(err, |e| unsafe { rs_delete_context(ctx, e) })
    }

    unsafe fn device_count(&self, ctx: *mut rs_context, err: &mut Slot) -> c_int {
        capture(err, |e| unsafe { rs_get_device_count(ctx, e) })
    }

    unsafe fn device(&self, ctx: *mut rs_context, index: c_int, err: &mut Slot) -> *mut rs_device {
        capture(err, |e| unsafe { rs_get_device(ctx, index, e) })
    }

    unsafe fn device_name(&self, dev: *mut rs_device, err: &mut Slot) -> String {
        let name = capture(err, |e| unsafe { rs_get_device_name(dev, e) });
        unsafe { c_string(name) }
    }

    unsafe fn device_extrinsics(
        &self,
        dev: *mut rs_device,
        from: c_int,
        to: c_int,
        err: &mut Slot,
    ) -> rs_extrinsics {
        let mut extrin = rs_extrinsics::default();
        capture(err, |e| unsafe {
            rs_get_device_extrinsics(dev, from, to, &mut extrin, e)
        });
        extrin
    }

    unsafe fn device_depth_scale(&self, dev: *mut rs_device, err: &mut Slot) -> f32 {
        capture(err, |e| unsafe { rs_get_device_depth_scale(dev, e) })
    }

    unsafe fn device_supports_option(
        &self,
        dev: *mut rs_device,
        option: c_int,
        err: &mut Slot,
    ) -> bool {
        capture(err, |e| unsafe { rs_device_supports_option(dev, option, e) }) != 0
    }

    unsafe fn enable_stream(
        &self,
        dev: *mut rs_device,
        stream: c_int,
        width: c_int,
        height: c_int,
        format: c_int,
        framerate: c_int,
        err: &mut Slot,
    ) {
        capture(err, |e| unsafe {
            rs_enable_stream(dev, stream, width, height, format, framerate, e)
        })
    }

    unsafe fn enable_stream_preset(
        &self,
        dev: *mut rs_device,
        stream: c_int,
        preset: c_int,
        err: &mut Slot,
    ) {
        capture(err, |e| unsafe {
            rs_enable_stream_preset(dev, stream, preset, e)
        })
    }

    unsafe fn stream_is_enabled(&self, dev: *mut rs_device, stream: c_int, err: &mut Slot) -> bool {
        capture(err, |e| unsafe { rs_stream_is_enabled(dev, stream, e) }) != 0
    }

    unsafe fn stream_intrinsics(
        &self,
        dev: *mut rs_device,
        stream: c_int,
        err: &mut Slot,
    ) -> rs_intrinsics {
        let mut intrin = rs_intrinsics::default();
        capture(err, |e| unsafe {
            rs_get_stream_intrinsics(dev, stream, &mut intrin, e)
        });
        intrin
    }

    unsafe fn stream_format(&self, dev: *mut rs_device, stream: c_int, err: &mut Slot) -> c_int {
        capture(err, |e| unsafe { rs_get_stream_format(dev, stream, e) })
    }

    unsafe fn stream_framerate(&self, dev: *mut rs_device, stream: c_int, err: &mut Slot) -> c_int {
        capture(err, |e| unsafe { rs_get_stream_framerate(dev, stream, e) })
    }

    unsafe fn start_device(&self, dev: *mut rs_device, err: &mut Slot) {
        capture(err, |e| unsafe { rs_start_device(dev, e) })
    }

    unsafe fn stop_device(&self, dev: *mut rs_device, err: &mut Slot) {
        capture(err, |e| unsafe { rs_stop_device(dev, e) })
    }

    unsafe fn device_is_streaming(&self, dev: *mut rs_device, err: &mut Slot) -> bool {
        capture(err, |e| unsafe { rs_device_is_streaming(dev, e) }) != 0
    }

    unsafe fn set_device_option(
        &self,
        dev: *mut rs_device,
        option: c_int,
        value: c_int,
        err: &mut Slot,
    ) {
        capture(err, |e| unsafe {
            rs_set_device_option(dev, option, value, e)
        })
    }

    unsafe fn device_option(&self, dev: *mut rs_device, option: c_int, err: &mut Slot) -> c_int {
        capture(err, |e| unsafe { rs_get_device_option(dev, option, e) })
    }

    unsafe fn wait_for_frames(&self, dev: *mut rs_device, stream_bits: c_int, err: &mut Slot) {
        capture(err, |e| unsafe { rs_wait_for_frames(dev, stream_bits, e) })
    }

    unsafe fn frame_number(&self, dev: *mut rs_device, stream: c_int, err: &mut Slot) -> c_int {
        capture(err, |e| unsafe { rs_get_frame_number(dev, stream, e) })
    }

    unsafe fn frame_data(
        &self,
        dev: *mut rs_device,
        stream: c_int,
        err: &mut Slot,
    ) -> *const c_void {
        capture(err, |e| unsafe { rs_get_frame_data(dev, stream, e) })
    }
}

impl Geometry for NativeDriver {
    fn deproject_pixel_to_point(
        &self,
        intrin: &rs_intrinsics,
        pixel: [f32; 2],
        depth: f32,
    ) -> [f32; 3] {
        let mut point = [0.0f32; 3];
        unsafe {
            realsense_rs_deproject_pixel_to_point(point.as_mut_ptr(), intrin, pixel.as_ptr(), depth)
        };
        point
    }

    fn project_point_to_pixel(&self, intrin: &rs_intrinsics, point: [f32; 3]) -> [f32; 2] {
        let mut pixel = [0.0f32; 2];
        unsafe { realsense_rs_project_point_to_pixel(pixel.as_mut_ptr(), intrin, point.as_ptr()) };
        pixel
    }

    fn transform_point_to_point(&self, extrin: &rs_extrinsics, from_point: [f32; 3]) -> [f32; 3] {
        let mut to_point = [0.0f32; 3];
        let from = from_point.as_ptr();
        unsafe { realsense_rs_transform_point_to_point(to_point.as_mut_ptr(), extrin, from) };
        to_point
    }
}
