//! In-process stand-in for librealsense used by the unit tests.
//!
//! Behaves like a small R200/F200-era driver: streams must be enabled in a
//! supported mode before starting, options are range-checked, and every
//! frame wait bumps the frame counters of the requested streams. Any call
//! can additionally be made to fail via [`FakeDriver::fail`].

use crate::driver::{Driver, ErrorSlot, Geometry};
use crate::error::NativeError;
use crate::sys::{self, rs_extrinsics, rs_intrinsics};
use crate::types::{DeviceOption, Format, Stream};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{c_int, c_void};
use std::rc::Rc;

const CONTEXT_HANDLE: u32 = 7;
const SUPPORTED_FRAMERATES: [c_int; 3] = [30, 60, 90];

pub(crate) struct FakeError {
    message: String,
    function: String,
    args: String,
    released: Rc<Cell<usize>>,
}

impl FakeError {
    pub fn new(message: &str, function: &str, args: &str, released: &Rc<Cell<usize>>) -> Self {
        Self {
            message: message.to_string(),
            function: function.to_string(),
            args: args.to_string(),
            released: released.clone(),
        }
    }
}

impl NativeError for FakeError {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn failed_function(&self) -> String {
        self.function.clone()
    }

    fn failed_args(&self) -> String {
        self.args.clone()
    }
}

impl Drop for FakeError {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

#[derive(Debug, Clone, Default)]
struct FakeStream {
    enabled: bool,
    width: c_int,
    height: c_int,
    format: c_int,
    framerate: c_int,
    frame_number: c_int,
    frame: Vec<u8>,
    frame_missing: bool,
    distortion_override: Option<c_int>,
}

struct FakeOption {
    min: c_int,
    max: c_int,
    value: c_int,
}

pub(crate) struct FakeDevice {
    name: String,
    depth_scale: f32,
    streaming: bool,
    streams: [FakeStream; 4],
    options: HashMap<c_int, FakeOption>,
    extrinsics: HashMap<(c_int, c_int), rs_extrinsics>,
}

impl FakeDevice {
    pub fn new(name: &str) -> Self {
        let mut options = HashMap::new();
        options.insert(
            DeviceOption::R200LrGain.code(),
            FakeOption { min: 100, max: 1600, value: 400 },
        );
        options.insert(
            DeviceOption::R200EmitterEnabled.code(),
            FakeOption { min: 0, max: 1, value: 1 },
        );

        let mut extrinsics = HashMap::new();
        extrinsics.insert(
            (sys::RS_STREAM_DEPTH, sys::RS_STREAM_COLOR),
            rs_extrinsics {
                rotation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
                translation: [0.025, 0.0, 0.0],
            },
        );

        Self {
            name: name.to_string(),
            depth_scale: 0.001,
            streaming: false,
            streams: Default::default(),
            options,
            extrinsics,
        }
    }
}

pub(crate) struct FakeDriver {
    api_version: c_int,
    devices: RefCell<Vec<FakeDevice>>,
    failures: RefCell<HashMap<String, String>>,
    calls: RefCell<Vec<String>>,
    last_args: RefCell<String>,
    released: Rc<Cell<usize>>,
    deleted: Rc<Cell<usize>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::with_devices(Vec::new())
    }

    pub fn with_devices(devices: Vec<FakeDevice>) -> Self {
        Self {
            api_version: sys::RS_API_VERSION,
            devices: RefCell::new(devices),
            failures: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            last_args: RefCell::new(String::new()),
            released: Rc::new(Cell::new(0)),
            deleted: Rc::new(Cell::new(0)),
        }
    }

    /// Make every later call of `function` fail with `message`.
    pub fn fail(&self, function: &str, message: &str) {
        self.failures
            .borrow_mut()
            .insert(function.to_string(), message.to_string());
    }

    /// Native function names called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Argument string of the most recent call.
    pub fn last_args(&self) -> String {
        self.last_args.borrow().clone()
    }

    /// Number of error objects released so far.
    pub fn released_counter(&self) -> Rc<Cell<usize>> {
        self.released.clone()
    }

    /// Number of `rs_delete_context` calls so far.
    pub fn deleted_counter(&self) -> Rc<Cell<usize>> {
        self.deleted.clone()
    }

    /// Overwrite the stored format code of a stream, bypassing validation.
    pub fn set_raw_format(&self, dev: usize, stream: Stream, code: c_int) {
        self.stream_mut(dev, stream, |s| s.format = code);
    }

    /// Report `code` as the distortion model of a stream.
    pub fn set_raw_distortion(&self, dev: usize, stream: Stream, code: c_int) {
        self.stream_mut(dev, stream, |s| s.distortion_override = Some(code));
    }

    /// Make `rs_get_frame_data` return null for a stream.
    pub fn drop_frame(&self, dev: usize, stream: Stream) {
        self.stream_mut(dev, stream, |s| s.frame_missing = true);
    }

    fn stream_mut(&self, dev: usize, stream: Stream, f: impl FnOnce(&mut FakeStream)) {
        f(&mut self.devices.borrow_mut()[dev].streams[stream.code() as usize]);
    }

    /// Record a call and apply any injected failure. Returns `false` when
    /// the call has failed.
    fn enter(&self, function: &str, args: String, err: &mut ErrorSlot<FakeError>) -> bool {
        self.calls.borrow_mut().push(function.to_string());
        *self.last_args.borrow_mut() = args;
        match self.failures.borrow().get(function) {
            Some(message) => {
                self.raise(function, message, err);
                false
            }
            None => true,
        }
    }

    fn raise(&self, function: &str, message: &str, err: &mut ErrorSlot<FakeError>) {
        let args = self.last_args.borrow();
        *err = Some(FakeError::new(message, function, &args, &self.released));
    }

    fn stream_index(
        &self,
        function: &str,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> Option<usize> {
        if (0..sys::RS_STREAM_COUNT).contains(&stream) {
            Some(stream as usize)
        } else {
            self.raise(function, "bad enum value for argument \"stream\"", err);
            None
        }
    }

    /// Run `f` on an enabled stream, failing the call otherwise.
    fn with_enabled_stream<T: Default>(
        &self,
        function: &str,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
        f: impl FnOnce(&FakeStream) -> T,
    ) -> T {
        if !self.enter(function, format!("device:{}, stream:{}", dev, stream), err) {
            return T::default();
        }
        let Some(index) = self.stream_index(function, stream, err) else {
            return T::default();
        };
        let devices = self.devices.borrow();
        let s = &devices[dev].streams[index];
        if !s.enabled {
            self.raise(function, "stream not enabled", err);
            return T::default();
        }
        f(s)
    }
}

fn default_format(stream: usize) -> c_int {
    match stream as c_int {
        sys::RS_STREAM_DEPTH => sys::RS_FORMAT_Z16,
        sys::RS_STREAM_COLOR => sys::RS_FORMAT_RGB8,
        _ => sys::RS_FORMAT_Y8,
    }
}

fn format_allowed(stream: usize, format: c_int) -> bool {
    let allowed: &[c_int] = match stream as c_int {
        sys::RS_STREAM_DEPTH => &[sys::RS_FORMAT_Z16],
        sys::RS_STREAM_COLOR => &[
            sys::RS_FORMAT_YUYV,
            sys::RS_FORMAT_RGB8,
            sys::RS_FORMAT_BGR8,
            sys::RS_FORMAT_RGBA8,
            sys::RS_FORMAT_BGRA8,
        ],
        _ => &[sys::RS_FORMAT_Y8, sys::RS_FORMAT_Y16],
    };
    format == sys::RS_FORMAT_ANY || allowed.contains(&format)
}

fn configure(
    s: &mut FakeStream,
    stream: usize,
    width: c_int,
    height: c_int,
    format: c_int,
    framerate: c_int,
) {
    let format = if format == sys::RS_FORMAT_ANY {
        default_format(stream)
    } else {
        format
    };
    let bytes_per_pixel = Format::try_from(format)
        .ok()
        .and_then(Format::bytes_per_pixel)
        .unwrap_or(1);
    *s = FakeStream {
        enabled: true,
        width,
        height,
        format,
        framerate,
        frame_number: 0,
        frame: vec![0; (width * height) as usize * bytes_per_pixel],
        ..FakeStream::default()
    };
}

impl Driver for FakeDriver {
    type ContextHandle = u32;
    type DeviceHandle = usize;
    type Error = FakeError;

    fn create_context(&self, api_version: c_int, err: &mut ErrorSlot<FakeError>) -> u32 {
        let function = "rs_create_context";
        if !self.enter(function, format!("api_version:{}", api_version), err) {
            return 0;
        }
        if api_version != self.api_version {
            self.raise(function, "librealsense API version mismatch", err);
            return 0;
        }
        CONTEXT_HANDLE
    }

    unsafe fn delete_context(&self, ctx: u32, err: &mut ErrorSlot<FakeError>) {
        self.deleted.set(self.deleted.get() + 1);
        self.enter("rs_delete_context", format!("context:{}", ctx), err);
    }

    unsafe fn device_count(&self, ctx: u32, err: &mut ErrorSlot<FakeError>) -> c_int {
        if !self.enter("rs_get_device_count", format!("context:{}", ctx), err) {
            return -1;
        }
        self.devices.borrow().len() as c_int
    }

    unsafe fn device(&self, ctx: u32, index: c_int, err: &mut ErrorSlot<FakeError>) -> usize {
        let function = "rs_get_device";
        if !self.enter(function, format!("context:{}, index:{}", ctx, index), err) {
            return usize::MAX;
        }
        if index < 0 || index as usize >= self.devices.borrow().len() {
            self.raise(function, "out of range value for argument \"index\"", err);
            return usize::MAX;
        }
        index as usize
    }

    unsafe fn device_name(&self, dev: usize, err: &mut ErrorSlot<FakeError>) -> String {
        if !self.enter("rs_get_device_name", format!("device:{}", dev), err) {
            return "garbage".to_string();
        }
        self.devices.borrow()[dev].name.clone()
    }

    unsafe fn device_extrinsics(
        &self,
        dev: usize,
        from: c_int,
        to: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> rs_extrinsics {
        let function = "rs_get_device_extrinsics";
        if !self.enter(function, format!("device:{}, from:{}, to:{}", dev, from, to), err) {
            return rs_extrinsics::default();
        }
        if from == to {
            return rs_extrinsics::from(&crate::types::Extrinsics::IDENTITY);
        }
        match self.devices.borrow()[dev].extrinsics.get(&(from, to)) {
            Some(extrin) => *extrin,
            None => {
                self.raise(function, "no extrinsics between these streams", err);
                rs_extrinsics::default()
            }
        }
    }

    unsafe fn device_depth_scale(&self, dev: usize, err: &mut ErrorSlot<FakeError>) -> f32 {
        if !self.enter("rs_get_device_depth_scale", format!("device:{}", dev), err) {
            return f32::NAN;
        }
        self.devices.borrow()[dev].depth_scale
    }

    unsafe fn device_supports_option(
        &self,
        dev: usize,
        option: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> bool {
        let args = format!("device:{}, option:{}", dev, option);
        if !self.enter("rs_device_supports_option", args, err) {
            return true;
        }
        self.devices.borrow()[dev].options.contains_key(&option)
    }

    unsafe fn enable_stream(
        &self,
        dev: usize,
        stream: c_int,
        width: c_int,
        height: c_int,
        format: c_int,
        framerate: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) {
        let function = "rs_enable_stream";
        let args = format!(
            "device:{}, stream:{}, width:{}, height:{}, format:{}, framerate:{}",
            dev, stream, width, height, format, framerate
        );
        if !self.enter(function, args, err) {
            return;
        }
        let Some(index) = self.stream_index(function, stream, err) else {
            return;
        };
        let mut devices = self.devices.borrow_mut();
        let device = &mut devices[dev];
        if device.streaming {
            self.raise(function, "device is streaming", err);
            return;
        }
        let mode_ok = width > 0
            && height > 0
            && width % 2 == 0
            && height % 2 == 0
            && SUPPORTED_FRAMERATES.contains(&framerate)
            && format_allowed(index, format);
        if !mode_ok {
            self.raise(function, "requested stream mode is not supported", err);
            return;
        }
        configure(&mut device.streams[index], index, width, height, format, framerate);
    }

    unsafe fn enable_stream_preset(
        &self,
        dev: usize,
        stream: c_int,
        preset: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) {
        let function = "rs_enable_stream_preset";
        let args = format!("device:{}, stream:{}, preset:{}", dev, stream, preset);
        if !self.enter(function, args, err) {
            return;
        }
        let Some(index) = self.stream_index(function, stream, err) else {
            return;
        };
        let (width, height, framerate) = match preset {
            sys::RS_PRESET_BEST_QUALITY => (640, 480, 30),
            sys::RS_PRESET_LARGEST_IMAGE => (1920, 1080, 30),
            sys::RS_PRESET_HIGHEST_FRAMERATE => (320, 240, 60),
            _ => {
                self.raise(function, "bad enum value for argument \"preset\"", err);
                return;
            }
        };
        let mut devices = self.devices.borrow_mut();
        let device = &mut devices[dev];
        if device.streaming {
            self.raise(function, "device is streaming", err);
            return;
        }
        let format = sys::RS_FORMAT_ANY;
        configure(&mut device.streams[index], index, width, height, format, framerate);
    }

    unsafe fn stream_is_enabled(
        &self,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> bool {
        let function = "rs_stream_is_enabled";
        if !self.enter(function, format!("device:{}, stream:{}", dev, stream), err) {
            return true;
        }
        match self.stream_index(function, stream, err) {
            Some(index) => self.devices.borrow()[dev].streams[index].enabled,
            None => false,
        }
    }

    unsafe fn stream_intrinsics(
        &self,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> rs_intrinsics {
        self.with_enabled_stream("rs_get_stream_intrinsics", dev, stream, err, |s| {
            let (model, distortion_coeff) = if stream == sys::RS_STREAM_COLOR {
                let coeff = [0.1, -0.25, 0.001, 0.0, 0.05];
                (sys::RS_DISTORTION_MODIFIED_BROWN_CONRADY, coeff)
            } else {
                (sys::RS_DISTORTION_NONE, [0.0; 5])
            };
            let distortion_model = s.distortion_override.unwrap_or(model);
            rs_intrinsics {
                image_size: [s.width, s.height],
                focal_length: [s.width as f32, s.width as f32],
                principal_point: [s.width as f32 / 2.0, s.height as f32 / 2.0],
                distortion_coeff,
                distortion_model,
            }
        })
    }

    unsafe fn stream_format(
        &self,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> c_int {
        self.with_enabled_stream("rs_get_stream_format", dev, stream, err, |s| s.format)
    }

    unsafe fn stream_framerate(
        &self,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> c_int {
        self.with_enabled_stream("rs_get_stream_framerate", dev, stream, err, |s| s.framerate)
    }

    unsafe fn start_device(&self, dev: usize, err: &mut ErrorSlot<FakeError>) {
        let function = "rs_start_device";
        if !self.enter(function, format!("device:{}", dev), err) {
            return;
        }
        let mut devices = self.devices.borrow_mut();
        let device = &mut devices[dev];
        if device.streaming {
            self.raise(function, "device already streaming", err);
        } else if !device.streams.iter().any(|s| s.enabled) {
            self.raise(function, "no streams enabled", err);
        } else {
            device.streaming = true;
        }
    }

    unsafe fn stop_device(&self, dev: usize, err: &mut ErrorSlot<FakeError>) {
        let function = "rs_stop_device";
        if !self.enter(function, format!("device:{}", dev), err) {
            return;
        }
        let mut devices = self.devices.borrow_mut();
        let device = &mut devices[dev];
        if !device.streaming {
            self.raise(function, "device not streaming", err);
        } else {
            device.streaming = false;
        }
    }

    unsafe fn device_is_streaming(&self, dev: usize, err: &mut ErrorSlot<FakeError>) -> bool {
        if !self.enter("rs_device_is_streaming", format!("device:{}", dev), err) {
            return true;
        }
        self.devices.borrow()[dev].streaming
    }

    unsafe fn set_device_option(
        &self,
        dev: usize,
        option: c_int,
        value: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) {
        let function = "rs_set_device_option";
        let args = format!("device:{}, option:{}, value:{}", dev, option, value);
        if !self.enter(function, args, err) {
            return;
        }
        let mut devices = self.devices.borrow_mut();
        match devices[dev].options.get_mut(&option) {
            None => self.raise(function, "option not supported by this device", err),
            Some(opt) if value < opt.min || value > opt.max => {
                self.raise(function, "value out of range", err)
            }
            Some(opt) => opt.value = value,
        }
    }

    unsafe fn device_option(
        &self,
        dev: usize,
        option: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> c_int {
        let function = "rs_get_device_option";
        if !self.enter(function, format!("device:{}, option:{}", dev, option), err) {
            return -1;
        }
        match self.devices.borrow()[dev].options.get(&option) {
            Some(opt) => opt.value,
            None => {
                self.raise(function, "option not supported by this device", err);
                -1
            }
        }
    }

    unsafe fn wait_for_frames(
        &self,
        dev: usize,
        stream_bits: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) {
        let function = "rs_wait_for_frames";
        let args = format!("device:{}, stream_bits:{}", dev, stream_bits);
        if !self.enter(function, args, err) {
            return;
        }
        let mut devices = self.devices.borrow_mut();
        let device = &mut devices[dev];
        if !device.streaming {
            self.raise(function, "device not streaming", err);
            return;
        }
        let requested = |i: usize| stream_bits & (1 << i) != 0;
        if device.streams.iter().enumerate().any(|(i, s)| requested(i) && !s.enabled) {
            self.raise(function, "stream not enabled", err);
            return;
        }
        for (i, s) in device.streams.iter_mut().enumerate() {
            if requested(i) {
                s.frame_number += 1;
                s.frame.fill(s.frame_number as u8);
            }
        }
    }

    unsafe fn frame_number(
        &self,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> c_int {
        self.with_enabled_stream("rs_get_frame_number", dev, stream, err, |s| s.frame_number)
    }

    unsafe fn frame_data(
        &self,
        dev: usize,
        stream: c_int,
        err: &mut ErrorSlot<FakeError>,
    ) -> *const c_void {
        let function = "rs_get_frame_data";
        if !self.enter(function, format!("device:{}, stream:{}", dev, stream), err) {
            return std::ptr::null();
        }
        let Some(index) = self.stream_index(function, stream, err) else {
            return std::ptr::null();
        };
        let devices = self.devices.borrow();
        let s = &devices[dev].streams[index];
        if !s.enabled {
            self.raise(function, "stream not enabled", err);
            return std::ptr::null();
        }
        if s.frame_missing {
            return std::ptr::null();
        }
        s.frame.as_ptr().cast()
    }
}

/// Distortion-free pinhole model.
impl Geometry for FakeDriver {
    fn deproject_pixel_to_point(
        &self,
        intrin: &rs_intrinsics,
        pixel: [f32; 2],
        depth: f32,
    ) -> [f32; 3] {
        self.calls.borrow_mut().push("rs_deproject_pixel_to_point".to_string());
        let x = (pixel[0] - intrin.principal_point[0]) / intrin.focal_length[0];
        let y = (pixel[1] - intrin.principal_point[1]) / intrin.focal_length[1];
        [x * depth, y * depth, depth]
    }

    fn project_point_to_pixel(&self, intrin: &rs_intrinsics, point: [f32; 3]) -> [f32; 2] {
        self.calls.borrow_mut().push("rs_project_point_to_pixel".to_string());
        let x = point[0] / point[2];
        let y = point[1] / point[2];
        [
            x * intrin.focal_length[0] + intrin.principal_point[0],
            y * intrin.focal_length[1] + intrin.principal_point[1],
        ]
    }

    fn transform_point_to_point(&self, extrin: &rs_extrinsics, p: [f32; 3]) -> [f32; 3] {
        self.calls.borrow_mut().push("rs_transform_point_to_point".to_string());
        let r = &extrin.rotation;
        let t = &extrin.translation;
        [
            r[0] * p[0] + r[3] * p[1] + r[6] * p[2] + t[0],
            r[1] * p[0] + r[4] * p[1] + r[7] * p[2] + t[1],
            r[2] * p[0] + r[5] * p[1] + r[8] * p[2] + t[2],
        ]
    }
}
