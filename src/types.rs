use crate::driver::Geometry;
use crate::sys;
use std::ffi::c_int;
use std::fmt;

/// Declares a `#[repr(i32)]` enum mirroring a native enumeration, with
/// `TryFrom<c_int>` decoding and the native upper-case name as `Display`.
macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:path => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[repr(i32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            /// Every variant, in native code order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Native integer code.
            pub fn code(self) -> c_int {
                self as c_int
            }
        }

        impl TryFrom<c_int> for $name {
            type Error = c_int;

            fn try_from(code: c_int) -> Result<Self, c_int> {
                match code {
                    $(x if x == $code => Ok($name::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(match self {
                    $($name::$variant => $label,)+
                })
            }
        }
    };
}

native_enum! {
    /// Sensor output channel.
    pub enum Stream {
        Depth = sys::RS_STREAM_DEPTH => "DEPTH",
        Color = sys::RS_STREAM_COLOR => "COLOR",
        Infrared = sys::RS_STREAM_INFRARED => "INFRARED",
        Infrared2 = sys::RS_STREAM_INFRARED2 => "INFRARED2",
    }
}

native_enum! {
    /// Pixel format of a stream.
    pub enum Format {
        /// Let the driver pick a format when enabling a stream.
        Any = sys::RS_FORMAT_ANY => "ANY",
        Z16 = sys::RS_FORMAT_Z16 => "Z16",
        Yuyv = sys::RS_FORMAT_YUYV => "YUYV",
        Rgb8 = sys::RS_FORMAT_RGB8 => "RGB8",
        Bgr8 = sys::RS_FORMAT_BGR8 => "BGR8",
        Rgba8 = sys::RS_FORMAT_RGBA8 => "RGBA8",
        Bgra8 = sys::RS_FORMAT_BGRA8 => "BGRA8",
        Y8 = sys::RS_FORMAT_Y8 => "Y8",
        Y16 = sys::RS_FORMAT_Y16 => "Y16",
    }
}

native_enum! {
    /// Named stream configuration supplied by the driver.
    pub enum Preset {
        BestQuality = sys::RS_PRESET_BEST_QUALITY => "BEST_QUALITY",
        LargestImage = sys::RS_PRESET_LARGEST_IMAGE => "LARGEST_IMAGE",
        HighestFramerate = sys::RS_PRESET_HIGHEST_FRAMERATE => "HIGHEST_FRAMERATE",
    }
}

native_enum! {
    /// Lens distortion model of a stream's intrinsics.
    pub enum Distortion {
        None = sys::RS_DISTORTION_NONE => "NONE",
        ModifiedBrownConrady = sys::RS_DISTORTION_MODIFIED_BROWN_CONRADY
            => "MODIFIED_BROWN_CONRADY",
        InverseBrownConrady = sys::RS_DISTORTION_INVERSE_BROWN_CONRADY => "INVERSE_BROWN_CONRADY",
    }
}

native_enum! {
    /// Camera-specific device option. `F200*` options apply to the F200,
    /// `R200*` options to the R200.
    pub enum DeviceOption {
        F200LaserPower = sys::RS_OPTION_F200_LASER_POWER => "F200_LASER_POWER",
        F200Accuracy = sys::RS_OPTION_F200_ACCURACY => "F200_ACCURACY",
        F200MotionRange = sys::RS_OPTION_F200_MOTION_RANGE => "F200_MOTION_RANGE",
        F200FilterOption = sys::RS_OPTION_F200_FILTER_OPTION => "F200_FILTER_OPTION",
        F200ConfidenceThreshold = sys::RS_OPTION_F200_CONFIDENCE_THRESHOLD
            => "F200_CONFIDENCE_THRESHOLD",
        F200DynamicFps = sys::RS_OPTION_F200_DYNAMIC_FPS => "F200_DYNAMIC_FPS",
        R200LrAutoExposureEnabled = sys::RS_OPTION_R200_LR_AUTO_EXPOSURE_ENABLED
            => "R200_LR_AUTO_EXPOSURE_ENABLED",
        R200LrGain = sys::RS_OPTION_R200_LR_GAIN => "R200_LR_GAIN",
        R200LrExposure = sys::RS_OPTION_R200_LR_EXPOSURE => "R200_LR_EXPOSURE",
        R200EmitterEnabled = sys::RS_OPTION_R200_EMITTER_ENABLED => "R200_EMITTER_ENABLED",
        R200DepthControlPreset = sys::RS_OPTION_R200_DEPTH_CONTROL_PRESET
            => "R200_DEPTH_CONTROL_PRESET",
        R200DepthUnits = sys::RS_OPTION_R200_DEPTH_UNITS => "R200_DEPTH_UNITS",
        R200DepthClampMin = sys::RS_OPTION_R200_DEPTH_CLAMP_MIN => "R200_DEPTH_CLAMP_MIN",
        R200DepthClampMax = sys::RS_OPTION_R200_DEPTH_CLAMP_MAX => "R200_DEPTH_CLAMP_MAX",
        R200DisparityModeEnabled = sys::RS_OPTION_R200_DISPARITY_MODE_ENABLED
            => "R200_DISPARITY_MODE_ENABLED",
        R200DisparityMultiplier = sys::RS_OPTION_R200_DISPARITY_MULTIPLIER
            => "R200_DISPARITY_MULTIPLIER",
        R200DisparityShift = sys::RS_OPTION_R200_DISPARITY_SHIFT => "R200_DISPARITY_SHIFT",
    }
}

impl Format {
    /// Bytes per pixel, or `None` for [`Format::Any`].
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Format::Any => None,
            Format::Y8 => Some(1),
            Format::Z16 | Format::Yuyv | Format::Y16 => Some(2),
            Format::Rgb8 | Format::Bgr8 => Some(3),
            Format::Rgba8 | Format::Bgra8 => Some(4),
        }
    }
}

bitflags::bitflags! {
    /// Stream bitmask accepted by `wait_for_frames`: bit `1 << code` per stream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StreamSet: i32 {
        const DEPTH     = 1 << sys::RS_STREAM_DEPTH;
        const COLOR     = 1 << sys::RS_STREAM_COLOR;
        const INFRARED  = 1 << sys::RS_STREAM_INFRARED;
        const INFRARED2 = 1 << sys::RS_STREAM_INFRARED2;
    }
}

impl From<Stream> for StreamSet {
    fn from(stream: Stream) -> Self {
        StreamSet::from_bits_truncate(1 << stream.code())
    }
}

impl FromIterator<Stream> for StreamSet {
    fn from_iter<I: IntoIterator<Item = Stream>>(iter: I) -> Self {
        iter.into_iter()
            .fold(StreamSet::empty(), |set, s| set | StreamSet::from(s))
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Int2 {
    pub x: c_int,
    pub y: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float2 {
    pub x: f32,
    pub y: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3x3 matrix stored as three columns.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float3x3 {
    pub x: Float3,
    pub y: Float3,
    pub z: Float3,
}

impl From<[f32; 2]> for Float2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Float2> for [f32; 2] {
    fn from(p: Float2) -> Self {
        [p.x, p.y]
    }
}

impl From<[f32; 3]> for Float3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Float3> for [f32; 3] {
    fn from(p: Float3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Per-stream camera calibration.
///
/// Equality is bitwise over every field: an intrinsics value holding NaN
/// equals an identical copy of itself, while `0.0` and `-0.0` differ.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub image_size: Int2,
    pub focal_length: Float2,
    pub principal_point: Float2,
    pub distortion_coeff: [f32; 5],
    pub distortion_model: Distortion,
}

impl Intrinsics {
    pub fn width(&self) -> c_int {
        self.image_size.x
    }

    pub fn height(&self) -> c_int {
        self.image_size.y
    }

    /// Convert a pixel and its depth into a 3D point in the stream's frame.
    pub fn deproject<G: Geometry + ?Sized>(
        &self,
        geometry: &G,
        pixel: Float2,
        depth: f32,
    ) -> Float3 {
        geometry
            .deproject_pixel_to_point(&sys::rs_intrinsics::from(self), pixel.into(), depth)
            .into()
    }

    /// Project a 3D point in the stream's frame onto the image plane.
    pub fn project<G: Geometry + ?Sized>(&self, geometry: &G, point: Float3) -> Float2 {
        geometry
            .project_point_to_pixel(&sys::rs_intrinsics::from(self), point.into())
            .into()
    }

    fn bit_image(&self) -> ([c_int; 2], [u32; 9], c_int) {
        let f = |v: f32| v.to_bits();
        let c = self.distortion_coeff;
        (
            [self.image_size.x, self.image_size.y],
            [
                f(self.focal_length.x),
                f(self.focal_length.y),
                f(self.principal_point.x),
                f(self.principal_point.y),
                f(c[0]),
                f(c[1]),
                f(c[2]),
                f(c[3]),
                f(c[4]),
            ],
            self.distortion_model.code(),
        )
    }
}

impl PartialEq for Intrinsics {
    fn eq(&self, other: &Self) -> bool {
        self.bit_image() == other.bit_image()
    }
}

impl Eq for Intrinsics {}

/// Rigid transform between the coordinate frames of two streams.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extrinsics {
    pub rotation: Float3x3,
    pub translation: Float3,
}

impl Extrinsics {
    pub const IDENTITY: Extrinsics = Extrinsics {
        rotation: Float3x3 {
            x: Float3 { x: 1.0, y: 0.0, z: 0.0 },
            y: Float3 { x: 0.0, y: 1.0, z: 0.0 },
            z: Float3 { x: 0.0, y: 0.0, z: 1.0 },
        },
        translation: Float3 { x: 0.0, y: 0.0, z: 0.0 },
    };

    /// Exact comparison against the identity transform, no tolerance.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map a point from the source stream's frame into the target's.
    pub fn transform<G: Geometry + ?Sized>(&self, geometry: &G, point: Float3) -> Float3 {
        geometry
            .transform_point_to_point(&sys::rs_extrinsics::from(self), point.into())
            .into()
    }
}
