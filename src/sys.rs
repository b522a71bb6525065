//! Raw librealsense ABI: integer codes and `#[repr(C)]` struct mirrors.
//!
//! Typed wrappers never reinterpret memory; they marshal field by field
//! through the `From`/`TryFrom` impls at the bottom of this file.
#![allow(non_camel_case_types)]

use crate::types::{Distortion, Extrinsics, Float2, Float3, Float3x3, Int2, Intrinsics};
use std::ffi::c_int;

/// API version this crate was written against, passed to `rs_create_context`.
pub const RS_API_VERSION: c_int = 3;

// -- rs_stream --
pub const RS_STREAM_DEPTH: c_int = 0;
pub const RS_STREAM_COLOR: c_int = 1;
pub const RS_STREAM_INFRARED: c_int = 2;
pub const RS_STREAM_INFRARED2: c_int = 3;
pub const RS_STREAM_COUNT: c_int = 4;

// -- rs_format --
pub const RS_FORMAT_ANY: c_int = 0;
pub const RS_FORMAT_Z16: c_int = 1;
pub const RS_FORMAT_YUYV: c_int = 2;
pub const RS_FORMAT_RGB8: c_int = 3;
pub const RS_FORMAT_BGR8: c_int = 4;
pub const RS_FORMAT_RGBA8: c_int = 5;
pub const RS_FORMAT_BGRA8: c_int = 6;
pub const RS_FORMAT_Y8: c_int = 7;
pub const RS_FORMAT_Y16: c_int = 8;

// -- rs_preset --
pub const RS_PRESET_BEST_QUALITY: c_int = 0;
pub const RS_PRESET_LARGEST_IMAGE: c_int = 1;
pub const RS_PRESET_HIGHEST_FRAMERATE: c_int = 2;

// -- rs_distortion --
pub const RS_DISTORTION_NONE: c_int = 0;
pub const RS_DISTORTION_MODIFIED_BROWN_CONRADY: c_int = 1;
pub const RS_DISTORTION_INVERSE_BROWN_CONRADY: c_int = 2;

// -- rs_option --
pub const RS_OPTION_F200_LASER_POWER: c_int = 0;
pub const RS_OPTION_F200_ACCURACY: c_int = 1;
pub const RS_OPTION_F200_MOTION_RANGE: c_int = 2;
pub const RS_OPTION_F200_FILTER_OPTION: c_int = 3;
pub const RS_OPTION_F200_CONFIDENCE_THRESHOLD: c_int = 4;
pub const RS_OPTION_F200_DYNAMIC_FPS: c_int = 5;
pub const RS_OPTION_R200_LR_AUTO_EXPOSURE_ENABLED: c_int = 6;
pub const RS_OPTION_R200_LR_GAIN: c_int = 7;
pub const RS_OPTION_R200_LR_EXPOSURE: c_int = 8;
pub const RS_OPTION_R200_EMITTER_ENABLED: c_int = 9;
pub const RS_OPTION_R200_DEPTH_CONTROL_PRESET: c_int = 10;
pub const RS_OPTION_R200_DEPTH_UNITS: c_int = 11;
pub const RS_OPTION_R200_DEPTH_CLAMP_MIN: c_int = 12;
pub const RS_OPTION_R200_DEPTH_CLAMP_MAX: c_int = 13;
pub const RS_OPTION_R200_DISPARITY_MODE_ENABLED: c_int = 14;
pub const RS_OPTION_R200_DISPARITY_MULTIPLIER: c_int = 15;
pub const RS_OPTION_R200_DISPARITY_SHIFT: c_int = 16;

/// Native `rs_intrinsics`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct rs_intrinsics {
    pub image_size: [c_int; 2],
    pub focal_length: [f32; 2],
    pub principal_point: [f32; 2],
    pub distortion_coeff: [f32; 5],
    /// `rs_distortion` code.
    pub distortion_model: c_int,
}

/// Native `rs_extrinsics`. `rotation` is column-major.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct rs_extrinsics {
    pub rotation: [f32; 9],
    pub translation: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<rs_intrinsics>() == 48);
const _: () = assert!(std::mem::size_of::<rs_extrinsics>() == 48);

impl From<&Intrinsics> for rs_intrinsics {
    fn from(intrin: &Intrinsics) -> Self {
        Self {
            image_size: [intrin.image_size.x, intrin.image_size.y],
            focal_length: [intrin.focal_length.x, intrin.focal_length.y],
            principal_point: [intrin.principal_point.x, intrin.principal_point.y],
            distortion_coeff: intrin.distortion_coeff,
            distortion_model: intrin.distortion_model as c_int,
        }
    }
}

/// Fails with the raw distortion code when it is not a known [`Distortion`].
impl TryFrom<rs_intrinsics> for Intrinsics {
    type Error = c_int;

    fn try_from(raw: rs_intrinsics) -> Result<Self, c_int> {
        Ok(Self {
            image_size: Int2 {
                x: raw.image_size[0],
                y: raw.image_size[1],
            },
            focal_length: Float2 {
                x: raw.focal_length[0],
                y: raw.focal_length[1],
            },
            principal_point: Float2 {
                x: raw.principal_point[0],
                y: raw.principal_point[1],
            },
            distortion_coeff: raw.distortion_coeff,
            distortion_model: Distortion::try_from(raw.distortion_model)?,
        })
    }
}

impl From<&Extrinsics> for rs_extrinsics {
    fn from(extrin: &Extrinsics) -> Self {
        let Float3x3 { x, y, z } = extrin.rotation;
        Self {
            rotation: [x.x, x.y, x.z, y.x, y.y, y.z, z.x, z.y, z.z],
            translation: extrin.translation.into(),
        }
    }
}

impl From<rs_extrinsics> for Extrinsics {
    fn from(raw: rs_extrinsics) -> Self {
        let r = raw.rotation;
        Self {
            rotation: Float3x3 {
                x: Float3 { x: r[0], y: r[1], z: r[2] },
                y: Float3 { x: r[3], y: r[4], z: r[5] },
                z: Float3 { x: r[6], y: r[7], z: r[8] },
            },
            translation: raw.translation.into(),
        }
    }
}
