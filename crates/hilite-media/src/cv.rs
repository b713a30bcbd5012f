//! Bridging `image` buffers into OpenCV matrices.

use image::{GrayImage, RgbImage};
use opencv::core::{Mat, Scalar, CV_8UC1, CV_8UC3};
use opencv::prelude::*;

use crate::error::MediaError;

/// Copy a grayscale image into a single-channel `Mat`.
pub fn gray_to_mat(img: &GrayImage) -> opencv::Result<Mat> {
    copy_to_mat(img.as_raw(), img.width(), img.height(), CV_8UC1)
}

/// Copy an RGB image into a three-channel `Mat` (channel order stays RGB).
pub fn rgb_to_mat(img: &RgbImage) -> opencv::Result<Mat> {
    copy_to_mat(img.as_raw(), img.width(), img.height(), CV_8UC3)
}

fn copy_to_mat(data: &[u8], width: u32, height: u32, typ: i32) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(height as i32, width as i32, typ, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(data);
    Ok(mat)
}

/// Wrap an OpenCV failure with the stage it happened in.
pub fn cv_error(stage: &str, err: opencv::Error) -> MediaError {
    MediaError::detection_failed(format!("{stage}: {err}"))
}
