//! Conversions between [`Frame`] and OpenCV matrices, used by every
//! OpenCV-backed adapter.

use opencv::core::{Mat, Scalar, CV_16UC1, CV_8UC1, CV_8UC3};
use opencv::prelude::*;

use super::frame::{Frame, PixelFormat};

fn mat_type(format: PixelFormat) -> i32 {
    match format {
        PixelFormat::Rgb8 | PixelFormat::Bgr8 => CV_8UC3,
        PixelFormat::Gray8 => CV_8UC1,
        PixelFormat::Depth16 => CV_16UC1,
    }
}

/// Copies a frame into a freshly allocated matrix of matching type.
pub fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        mat_type(frame.format()),
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(frame.data());
    Ok(mat)
}

/// Copies a matrix into a frame tagged with `format`.
///
/// Returns `None` for an empty matrix.
pub fn mat_to_frame(mat: &Mat, format: PixelFormat, index: usize) -> opencv::Result<Option<Frame>> {
    if mat.empty() {
        return Ok(None);
    }
    let data = if mat.is_continuous() {
        mat.data_bytes()?.to_vec()
    } else {
        mat.try_clone()?.data_bytes()?.to_vec()
    };
    Ok(Some(Frame::new(
        data,
        mat.cols() as u32,
        mat.rows() as u32,
        format,
        index,
    )))
}
