/*! Projection from UI coordinates to clip space. */

/// A column-major 4x4 matrix, laid out the way WGSL's `mat4x4<f32>` expects it.
pub type Matrix = [f32; 16];

/// Orthographic projection, column-major.
///
/// Maps `left..right` to `-1..1` in x, `bottom..top` to `-1..1` in y and `near..far` to
/// `1..-1` in z.
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix {
    [
        2.0 / (right - left),
        0.0,
        0.0,
        0.0,
        //
        0.0,
        2.0 / (top - bottom),
        0.0,
        0.0,
        //
        0.0,
        0.0,
        -2.0 / (far - near),
        0.0,
        //
        -(right + left) / (right - left),
        -(top + bottom) / (top - bottom),
        -(far + near) / (far - near),
        1.0,
    ]
}

/**
The projection for a UI frame covering `display_pos .. display_pos + display_size`.

UI coordinates grow downward from the top-left corner while WebGPU clip space grows upward,
so the bottom edge is `display_pos.y + height` and the top edge is `display_pos.y`.
*/
pub fn ui_projection(display_pos: [f32; 2], display_size: [f32; 2]) -> Matrix {
    let left = display_pos[0];
    let right = display_pos[0] + display_size[0];
    let top = display_pos[1];
    let bottom = display_pos[1] + display_size[1];
    orthographic(left, right, bottom, top, -1.0, 1.0)
}

/// Applies `m` to the point `(x, y, 0, 1)`.
pub fn transform_point(m: &Matrix, x: f32, y: f32) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (row, value) in out.iter_mut().enumerate() {
        *value = m[row] * x + m[4 + row] * y + m[12 + row];
    }
    out
}
