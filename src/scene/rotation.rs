//! Rotation helpers
//!
//! Euler angles are XYZ in the extrinsic sense: a rotation about the global X
//! axis, then global Y, then global Z, so `R = Rz * Ry * Rx`. Applying a
//! rotation matrix to an object always goes through that decomposition and
//! three single-axis turns in X, Y, Z order. The order is not interchangeable.

use bevy::math::{DMat3, DQuat, DVec3};

/// Below this `cos(y)` the decomposition is treated as gimbal locked
const GIMBAL_EPSILON: f64 = 1e-6;

/// Build a matrix from row-major entries (`rows[i][j]` is `R_{i+1}_{j+1}`)
pub fn matrix_from_rows(rows: [[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(rows[0][0], rows[1][0], rows[2][0]),
        DVec3::new(rows[0][1], rows[1][1], rows[2][1]),
        DVec3::new(rows[0][2], rows[1][2], rows[2][2]),
    )
}

/// Decompose a rotation matrix into XYZ Euler angles (radians)
pub fn euler_from_matrix(m: &DMat3) -> [f64; 3] {
    let r11 = m.x_axis.x;
    let r21 = m.x_axis.y;
    let r31 = m.x_axis.z;
    let r22 = m.y_axis.y;
    let r32 = m.y_axis.z;
    let r23 = m.z_axis.y;
    let r33 = m.z_axis.z;

    let y = (-r31).clamp(-1.0, 1.0).asin();
    if y.cos() > GIMBAL_EPSILON {
        let x = r32.atan2(r33);
        let z = r21.atan2(r11);
        [x, y, z]
    } else {
        // X and Z rotate about the same axis here; fold everything into X
        let x = (-r23).atan2(r22);
        [x, y, 0.0]
    }
}

/// Matrix for XYZ Euler angles (radians)
pub fn matrix_from_euler(euler: [f64; 3]) -> DMat3 {
    DMat3::from_rotation_z(euler[2])
        * DMat3::from_rotation_y(euler[1])
        * DMat3::from_rotation_x(euler[0])
}

/// Turn `current` about the global X, then Y, then Z axis by `angles`
pub fn rotate_sequential(current: &DMat3, angles: [f64; 3]) -> DMat3 {
    let mut m = *current;
    m = DMat3::from_rotation_x(angles[0]) * m;
    m = DMat3::from_rotation_y(angles[1]) * m;
    m = DMat3::from_rotation_z(angles[2]) * m;
    m
}

/// XYZ Euler angles of a unit quaternion given as `[x, y, z, w]`
pub fn euler_from_quat(q: [f64; 4]) -> [f64; 3] {
    let quat = DQuat::from_xyzw(q[0], q[1], q[2], q[3]).normalize();
    euler_from_matrix(&DMat3::from_quat(quat))
}
