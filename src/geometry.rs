use nalgebra::{Matrix3, Vector3};

pub type Vec3d = Vector3<f64>;
pub type Matrix33d = Matrix3<f64>;

pub static EPS: f64 = 0.00001;

/// Access to the axes of an orientation matrix.
///
/// For a local-to-global matrix the columns are the local axes expressed in
/// world coordinates, so `z_basis` is the direction the element faces.
pub trait Basis {
    fn x_basis(&self) -> Vec3d;
    fn y_basis(&self) -> Vec3d;
    fn z_basis(&self) -> Vec3d;
}

impl Basis for Matrix33d {
    fn x_basis(&self) -> Vec3d {
        self.column(0).into_owned()
    }

    fn y_basis(&self) -> Vec3d {
        self.column(1).into_owned()
    }

    fn z_basis(&self) -> Vec3d {
        self.column(2).into_owned()
    }
}

/// Euler triple `(alpha, beta, gamma)` for a unit `normal` and a spin of
/// `zrot` degrees about it.
///
/// `alpha = atan2(nx, nz)` turns about Y, `beta = asin(ny)` tilts towards Y and
/// `gamma` is the spin in radians. `normal` must already be normalized.
pub fn normal_to_euler(normal: &Vec3d, zrot: f64) -> Vec3d {
    let alpha = normal.x.atan2(normal.z);
    let beta = normal.y.clamp(-1.0, 1.0).asin();
    let gamma = zrot.to_radians();
    Vec3d::new(alpha, beta, gamma)
}

pub fn rotation_matrix_g2l(euler_angles: &Vec3d) -> Matrix33d {
    let (sin_a, cos_a) = euler_angles.x.sin_cos();
    let (sin_b, cos_b) = euler_angles.y.sin_cos();
    let (sin_g, cos_g) = euler_angles.z.sin_cos();
    Matrix33d::new(
        cos_a * cos_g + sin_a * sin_b * sin_g,
        -cos_b * sin_g,
        -sin_a * cos_g + cos_a * sin_b * sin_g,
        cos_a * sin_g - sin_a * sin_b * cos_g,
        cos_b * cos_g,
        -sin_a * sin_g - cos_a * sin_b * cos_g,
        sin_a * cos_b,
        sin_b,
        cos_a * cos_b,
    )
}

pub fn rotation_matrix_l2g(direction: &Vec3d, zrot: f64) -> Matrix33d {
    rotation_matrix_g2l(&normal_to_euler(direction, zrot)).transpose()
}
