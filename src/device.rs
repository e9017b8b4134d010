use nalgebra::Vector3;

use crate::aperture::Aperture;
use crate::element::Element;
use crate::error::GeometryError;
use crate::geometry::{Basis, Vec3d};
use crate::surface::Surface;

pub type DeviceVec = Vector3<f32>;

fn to_device(v: &Vec3d) -> DeviceVec {
    v.cast::<f32>()
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeviceRecord {
    RectangleFlat {
        origin: DeviceVec,
        x_basis: DeviceVec,
        y_basis: DeviceVec,
        width: f32,
        height: f32,
    },
    // v1 runs along the negated local X axis
    RectangleParabolic {
        v1: DeviceVec,
        v2: DeviceVec,
        anchor: DeviceVec,
        curvature_x: f32,
        curvature_y: f32,
    },
    CylinderY {
        center: DeviceVec,
        radius: f32,
        half_height: f32,
        base_x: DeviceVec,
        base_z: DeviceVec,
    },
    TriangleFlat {
        v0: DeviceVec,
        v1: DeviceVec,
        v2: DeviceVec,
    },
}

impl DeviceRecord {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceRecord::RectangleFlat { .. } => "Rectangle_Flat",
            DeviceRecord::RectangleParabolic { .. } => "Rectangle_Parabolic",
            DeviceRecord::CylinderY { .. } => "Cylinder_Y",
            DeviceRecord::TriangleFlat { .. } => "Triangle_Flat",
        }
    }
}

impl Element {
    pub fn to_device_record(&self) -> Result<DeviceRecord, GeometryError> {
        let (aperture, surface) = self.shapes()?;
        let rotation = self.rotation_matrix();
        let record = match (aperture, surface) {
            (Aperture::Rectangle { width, height }, Surface::Flat) => DeviceRecord::RectangleFlat {
                origin: to_device(self.origin()),
                x_basis: to_device(&rotation.x_basis()),
                y_basis: to_device(&rotation.y_basis()),
                width: *width as f32,
                height: *height as f32,
            },
            (
                Aperture::Rectangle { width, height },
                Surface::Parabolic {
                    curvature_x,
                    curvature_y,
                },
            ) => {
                let v1 = rotation.x_basis() * -width;
                let v2 = rotation.y_basis() * *height;
                let anchor = self.origin() - v1 * 0.5 - v2 * 0.5;
                DeviceRecord::RectangleParabolic {
                    v1: to_device(&v1),
                    v2: to_device(&v2),
                    anchor: to_device(&anchor),
                    curvature_x: *curvature_x as f32,
                    curvature_y: *curvature_y as f32,
                }
            }
            (Aperture::Rectangle { width, height }, Surface::Cylinder { .. }) => {
                DeviceRecord::CylinderY {
                    center: to_device(self.origin()),
                    radius: (*width / 2.0) as f32,
                    half_height: (*height / 2.0) as f32,
                    base_x: to_device(&rotation.x_basis()),
                    base_z: to_device(&rotation.z_basis()),
                }
            }
            (Aperture::Triangle { v0, v1, v2 }, Surface::Flat) => DeviceRecord::TriangleFlat {
                v0: to_device(&self.to_global(v0)),
                v1: to_device(&self.to_global(v1)),
                v2: to_device(&self.to_global(v2)),
            },
            _ => {
                return Err(GeometryError::UnsupportedCombination {
                    aperture: aperture.kind(),
                    surface: surface.kind(),
                })
            }
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aperture::ApertureType;
    use crate::surface::SurfaceType;
    use approx::assert_relative_eq;

    fn element(aperture: Aperture, surface: Surface, origin: Vec3d, aim_point: Vec3d) -> Element {
        let mut element = Element::new();
        element.set_origin(origin);
        element.set_aim_point(aim_point);
        element.set_aperture(aperture);
        element.set_surface(surface);
        element.update_euler_angles().unwrap();
        element
    }

    #[test]
    fn cylinder_record() {
        let origin = Vec3d::new(0.0, 0.0, 9.5);
        let e = element(
            Aperture::rectangle(0.5, 2.0),
            Surface::cylinder(0.25, 1.0),
            origin,
            origin + Vec3d::z(),
        );
        match e.to_device_record().unwrap() {
            DeviceRecord::CylinderY {
                center,
                radius,
                half_height,
                base_x,
                base_z,
            } => {
                assert_eq!(radius, 0.25);
                assert_eq!(half_height, 1.0);
                assert_eq!(center, DeviceVec::new(0.0, 0.0, 9.5));
                assert_relative_eq!(base_x, DeviceVec::x(), epsilon = 1e-6);
                assert_relative_eq!(base_z, DeviceVec::z(), epsilon = 1e-6);
            }
            other => panic!("unexpected record {}", other.name()),
        }
    }

    #[test]
    fn flat_rectangle_record() {
        let e = element(
            Aperture::rectangle(1.0, 1.95),
            Surface::Flat,
            Vec3d::new(0.0, 5.0, 0.0),
            Vec3d::new(0.0, 5.0, 1.0),
        );
        let record = e.to_device_record().unwrap();
        assert_eq!(
            record,
            DeviceRecord::RectangleFlat {
                origin: DeviceVec::new(0.0, 5.0, 0.0),
                x_basis: DeviceVec::x(),
                y_basis: DeviceVec::y(),
                width: 1.0,
                height: 1.95,
            }
        );
    }

    #[test]
    fn parabolic_record_anchor() {
        let e = element(
            Aperture::rectangle(2.0, 4.0),
            Surface::parabolic(0.017, 0.037),
            Vec3d::new(1.0, 1.0, 0.0),
            Vec3d::new(1.0, 1.0, 1.0),
        );
        match e.to_device_record().unwrap() {
            DeviceRecord::RectangleParabolic {
                v1,
                v2,
                anchor,
                curvature_x,
                curvature_y,
            } => {
                assert_relative_eq!(v1, DeviceVec::new(-2.0, 0.0, 0.0), epsilon = 1e-6);
                assert_relative_eq!(v2, DeviceVec::new(0.0, 4.0, 0.0), epsilon = 1e-6);
                assert_relative_eq!(anchor, DeviceVec::new(2.0, -1.0, 0.0), epsilon = 1e-6);
                assert_eq!(curvature_x, 0.017);
                assert_eq!(curvature_y, 0.037);
            }
            other => panic!("unexpected record {}", other.name()),
        }
    }

    #[test]
    fn triangle_record_in_world() {
        let e = element(
            Aperture::triangle(Vec3d::zeros(), Vec3d::x(), Vec3d::y()),
            Surface::Flat,
            Vec3d::new(0.0, 0.0, 10.0),
            Vec3d::new(0.0, 0.0, 11.0),
        );
        let record = e.to_device_record().unwrap();
        assert_eq!(
            record,
            DeviceRecord::TriangleFlat {
                v0: DeviceVec::new(0.0, 0.0, 10.0),
                v1: DeviceVec::new(1.0, 0.0, 10.0),
                v2: DeviceVec::new(0.0, 1.0, 10.0),
            }
        );
    }

    #[test]
    fn unsupported_pairs_are_rejected() {
        let e = element(
            Aperture::circle(1.0),
            Surface::Flat,
            Vec3d::zeros(),
            Vec3d::z(),
        );
        assert_eq!(
            e.to_device_record().unwrap_err(),
            GeometryError::UnsupportedCombination {
                aperture: ApertureType::Circle,
                surface: SurfaceType::Flat,
            }
        );
        let e = element(
            Aperture::triangle(Vec3d::zeros(), Vec3d::x(), Vec3d::y()),
            Surface::parabolic(0.1, 0.1),
            Vec3d::zeros(),
            Vec3d::z(),
        );
        assert!(e.to_device_record().is_err());
    }
}
