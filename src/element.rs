use arrayvec::ArrayVec;

use crate::aabb::Aabb;
use crate::aperture::Aperture;
use crate::error::GeometryError;
use crate::geometry::{normal_to_euler, rotation_matrix_g2l, Matrix33d, Vec3d, EPS};
use crate::surface::{Surface, SurfaceType};

/// Euler angles and bounds are derived state: after moving or re-aiming, call
/// [`Element::update_euler_angles`] then [`Element::compute_bounding_box`].
#[derive(Clone, Debug)]
pub struct Element {
    origin: Vec3d,
    aim_point: Vec3d,
    zrot: f64,
    euler_angles: Vec3d,
    aperture: Option<Aperture>,
    surface: Option<Surface>,
    bounds: Aabb,
    receiver: bool,
}

impl Default for Element {
    fn default() -> Self {
        Element {
            origin: Vec3d::zeros(),
            aim_point: Vec3d::z(),
            zrot: 0.0,
            euler_angles: Vec3d::zeros(),
            aperture: None,
            surface: None,
            bounds: Aabb::default(),
            receiver: false,
        }
    }
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> &Vec3d {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3d) {
        self.origin = origin;
    }

    pub fn aim_point(&self) -> &Vec3d {
        &self.aim_point
    }

    pub fn set_aim_point(&mut self, aim_point: Vec3d) {
        self.aim_point = aim_point;
    }

    // degrees
    pub fn zrot(&self) -> f64 {
        self.zrot
    }

    pub fn set_zrot(&mut self, zrot: f64) {
        self.zrot = zrot;
    }

    pub fn euler_angles(&self) -> &Vec3d {
        &self.euler_angles
    }

    pub fn aperture(&self) -> Option<&Aperture> {
        self.aperture.as_ref()
    }

    pub fn set_aperture(&mut self, aperture: Aperture) {
        self.aperture = Some(aperture);
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = Some(surface);
    }

    pub fn is_receiver(&self) -> bool {
        self.receiver
    }

    pub fn set_receiver(&mut self, receiver: bool) {
        self.receiver = receiver;
    }

    pub fn clone_with_aperture(&self, aperture: Aperture) -> Element {
        Element {
            aperture: Some(aperture),
            bounds: Aabb::default(),
            ..self.clone()
        }
    }

    pub fn shapes(&self) -> Result<(&Aperture, &Surface), GeometryError> {
        let aperture = self.aperture.as_ref().ok_or(GeometryError::MissingAperture)?;
        let surface = self.surface.as_ref().ok_or(GeometryError::MissingSurface)?;
        Ok((aperture, surface))
    }

    pub fn direction(&self) -> Result<Vec3d, GeometryError> {
        (self.aim_point - self.origin)
            .try_normalize(EPS * EPS)
            .ok_or(GeometryError::DegenerateAim {
                origin: self.origin,
                aim_point: self.aim_point,
            })
    }

    pub fn update_euler_angles(&mut self) -> Result<(), GeometryError> {
        let direction = self.direction()?;
        self.euler_angles = normal_to_euler(&direction, self.zrot);
        Ok(())
    }

    pub fn update_element(&mut self, aim_point: Vec3d, zrot: f64) -> Result<(), GeometryError> {
        self.aim_point = aim_point;
        self.zrot = zrot;
        self.update_euler_angles()
    }

    pub fn rotation_matrix(&self) -> Matrix33d {
        rotation_matrix_g2l(&self.euler_angles).transpose()
    }

    pub fn to_global(&self, local: &Vec3d) -> Vec3d {
        self.rotation_matrix() * local + self.origin
    }

    pub fn bounding_box(&self) -> &Aabb {
        &self.bounds
    }

    pub fn lower_bound(&self) -> &Vec3d {
        &self.bounds.min
    }

    pub fn upper_bound(&self) -> &Vec3d {
        &self.bounds.max
    }

    pub fn compute_bounding_box(&mut self) -> Result<&Aabb, GeometryError> {
        let corners = self.local_outline()?;
        let rotation = self.rotation_matrix();
        let global = corners
            .iter()
            .map(|corner| rotation * corner + self.origin)
            .collect::<ArrayVec<Vec3d, 8>>();
        self.bounds = Aabb::from_points(&global);
        Ok(&self.bounds)
    }

    // Local points whose transformed hull encloses the element.
    fn local_outline(&self) -> Result<ArrayVec<Vec3d, 8>, GeometryError> {
        let (aperture, surface) = self.shapes()?;
        let mut corners = ArrayVec::new();
        if surface.kind() == SurfaceType::Cylinder {
            // width is the diameter, height the full length along local Y
            let half_w = aperture.width() / 2.0;
            let half_h = aperture.height() / 2.0;
            for z in [-half_w, half_w] {
                for y in [-half_h, half_h] {
                    for x in [-half_w, half_w] {
                        corners.push(Vec3d::new(x, y, z));
                    }
                }
            }
            return Ok(corners);
        }
        match aperture {
            Aperture::Rectangle { width, height } => {
                let (half_w, half_h) = (width / 2.0, height / 2.0);
                corners.push(Vec3d::new(-half_w, -half_h, 0.0));
                corners.push(Vec3d::new(half_w, -half_h, 0.0));
                corners.push(Vec3d::new(half_w, half_h, 0.0));
                corners.push(Vec3d::new(-half_w, half_h, 0.0));
            }
            Aperture::Circle { radius } => {
                corners.push(Vec3d::new(-radius, -radius, 0.0));
                corners.push(Vec3d::new(*radius, -radius, 0.0));
                corners.push(Vec3d::new(*radius, *radius, 0.0));
                corners.push(Vec3d::new(-radius, *radius, 0.0));
            }
            Aperture::Triangle { v0, v1, v2 } => {
                corners.push(*v0);
                corners.push(*v1);
                corners.push(*v2);
            }
        }
        Ok(corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn facing_up(aperture: Aperture, surface: Surface) -> Element {
        let mut element = Element::new();
        element.set_aperture(aperture);
        element.set_surface(surface);
        element.update_euler_angles().unwrap();
        element
    }

    #[test]
    fn rectangle_bbox_identity() {
        let mut element = facing_up(Aperture::rectangle(2.0, 1.0), Surface::Flat);
        element.compute_bounding_box().unwrap();
        assert_relative_eq!(*element.lower_bound(), Vec3d::new(-1.0, -0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(*element.upper_bound(), Vec3d::new(1.0, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn triangle_bbox_identity() {
        let aperture = Aperture::triangle(Vec3d::zeros(), Vec3d::x(), Vec3d::y());
        let mut element = facing_up(aperture, Surface::Flat);
        element.compute_bounding_box().unwrap();
        assert_relative_eq!(*element.lower_bound(), Vec3d::zeros(), epsilon = 1e-12);
        assert_relative_eq!(*element.upper_bound(), Vec3d::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn cylinder_bbox_is_diameter_cube() {
        let mut element = facing_up(Aperture::rectangle(0.5, 2.0), Surface::cylinder(0.25, 1.0));
        element.set_origin(Vec3d::new(0.0, 0.0, 10.0));
        element.set_aim_point(Vec3d::new(0.0, 0.0, 11.0));
        element.update_euler_angles().unwrap();
        element.compute_bounding_box().unwrap();
        assert_relative_eq!(*element.lower_bound(), Vec3d::new(-0.25, -1.0, 9.75), epsilon = 1e-12);
        assert_relative_eq!(*element.upper_bound(), Vec3d::new(0.25, 1.0, 10.25), epsilon = 1e-12);
    }

    #[test]
    fn tilted_rectangle_bbox() {
        // facing +X: local X maps to -Z, local Y stays Y
        let mut element = facing_up(Aperture::rectangle(2.0, 1.0), Surface::Flat);
        element.set_origin(Vec3d::new(1.0, 2.0, 3.0));
        element.set_aim_point(Vec3d::new(5.0, 2.0, 3.0));
        element.update_euler_angles().unwrap();
        element.compute_bounding_box().unwrap();
        assert_relative_eq!(*element.lower_bound(), Vec3d::new(1.0, 1.5, 2.0), epsilon = 1e-12);
        assert_relative_eq!(*element.upper_bound(), Vec3d::new(1.0, 2.5, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn circle_bbox_encloses_disk() {
        let mut element = facing_up(Aperture::circle(0.5), Surface::Flat);
        element.compute_bounding_box().unwrap();
        assert_relative_eq!(*element.lower_bound(), Vec3d::new(-0.5, -0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(*element.upper_bound(), Vec3d::new(0.5, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn derived_state_is_stale_until_updated() {
        let mut element = facing_up(Aperture::rectangle(1.0, 1.0), Surface::Flat);
        element.set_aim_point(Vec3d::new(1.0, 0.0, 0.0));
        assert_relative_eq!(element.rotation_matrix(), Matrix33d::identity(), epsilon = 1e-12);
        element.update_euler_angles().unwrap();
        assert_relative_eq!(element.rotation_matrix() * Vec3d::z(), Vec3d::x(), epsilon = 1e-12);
    }

    #[test]
    fn update_element_reaims() {
        let mut element = facing_up(Aperture::rectangle(1.0, 1.0), Surface::Flat);
        element.update_element(Vec3d::new(0.0, 3.0, 0.0), 45.0).unwrap();
        assert_eq!(element.zrot(), 45.0);
        assert_relative_eq!(element.rotation_matrix() * Vec3d::z(), Vec3d::y(), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_aim_is_rejected() {
        let mut element = Element::new();
        element.set_aim_point(Vec3d::zeros());
        assert!(matches!(
            element.update_euler_angles(),
            Err(GeometryError::DegenerateAim { .. })
        ));
    }

    #[test]
    fn incomplete_element_has_no_bbox() {
        let mut element = Element::new();
        assert_eq!(element.compute_bounding_box().unwrap_err(), GeometryError::MissingAperture);
        element.set_aperture(Aperture::rectangle(1.0, 1.0));
        assert_eq!(element.compute_bounding_box().unwrap_err(), GeometryError::MissingSurface);
    }

    #[test]
    fn clone_with_aperture_keeps_pose() {
        let mut element = facing_up(Aperture::rectangle(1.0, 1.0), Surface::Flat);
        element.set_origin(Vec3d::new(0.0, 0.0, 9.5));
        element.set_receiver(true);
        let facet = element.clone_with_aperture(Aperture::triangle(
            Vec3d::zeros(),
            Vec3d::x(),
            Vec3d::y(),
        ));
        assert_eq!(facet.origin(), element.origin());
        assert_eq!(facet.euler_angles(), element.euler_angles());
        assert!(facet.is_receiver());
        assert_eq!(element.aperture(), Some(&Aperture::rectangle(1.0, 1.0)));
        assert!(facet.aperture().unwrap().vertices().is_some());
    }
}
