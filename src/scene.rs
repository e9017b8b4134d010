use log::{debug, info};

use crate::aabb::Aabb;
use crate::device::DeviceRecord;
use crate::element::Element;
use crate::engine::{
    HitBuffer, LaunchParams, RayTracingEngine, DEFAULT_MAX_TRACE_DEPTH, DEFAULT_SUN_DIR_SEED,
};
use crate::error::GeometryError;
use crate::geometry::{Vec3d, EPS};

#[derive(Clone, Debug, PartialEq)]
pub struct Sun {
    pub vector: Vec3d,
    pub angle: f64,
    pub shape: char,
    pub point_source: bool,
}

impl Default for Sun {
    fn default() -> Self {
        Sun {
            vector: Vec3d::z(),
            angle: 0.0,
            shape: 'g',
            point_source: false,
        }
    }
}

// transform is recorded only, element poses stay absolute
#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub name: String,
    pub origin: Vec3d,
    pub aim_point: Vec3d,
    pub zrot: f64,
    pub is_virtual: bool,
    pub multi_hit: bool,
    pub trace_through: bool,
    pub element_count: usize,
}

impl Stage {
    pub fn has_identity_transform(&self) -> bool {
        self.origin == Vec3d::zeros() && self.aim_point == Vec3d::z() && self.zrot == 0.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub sun: Sun,
    stages: Vec<Stage>,
    elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sun_vector(&mut self, vector: Vec3d) {
        self.sun.vector = vector;
    }

    pub fn set_sun_angle(&mut self, angle: f64) {
        self.sun.angle = angle;
    }

    pub fn add_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn add_element(&mut self, mut element: Element) -> Result<(), GeometryError> {
        element.update_euler_angles()?;
        self.elements.push(element);
        Ok(())
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn receivers(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter().filter(|element| element.is_receiver())
    }

    pub fn compute_bounding_boxes(&mut self) -> Result<Aabb, GeometryError> {
        let mut scene_box = Aabb::default();
        for element in &mut self.elements {
            scene_box = scene_box.extend_aabb(element.compute_bounding_box()?);
        }
        debug!("scene bounds {:?} .. {:?}", scene_box.min, scene_box.max);
        Ok(scene_box)
    }

    pub fn update(&mut self) -> Result<Aabb, GeometryError> {
        for element in &mut self.elements {
            element.update_euler_angles()?;
        }
        self.compute_bounding_boxes()
    }

    pub fn device_records(&self) -> Result<Vec<DeviceRecord>, GeometryError> {
        self.elements
            .iter()
            .map(|element| element.to_device_record())
            .collect()
    }

    pub fn launch_params(&self, num_sun_points: u32) -> Result<LaunchParams, GeometryError> {
        let sun_vector = self
            .sun
            .vector
            .try_normalize(EPS * EPS)
            .ok_or(GeometryError::DegenerateSunVector)?;
        Ok(LaunchParams {
            sun_vector: sun_vector.cast::<f32>(),
            max_sun_angle: self.sun.angle as f32,
            num_sun_points,
            max_depth: DEFAULT_MAX_TRACE_DEPTH,
            element_count: self.elements.len(),
            sun_dir_seed: DEFAULT_SUN_DIR_SEED,
        })
    }

    /// The engine is torn down on every path after a successful `init`.
    pub fn trace<E: RayTracingEngine>(
        &mut self,
        engine: &mut E,
        num_sun_points: u32,
    ) -> Result<HitBuffer, TraceError<E::Error>> {
        self.compute_bounding_boxes()?;
        let records = self.device_records()?;
        let params = self.launch_params(num_sun_points)?;
        info!(
            "tracing {} sun rays against {} elements",
            params.num_sun_points, params.element_count
        );
        engine.init().map_err(TraceError::Engine)?;
        let result = engine.submit(&records, &params);
        engine.teardown();
        let hits = result.map_err(TraceError::Engine)?;
        info!("{} rays hit a receiver", hits.receiver_hits());
        Ok(hits)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("ray-tracing engine failed: {0}")]
    Engine(#[source] E),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aperture::Aperture;
    use crate::surface::Surface;
    use approx::assert_relative_eq;

    fn heliostat(origin: Vec3d, aim_point: Vec3d, zrot: f64) -> Element {
        let mut element = Element::new();
        element.set_origin(origin);
        element.set_aim_point(aim_point);
        element.set_zrot(zrot);
        element.set_aperture(Aperture::rectangle(1.0, 1.95));
        element.set_surface(Surface::Flat);
        element
    }

    #[test]
    fn add_element_derives_orientation() {
        let mut scene = Scene::new();
        scene
            .add_element(heliostat(Vec3d::new(0.0, 5.0, 0.0), Vec3d::new(0.0, 5.0, -3.0), 0.0))
            .unwrap();
        assert_eq!(scene.len(), 1);
        assert_relative_eq!(
            scene.elements()[0].rotation_matrix() * Vec3d::z(),
            -Vec3d::z(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn add_element_rejects_degenerate_aim() {
        let mut scene = Scene::new();
        let origin = Vec3d::new(1.0, 1.0, 1.0);
        assert!(scene.add_element(heliostat(origin, origin, 0.0)).is_err());
        assert!(scene.is_empty());
    }

    #[test]
    fn launch_params_normalize_sun() {
        let mut scene = Scene::new();
        scene.set_sun_vector(Vec3d::new(0.0, 0.0, 100.0));
        scene.set_sun_angle(0.00465);
        let params = scene.launch_params(1000).unwrap();
        assert_eq!(params.sun_vector, crate::device::DeviceVec::z());
        assert_eq!(params.max_sun_angle, 0.00465);
        assert_eq!(params.max_depth, DEFAULT_MAX_TRACE_DEPTH);
        assert_eq!(params.element_count, 0);

        scene.set_sun_vector(Vec3d::zeros());
        assert_eq!(
            scene.launch_params(1000).unwrap_err(),
            GeometryError::DegenerateSunVector
        );
    }

    #[test]
    fn update_follows_moved_elements() {
        let mut scene = Scene::new();
        scene
            .add_element(heliostat(Vec3d::zeros(), Vec3d::z(), 0.0))
            .unwrap();
        let before = scene.compute_bounding_boxes().unwrap();
        assert_relative_eq!(before.max, Vec3d::new(0.5, 0.975, 0.0), epsilon = 1e-12);

        let element = scene.element_mut(0).unwrap();
        element.set_origin(Vec3d::new(10.0, 0.0, 0.0));
        element.set_aim_point(Vec3d::new(10.0, 0.0, 1.0));
        let after = scene.update().unwrap();
        assert_relative_eq!(after.min, Vec3d::new(9.5, -0.975, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn stage_identity_transform() {
        let mut stage = Stage {
            name: "heliostats".to_string(),
            origin: Vec3d::zeros(),
            aim_point: Vec3d::z(),
            zrot: 0.0,
            is_virtual: false,
            multi_hit: true,
            trace_through: false,
            element_count: 1,
        };
        assert!(stage.has_identity_transform());
        stage.zrot = 15.0;
        assert!(!stage.has_identity_transform());
    }
}
