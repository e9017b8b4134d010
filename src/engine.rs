use crate::device::{DeviceRecord, DeviceVec};

pub const DEFAULT_MAX_TRACE_DEPTH: u32 = 5;
pub const DEFAULT_SUN_DIR_SEED: u64 = 123456;

pub const RECEIVER_HIT_MARKER: f32 = 2.0;
const RECEIVER_HIT_TOLERANCE: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct LaunchParams {
    pub sun_vector: DeviceVec,
    // radians
    pub max_sun_angle: f32,
    pub num_sun_points: u32,
    pub max_depth: u32,
    pub element_count: usize,
    pub sun_dir_seed: u64,
}

pub trait RayTracingEngine {
    type Error: std::error::Error + 'static;

    fn init(&mut self) -> Result<(), Self::Error>;

    fn submit(
        &mut self,
        records: &[DeviceRecord],
        params: &LaunchParams,
    ) -> Result<HitBuffer, Self::Error>;

    fn teardown(&mut self);
}

// max_depth slots of [marker, x, y, z] per ray, an all-zero slot ends the path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitBuffer {
    records: Vec<[f32; 4]>,
    max_depth: usize,
}

impl HitBuffer {
    pub fn new(records: Vec<[f32; 4]>, max_depth: usize) -> Self {
        HitBuffer { records, max_depth }
    }

    pub fn records(&self) -> &[[f32; 4]] {
        &self.records
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn num_rays(&self) -> usize {
        if self.max_depth == 0 {
            0
        } else {
            self.records.len() / self.max_depth
        }
    }

    pub fn receiver_hits(&self) -> usize {
        self.records
            .iter()
            .filter(|record| (record[0] - RECEIVER_HIT_MARKER).abs() < RECEIVER_HIT_TOLERANCE)
            .count()
    }

    // one path per whole ray, matching num_rays; a trailing partial ray is dropped
    pub fn paths(&self) -> impl Iterator<Item = &[[f32; 4]]> + '_ {
        let rays = self.num_rays();
        self.records.chunks_exact(self.max_depth.max(1)).take(rays).map(|slots| {
            let end = slots
                .iter()
                .position(|record| record.iter().all(|c| *c == 0.0))
                .unwrap_or(slots.len());
            &slots[..end]
        })
    }
}
