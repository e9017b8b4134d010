pub mod aabb;
pub mod aperture;
pub mod device;
pub mod element;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod stinput;
pub mod surface;


pub use aabb::Aabb;
pub use aperture::{Aperture, ApertureType};
pub use device::{DeviceRecord, DeviceVec};
pub use element::Element;
pub use engine::{HitBuffer, LaunchParams, RayTracingEngine};
pub use error::{GeometryError, ParseError};
pub use geometry::{Basis, Matrix33d, Vec3d};
pub use scene::{Scene, Stage, Sun, TraceError};
pub use stinput::{parse_file_content, read_st_input};
pub use surface::{Surface, SurfaceType};
