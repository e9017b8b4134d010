use std::path::PathBuf;

use thiserror::Error;

use crate::aperture::ApertureType;
use crate::geometry::Vec3d;
use crate::surface::SurfaceType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("element has no aperture")]
    MissingAperture,

    #[error("element has no surface")]
    MissingSurface,

    #[error("aim point {aim_point:?} coincides with origin {origin:?}")]
    DegenerateAim { origin: Vec3d, aim_point: Vec3d },

    #[error("sun vector must not be zero")]
    DegenerateSunVector,

    #[error("no device record for a {aperture} aperture on a {surface} surface")]
    UnsupportedCombination {
        aperture: ApertureType,
        surface: SurfaceType,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input file must start with '#'")]
    MissingHeader,

    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("line {line}: expected `{expected}`, found `{found}`")]
    Keyword {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: too few tokens for {record}: {found} (need {required})")]
    TooFewFields {
        line: usize,
        record: &'static str,
        found: usize,
        required: usize,
    },

    #[error("line {line}: invalid value `{value}` for {field}")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: aperture type not implemented: `{code}`")]
    UnsupportedAperture { line: usize, code: String },

    #[error("line {line}: surface type not implemented: `{code}`")]
    UnsupportedSurface { line: usize, code: String },

    #[error("error in element {index} of stage {stage}: {source}")]
    Element {
        stage: usize,
        index: usize,
        #[source]
        source: Box<ParseError>,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
