use std::fs;
use std::path::Path;
use std::str::{FromStr, Lines};

use log::{debug, info, warn};

use crate::aperture::Aperture;
use crate::element::Element;
use crate::error::ParseError;
use crate::geometry::Vec3d;
use crate::scene::{Scene, Stage};
use crate::surface::Surface;

// SIGMA is given in milliradians
const SIGMA_TO_RADIANS: f64 = 0.001;

const ELEMENT_FIELDS: usize = 29;
const OPTICAL_SURFACE_FIELDS: usize = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl FromStr for FileVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.').map(|part| part.parse::<u32>().map_err(|_| ()));
        let version = FileVersion {
            major: parts.next().ok_or(())??,
            minor: parts.next().ok_or(())??,
            micro: parts.next().ok_or(())??,
        };
        match parts.next() {
            None => Ok(version),
            Some(_) => Err(()),
        }
    }
}

struct LineReader<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(content: &'a str) -> Self {
        LineReader {
            lines: content.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        let text = self
            .lines
            .next()
            .ok_or(ParseError::UnexpectedEof { expected })?;
        self.line += 1;
        Ok((self.line, text))
    }

    fn next_fields(&mut self, expected: &'static str) -> Result<FieldList<'a>, ParseError> {
        let (line, text) = self.next_line(expected)?;
        Ok(FieldList::whitespace(line, text))
    }
}

#[derive(Debug)]
pub struct FieldList<'a> {
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> FieldList<'a> {
    pub fn tab_delimited(
        line: usize,
        text: &'a str,
        record: &'static str,
        required: usize,
    ) -> Result<Self, ParseError> {
        let text = text.strip_suffix('\t').unwrap_or(text);
        let fields = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\t').collect::<Vec<_>>()
        };
        if fields.len() < required {
            return Err(ParseError::TooFewFields {
                line,
                record,
                found: fields.len(),
                required,
            });
        }
        Ok(FieldList { line, fields })
    }

    pub fn whitespace(line: usize, text: &'a str) -> Self {
        FieldList {
            line,
            fields: text.split_whitespace().collect(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn text(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or("").trim()
    }

    pub fn code(&self, index: usize) -> Option<char> {
        self.text(index).chars().next()
    }

    pub fn keyword(&self, index: usize, expected: &'static str) -> Result<(), ParseError> {
        let found = self.text(index);
        if found == expected {
            Ok(())
        } else {
            Err(ParseError::Keyword {
                line: self.line,
                expected,
                found: found.to_string(),
            })
        }
    }

    pub fn parse<T: FromStr>(&self, index: usize, field: &'static str) -> Result<T, ParseError> {
        let value = self.text(index);
        value.parse().map_err(|_| ParseError::InvalidValue {
            line: self.line,
            field,
            value: value.to_string(),
        })
    }

    pub fn f64(&self, index: usize, field: &'static str) -> Result<f64, ParseError> {
        self.parse(index, field)
    }

    pub fn f64_or_zero(&self, index: usize, field: &'static str) -> Result<f64, ParseError> {
        if self.text(index).is_empty() {
            Ok(0.0)
        } else {
            self.f64(index, field)
        }
    }

    pub fn flag(&self, index: usize, field: &'static str) -> Result<bool, ParseError> {
        Ok(self.parse::<i32>(index, field)? != 0)
    }

    pub fn vec3(&self, start: usize, field: &'static str) -> Result<Vec3d, ParseError> {
        Ok(Vec3d::new(
            self.f64(start, field)?,
            self.f64(start + 1, field)?,
            self.f64(start + 2, field)?,
        ))
    }

    fn expect_len(&self, record: &'static str, required: usize) -> Result<(), ParseError> {
        if self.len() < required {
            return Err(ParseError::TooFewFields {
                line: self.line,
                record,
                found: self.len(),
                required,
            });
        }
        Ok(())
    }
}

// 0 enabled, 1..=3 origin, 4..=6 aim, 7 zrot, 8 aperture code, 9..=16 aperture params,
// 17 surface code, 18..=25 surface params, 26 file, 27 optic, 28 interaction
#[derive(Clone, Debug, PartialEq)]
pub struct ElementRecord {
    pub line: usize,
    pub enabled: bool,
    pub origin: Vec3d,
    pub aim_point: Vec3d,
    pub zrot: f64,
    pub aperture_code: Option<char>,
    pub aperture_params: [f64; 8],
    pub surface_code: Option<char>,
    pub surface_params: [f64; 8],
    pub surface_file: String,
    pub optic_name: String,
    pub interaction: i32,
}

impl ElementRecord {
    pub fn parse(line: usize, text: &str) -> Result<Self, ParseError> {
        Self::from_fields(&FieldList::tab_delimited(line, text, "element", ELEMENT_FIELDS)?)
    }

    pub fn from_fields(fields: &FieldList) -> Result<Self, ParseError> {
        let mut aperture_params = [0.0; 8];
        for (i, param) in aperture_params.iter_mut().enumerate() {
            *param = fields.f64_or_zero(9 + i, "aperture parameter")?;
        }
        let mut surface_params = [0.0; 8];
        for (i, param) in surface_params.iter_mut().enumerate() {
            *param = fields.f64_or_zero(18 + i, "surface parameter")?;
        }
        let interaction = if fields.text(28).is_empty() {
            0
        } else {
            fields.parse(28, "interaction")?
        };
        Ok(ElementRecord {
            line: fields.line(),
            enabled: fields.flag(0, "enabled")?,
            origin: fields.vec3(1, "origin")?,
            aim_point: fields.vec3(4, "aim point")?,
            zrot: fields.f64(7, "zrot")?,
            aperture_code: fields.code(8),
            aperture_params,
            surface_code: fields.code(17),
            surface_params,
            surface_file: fields.text(26).to_string(),
            optic_name: fields.text(27).to_string(),
            interaction,
        })
    }

    // curvature in surface parameter 0, length in aperture parameter 2
    pub fn is_cylinder(&self) -> bool {
        self.aperture_code == Some('l') && self.surface_code == Some('t')
    }

    fn cylinder_radius(&self) -> Result<f64, ParseError> {
        let curvature = self.surface_params[0];
        if curvature == 0.0 {
            return Err(ParseError::InvalidValue {
                line: self.line,
                field: "cylinder curvature",
                value: curvature.to_string(),
            });
        }
        Ok(1.0 / curvature)
    }

    fn aperture(&self) -> Result<Aperture, ParseError> {
        if self.aperture_code == Some('r') {
            Ok(Aperture::rectangle(self.aperture_params[0], self.aperture_params[1]))
        } else if self.is_cylinder() {
            Ok(Aperture::rectangle(
                2.0 * self.cylinder_radius()?,
                self.aperture_params[2],
            ))
        } else {
            Err(ParseError::UnsupportedAperture {
                line: self.line,
                code: self.aperture_code.map(String::from).unwrap_or_default(),
            })
        }
    }

    fn surface(&self) -> Result<Surface, ParseError> {
        if self.surface_code == Some('p') {
            Ok(Surface::parabolic(self.surface_params[0], self.surface_params[1]))
        } else if self.is_cylinder() {
            Ok(Surface::cylinder(
                self.cylinder_radius()?,
                self.aperture_params[2] / 2.0,
            ))
        } else if self.surface_code == Some('f') {
            Ok(Surface::Flat)
        } else {
            Err(ParseError::UnsupportedSurface {
                line: self.line,
                code: self.surface_code.map(String::from).unwrap_or_default(),
            })
        }
    }

    // the file puts a cylinder's origin on its wall
    pub fn to_element(&self) -> Result<Element, ParseError> {
        let mut origin = self.origin;
        if self.is_cylinder() {
            origin.y += self.cylinder_radius()?;
        }
        let mut element = Element::new();
        element.set_origin(origin);
        element.set_aim_point(self.aim_point);
        element.set_zrot(self.zrot);
        element.set_aperture(self.aperture()?);
        element.set_surface(self.surface()?);
        Ok(element)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpticalSurface {
    pub error_distribution: char,
    pub aperture_stop_or_grating: i32,
    pub surface_number: i32,
    pub diffraction_order: i32,
    pub reflectivity: f64,
    pub transmissivity: f64,
    pub rms_slope: f64,
    pub rms_specularity: f64,
    pub refraction_index_real: f64,
    pub refraction_index_imag: f64,
    pub grating_coeffs: [f64; 4],
    pub reflectivity_table: Vec<(f64, f64)>,
    pub transmissivity_table: Vec<(f64, f64)>,
}

fn read_table(
    reader: &mut LineReader,
    count: usize,
    expected: &'static str,
) -> Result<Vec<(f64, f64)>, ParseError> {
    (0..count)
        .map(|_| {
            let row = reader.next_fields(expected)?;
            row.expect_len(expected, 2)?;
            Ok((row.f64(0, expected)?, row.f64(1, expected)?))
        })
        .collect()
}

fn read_optical_surface(reader: &mut LineReader) -> Result<OpticalSurface, ParseError> {
    let (line, text) = reader.next_line("optical surface")?;
    let fields = FieldList::tab_delimited(line, text, "optical surface", OPTICAL_SURFACE_FIELDS)?;

    let mut grating_coeffs = [0.0; 4];
    for (i, coeff) in grating_coeffs.iter_mut().enumerate() {
        *coeff = fields.f64(11 + i, "grating coefficient")?;
    }

    let (mut use_refl_table, mut refl_points) = (false, 0);
    let (mut use_trans_table, mut trans_points) = (false, 0);
    if fields.len() >= 17 {
        use_refl_table = fields.parse::<i32>(15, "reflectivity table flag")? > 0;
        refl_points = fields.parse::<usize>(16, "reflectivity table size")?;
        if fields.len() >= 19 {
            use_trans_table = fields.parse::<i32>(17, "transmissivity table flag")? > 0;
            trans_points = fields.parse::<usize>(18, "transmissivity table size")?;
        }
    }
    let reflectivity_table = if use_refl_table {
        read_table(reader, refl_points, "reflectivity table row")?
    } else {
        Vec::new()
    };
    let transmissivity_table = if use_trans_table {
        read_table(reader, trans_points, "transmissivity table row")?
    } else {
        Vec::new()
    };

    Ok(OpticalSurface {
        error_distribution: fields.code(1).unwrap_or('g'),
        aperture_stop_or_grating: fields.parse(2, "aperture stop or grating type")?,
        surface_number: fields.parse(3, "optical surface number")?,
        diffraction_order: fields.parse(4, "diffraction order")?,
        reflectivity: fields.f64(5, "reflectivity")?,
        transmissivity: fields.f64(6, "transmissivity")?,
        rms_slope: fields.f64(7, "rms slope")?,
        rms_specularity: fields.f64(8, "rms specularity")?,
        refraction_index_real: fields.f64(9, "refraction index")?,
        refraction_index_imag: fields.f64(10, "refraction index")?,
        grating_coeffs,
        reflectivity_table,
        transmissivity_table,
    })
}

fn read_optic(reader: &mut LineReader) -> Result<[OpticalSurface; 2], ParseError> {
    let (line, text) = reader.next_line("OPTICAL PAIR")?;
    if !text.starts_with("OPTICAL PAIR") {
        return Err(ParseError::Keyword {
            line,
            expected: "OPTICAL PAIR",
            found: text.to_string(),
        });
    }
    Ok([read_optical_surface(reader)?, read_optical_surface(reader)?])
}

fn read_sun(reader: &mut LineReader, scene: &mut Scene) -> Result<(), ParseError> {
    let fields = reader.next_fields("SUN line")?;
    fields.expect_len("SUN line", 9)?;
    fields.keyword(0, "SUN")?;
    fields.keyword(1, "PTSRC")?;
    fields.keyword(3, "SHAPE")?;
    fields.keyword(5, "SIGMA")?;
    fields.keyword(7, "HALFWIDTH")?;
    scene.sun.point_source = fields.flag(2, "PTSRC")?;
    scene.sun.shape = fields.code(4).unwrap_or('g').to_ascii_lowercase();
    let sigma = fields.f64(6, "SIGMA")?;
    let half_width = fields.f64(8, "HALFWIDTH")?;
    // only the gaussian sigma drives the sun width for now
    scene.set_sun_angle(sigma * SIGMA_TO_RADIANS);
    debug!(
        "sun shape '{}' sigma {} half width {}",
        scene.sun.shape, sigma, half_width
    );

    let fields = reader.next_fields("XYZ line")?;
    fields.expect_len("XYZ line", 10)?;
    fields.keyword(0, "XYZ")?;
    fields.keyword(4, "USELDH")?;
    fields.keyword(6, "LDH")?;
    let use_ldh = fields.flag(5, "USELDH")?;
    let latitude = fields.f64(7, "latitude")?;
    let day = fields.f64(8, "day")?;
    let hour = fields.f64(9, "hour")?;
    if use_ldh {
        warn!(
            "sun position from latitude {} day {} hour {} is not supported, using XYZ",
            latitude, day, hour
        );
    }
    scene.set_sun_vector(fields.vec3(1, "sun vector")?);

    let fields = reader.next_fields("USER SHAPE DATA")?;
    fields.expect_len("USER SHAPE DATA", 4)?;
    fields.keyword(0, "USER")?;
    fields.keyword(1, "SHAPE")?;
    fields.keyword(2, "DATA")?;
    let count = fields.parse::<usize>(3, "user shape data count")?;
    let user_shape = read_table(reader, count, "user shape data row")?;
    if !user_shape.is_empty() {
        debug!("ignoring {} rows of user sun shape data", user_shape.len());
    }
    Ok(())
}

fn read_list_count(reader: &mut LineReader, list: &'static str) -> Result<usize, ParseError> {
    let fields = reader.next_fields(list)?;
    fields.expect_len(list, 4)?;
    let mut words = list.split(' ');
    for index in 0..3 {
        fields.keyword(index, words.next().unwrap_or_default())?;
    }
    fields.parse(3, list)
}

fn read_stage(
    reader: &mut LineReader,
    scene: &mut Scene,
    stage_index: usize,
) -> Result<(), ParseError> {
    let fields = reader.next_fields("STAGE line")?;
    fields.expect_len("STAGE line", 19)?;
    for (index, keyword) in [
        (0, "STAGE"),
        (1, "XYZ"),
        (5, "AIM"),
        (9, "ZROT"),
        (11, "VIRTUAL"),
        (13, "MULTIHIT"),
        (15, "ELEMENTS"),
        (17, "TRACETHROUGH"),
    ] {
        fields.keyword(index, keyword)?;
    }
    let (_, name) = reader.next_line("stage name")?;
    let stage = Stage {
        name: name.trim().to_string(),
        origin: fields.vec3(2, "stage origin")?,
        aim_point: fields.vec3(6, "stage aim point")?,
        zrot: fields.f64(10, "stage zrot")?,
        is_virtual: fields.flag(12, "VIRTUAL")?,
        multi_hit: fields.flag(14, "MULTIHIT")?,
        trace_through: fields.flag(18, "TRACETHROUGH")?,
        element_count: fields.parse(16, "ELEMENTS")?,
    };
    if !stage.has_identity_transform() {
        warn!(
            "stage '{}' transform is ignored, element poses are taken as absolute",
            stage.name
        );
    }
    debug!("stage '{}' with {} elements", stage.name, stage.element_count);

    for index in 0..stage.element_count {
        read_element(reader, scene).map_err(|source| ParseError::Element {
            stage: stage_index,
            index,
            source: Box::new(source),
        })?;
    }
    scene.add_stage(stage);
    Ok(())
}

fn read_element(reader: &mut LineReader, scene: &mut Scene) -> Result<(), ParseError> {
    let (line, text) = reader.next_line("element record")?;
    let fields = FieldList::tab_delimited(line, text, "element", ELEMENT_FIELDS)?;
    // caps are covered by their cylinder, skipped before any numeric field is read
    if fields.code(8) == Some('c') && fields.code(17) == Some('f') {
        debug!("line {}: skipping cylinder end cap", line);
        return Ok(());
    }
    let record = ElementRecord::from_fields(&fields)?;
    let element = record.to_element()?;
    scene.add_element(element)?;
    Ok(())
}

pub fn parse_file_content(content: &str) -> Result<Scene, ParseError> {
    let mut reader = LineReader::new(content);
    let (_, first) = reader.next_line("'#' header")?;
    let Some(banner) = first.strip_prefix('#') else {
        return Err(ParseError::MissingHeader);
    };
    let banner = if banner.trim().is_empty() {
        reader.next_line("version banner")?.1
    } else {
        banner
    };
    let version = FieldList::whitespace(0, banner)
        .text(2)
        .parse::<FileVersion>()
        .unwrap_or_default();
    info!(
        "loading input file version {}.{}.{}",
        version.major, version.minor, version.micro
    );

    let mut scene = Scene::new();
    read_sun(&mut reader, &mut scene)?;

    let optics = read_list_count(&mut reader, "OPTICS LIST COUNT")?;
    for _ in 0..optics {
        let [front, back] = read_optic(&mut reader)?;
        // TODO: hand front/back to a material model once reflectivity and
        // transmissivity are evaluated during tracing.
        debug!(
            "optic surfaces {} / {} (reflectivity {} / {})",
            front.surface_number, back.surface_number, front.reflectivity, back.reflectivity
        );
    }

    let stages = read_list_count(&mut reader, "STAGE LIST COUNT")?;
    let mut last_stage_start = 0;
    for stage_index in 0..stages {
        last_stage_start = scene.len();
        read_stage(&mut reader, &mut scene, stage_index)?;
    }
    // the final stage holds the receivers
    for index in last_stage_start..scene.len() {
        if let Some(element) = scene.element_mut(index) {
            element.set_receiver(true);
        }
    }
    info!(
        "read {} elements in {} stages",
        scene.len(),
        scene.stages().len()
    );
    Ok(scene)
}

pub fn read_st_input(path: impl AsRef<Path>) -> Result<Scene, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file_content(&content)
}
