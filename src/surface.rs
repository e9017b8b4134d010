use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceType {
    Flat,
    Parabolic,
    Cylinder,
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceType::Flat => "flat",
            SurfaceType::Parabolic => "parabolic",
            SurfaceType::Cylinder => "cylinder",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    Flat,
    Parabolic { curvature_x: f64, curvature_y: f64 },
    // axis along local Y
    Cylinder { radius: f64, half_height: f64 },
}

impl Surface {
    pub fn parabolic(curvature_x: f64, curvature_y: f64) -> Self {
        Surface::Parabolic {
            curvature_x,
            curvature_y,
        }
    }

    pub fn cylinder(radius: f64, half_height: f64) -> Self {
        Surface::Cylinder {
            radius,
            half_height,
        }
    }

    pub fn kind(&self) -> SurfaceType {
        match self {
            Surface::Flat => SurfaceType::Flat,
            Surface::Parabolic { .. } => SurfaceType::Parabolic,
            Surface::Cylinder { .. } => SurfaceType::Cylinder,
        }
    }

    pub fn curvatures(&self) -> (f64, f64) {
        match self {
            Surface::Parabolic {
                curvature_x,
                curvature_y,
            } => (*curvature_x, *curvature_y),
            _ => (0.0, 0.0),
        }
    }
}
