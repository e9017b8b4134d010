use std::fmt;

use crate::geometry::Vec3d;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApertureType {
    Circle,
    Rectangle,
    Triangle,
}

impl fmt::Display for ApertureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApertureType::Circle => "circle",
            ApertureType::Rectangle => "rectangle",
            ApertureType::Triangle => "triangle",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Aperture {
    Circle {
        radius: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
    },
    // winding gives the front face
    Triangle {
        v0: Vec3d,
        v1: Vec3d,
        v2: Vec3d,
    },
}

impl Aperture {
    pub fn circle(radius: f64) -> Self {
        Aperture::Circle { radius }
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        Aperture::Rectangle { width, height }
    }

    pub fn triangle(v0: Vec3d, v1: Vec3d, v2: Vec3d) -> Self {
        Aperture::Triangle { v0, v1, v2 }
    }

    pub fn kind(&self) -> ApertureType {
        match self {
            Aperture::Circle { .. } => ApertureType::Circle,
            Aperture::Rectangle { .. } => ApertureType::Rectangle,
            Aperture::Triangle { .. } => ApertureType::Triangle,
        }
    }

    pub fn width(&self) -> f64 {
        match self {
            Aperture::Circle { radius } => 2.0 * radius,
            Aperture::Rectangle { width, .. } => *width,
            Aperture::Triangle { .. } => 0.0,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            Aperture::Circle { radius } => 2.0 * radius,
            Aperture::Rectangle { height, .. } => *height,
            Aperture::Triangle { .. } => 0.0,
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            Aperture::Circle { radius } => *radius,
            _ => 0.0,
        }
    }

    pub fn vertices(&self) -> Option<[Vec3d; 3]> {
        match self {
            Aperture::Triangle { v0, v1, v2 } => Some([*v0, *v1, *v2]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_per_variant() {
        let rect = Aperture::rectangle(2.0, 1.0);
        assert_eq!(rect.kind(), ApertureType::Rectangle);
        assert_eq!((rect.width(), rect.height(), rect.radius()), (2.0, 1.0, 0.0));

        let circle = Aperture::circle(0.5);
        assert_eq!(circle.kind(), ApertureType::Circle);
        assert_eq!((circle.width(), circle.height(), circle.radius()), (1.0, 1.0, 0.5));

        let tri = Aperture::triangle(Vec3d::zeros(), Vec3d::x(), Vec3d::y());
        assert_eq!(tri.kind(), ApertureType::Triangle);
        assert_eq!((tri.width(), tri.height(), tri.radius()), (0.0, 0.0, 0.0));
        assert_eq!(tri.vertices(), Some([Vec3d::zeros(), Vec3d::x(), Vec3d::y()]));
        assert_eq!(rect.vertices(), None);
    }
}
