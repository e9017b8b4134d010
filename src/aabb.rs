use crate::geometry::Vec3d;

// default is empty, min above max
#[derive(Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3d,
    pub max: Vec3d,
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb {
            min: Vec3d::repeat(f64::INFINITY),
            max: Vec3d::repeat(f64::NEG_INFINITY),
        }
    }
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3d>) -> Aabb {
        points
            .into_iter()
            .fold(Aabb::default(), |aabb, point| aabb.extend_point(point))
    }

    pub fn extend_point(&self, point: &Vec3d) -> Aabb {
        Aabb {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    pub fn extend_aabb(&self, aabb: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&aabb.min),
            max: self.max.sup(&aabb.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|coord| self.min[coord] > self.max[coord])
    }

    pub fn contains(&self, aabb: &Aabb) -> bool {
        (0..3).all(|coord| aabb.min[coord] >= self.min[coord] && aabb.max[coord] <= self.max[coord])
    }
}
