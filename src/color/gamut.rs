use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Point in CIE 1931 chromaticity space
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance(self, other: Point) -> f64 {
        let d = self.sub(other);
        d.dot(d).sqrt()
    }
}

/// The triangle of colors a lamp can reproduce.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Gamut {
    pub red: Point,
    pub lime: Point,
    pub blue: Point,
}

// LivingColors Iris, Bloom, Aura, LightStrips
pub const GAMUT_A: Gamut = Gamut {
    red: Point::new(0.704, 0.296),
    lime: Point::new(0.2151, 0.7106),
    blue: Point::new(0.138, 0.08),
};

// Hue A19 bulbs
pub const GAMUT_B: Gamut = Gamut {
    red: Point::new(0.675, 0.322),
    lime: Point::new(0.4091, 0.518),
    blue: Point::new(0.167, 0.04),
};

// Hue BR30, A19 (Gen 3), Hue Go, LightStrips plus
pub const GAMUT_C: Gamut = Gamut {
    red: Point::new(0.692, 0.308),
    lime: Point::new(0.17, 0.7),
    blue: Point::new(0.153, 0.048),
};

pub const GAMUT_D: Gamut = Gamut {
    red: Point::new(1.0, 0.0),
    lime: Point::new(0.0, 1.0),
    blue: Point::new(0.0, 0.0),
};

impl Default for Gamut {
    fn default() -> Gamut {
        GAMUT_C
    }
}

// Closest point to p on the segment a-b
fn closest_point_on_segment(a: Point, b: Point, p: Point) -> Point {
    let ap = p.sub(a);
    let ab = b.sub(a);
    let ab2 = ab.dot(ab);
    let t = if ab2 > 0.0 {
        (ap.dot(ab) / ab2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Point::new(a.x + ab.x * t, a.y + ab.y * t)
}

impl Gamut {
    /// True if the point is inside or on the edge of the triangle
    pub fn contains(&self, p: Point) -> bool {
        let v1 = self.lime.sub(self.red);
        let v2 = self.blue.sub(self.red);
        let q = p.sub(self.red);
        let det = v1.cross(v2);
        let s = q.cross(v2) / det;
        let t = v1.cross(q) / det;
        s >= 0.0 && t >= 0.0 && s + t <= 1.0
    }

    /// Find the point on the triangle's boundary closest to p.
    pub fn closest_point(&self, p: Point) -> Point {
        let candidates = [
            closest_point_on_segment(self.red, self.lime, p),
            closest_point_on_segment(self.blue, self.red, p),
            closest_point_on_segment(self.lime, self.blue, p),
        ];
        let mut closest = candidates[0];
        let mut lowest = p.distance(closest);
        for c in &candidates[1..] {
            let d = p.distance(*c);
            if d < lowest {
                lowest = d;
                closest = *c;
            }
        }
        closest
    }

    /// Return p if it's reproducible, otherwise the nearest point that is.
    pub fn clamp(&self, p: Point) -> Point {
        if self.contains(p) {
            p
        } else {
            self.closest_point(p)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct UnknownGamut(pub String);

impl Error for UnknownGamut {}

impl fmt::Display for UnknownGamut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown gamut \"{}\", expected one of A, B, C or D", self.0)
    }
}

impl FromStr for Gamut {
    type Err = UnknownGamut;
    fn from_str(s: &str) -> Result<Gamut, UnknownGamut> {
        match s.trim() {
            "A" | "a" => Ok(GAMUT_A),
            "B" | "b" => Ok(GAMUT_B),
            "C" | "c" => Ok(GAMUT_C),
            "D" | "d" => Ok(GAMUT_D),
            other => Err(UnknownGamut(other.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{closest_point_on_segment, Gamut, Point, GAMUT_C};

    #[test]
    fn inside_and_outside() {
        let g = GAMUT_C;
        assert!(g.contains(Point::new(0.33, 0.33)));
        assert!(g.contains(g.red));
        assert!(g.contains(g.lime));
        assert!(g.contains(g.blue));
        assert!(!g.contains(Point::new(0.9, 0.9)));
        assert!(!g.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn clamp_outside_point() {
        let g = GAMUT_C;
        let p = Point::new(0.9, 0.9);
        let c = g.clamp(p);
        // Nearest is on the red-lime edge
        let on_edge = closest_point_on_segment(g.red, g.lime, p);
        assert_eq!(c, on_edge);
        let others = [
            closest_point_on_segment(g.blue, g.red, p),
            closest_point_on_segment(g.lime, g.blue, p),
        ];
        for o in &others {
            assert!(p.distance(c) <= p.distance(*o));
        }
        // The clamped point lies on the red-lime line
        let ab = Point::new(g.lime.x - g.red.x, g.lime.y - g.red.y);
        let ac = Point::new(c.x - g.red.x, c.y - g.red.y);
        assert!((ab.x * ac.y - ab.y * ac.x).abs() < 1e-12);
    }

    #[test]
    fn clamp_inside_point() {
        let p = Point::new(0.4, 0.4);
        assert_eq!(GAMUT_C.clamp(p), p);
    }

    #[test]
    fn clamp_beyond_vertex() {
        // Far below the blue corner clamps onto the vertex itself
        let g = GAMUT_C;
        let c = g.clamp(Point::new(0.1, -0.5));
        assert!(c.distance(g.blue) < 0.05);
        assert!(g.contains(c) || c.distance(g.closest_point(c)) < 1e-12);
    }

    #[test]
    fn parse_gamut() {
        assert_eq!("C".parse::<Gamut>(), Ok(GAMUT_C));
        assert!("E".parse::<Gamut>().is_err());
    }
}
