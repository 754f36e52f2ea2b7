// src/geometry.rs

//! 2D primitives for the fold simulation: points, simple polygons, infinite
//! split lines, reflection, convex hulls, and segment clipping.
//!
//! Polygons are ordered, implicitly closed vertex lists. After every
//! mutating operation the winding is normalized counter-clockwise
//! (non-negative signed area). A polygon that would fall below 3 vertices is
//! reported to the caller instead of being constructed.

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn dist(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(a: Point, b: Point, t: f64) -> Point {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }

    pub fn midpoint(a: Point, b: Point) -> Point {
        Point::lerp(a, b, 0.5)
    }
}

/// Signed cross-product test: positive when `p` lies left of `a -> b`.
pub fn side_of(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Reflects `p` across the infinite line through `a` and `b`.
pub fn reflect_across(a: Point, b: Point, p: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 < EPS {
        return p;
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len2;
    let proj = Point::new(a.x + t * dx, a.y + t * dy);
    Point::new(2.0 * proj.x - p.x, 2.0 * proj.y - p.y)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn short_side(&self) -> f64 {
        self.width().min(self.height())
    }

    pub fn diagonal(&self) -> f64 {
        (self.width() * self.width() + self.height() * self.height()).sqrt()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

/// An ordered, implicitly closed, CCW-wound simple polygon.
#[derive(Debug, Clone)]
pub struct Polygon {
    pts: Vec<Point>,
}

impl Polygon {
    /// Builds a polygon from at least 3 vertices; winding is normalized.
    pub fn new(pts: Vec<Point>) -> Option<Polygon> {
        if pts.len() < 3 {
            return None;
        }
        let mut poly = Polygon { pts };
        poly.ensure_ccw();
        Some(poly)
    }

    /// The full canvas sheet.
    pub fn sheet(width: f64, height: f64) -> Polygon {
        Polygon {
            pts: vec![
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width, height),
                Point::new(0.0, height),
            ],
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.pts
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Shoelace area; positive for CCW winding.
    pub fn signed_area(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.pts.len() {
            let a = self.pts[i];
            let b = self.pts[(i + 1) % self.pts.len()];
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }

    fn ensure_ccw(&mut self) {
        if self.signed_area() < 0.0 {
            self.pts.reverse();
        }
    }

    pub fn bbox(&self) -> BBox {
        let mut min = self.pts[0];
        let mut max = self.pts[0];
        for p in &self.pts {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        BBox { min, max }
    }

    /// Point on the boundary at normalized perimeter parameter `t`.
    pub fn perimeter_point(&self, t: f64) -> Point {
        let n = self.pts.len();
        let mut total = 0.0;
        for i in 0..n {
            total += self.pts[i].dist(self.pts[(i + 1) % n]);
        }
        if total < EPS {
            return self.pts[0];
        }
        let mut remaining = t.rem_euclid(1.0) * total;
        for i in 0..n {
            let a = self.pts[i];
            let b = self.pts[(i + 1) % n];
            let edge = a.dist(b);
            if remaining <= edge {
                if edge < EPS {
                    return a;
                }
                return Point::lerp(a, b, remaining / edge);
            }
            remaining -= edge;
        }
        self.pts[0]
    }

    /// Splits the polygon by the infinite line through `la`/`lb`.
    ///
    /// Points on the line belong to both sides. Returns `(left, right)`
    /// relative to the line direction, or `None` when either side
    /// degenerates below 3 usable vertices (the fold step is then skipped).
    pub fn split(&self, la: Point, lb: Point) -> Option<(Polygon, Polygon)> {
        let n = self.pts.len();
        let mut left: Vec<Point> = Vec::with_capacity(n + 2);
        let mut right: Vec<Point> = Vec::with_capacity(n + 2);
        for i in 0..n {
            let cur = self.pts[i];
            let nxt = self.pts[(i + 1) % n];
            let d1 = side_of(la, lb, cur);
            let d2 = side_of(la, lb, nxt);
            if d1 >= -EPS {
                push_dedup(&mut left, cur);
            }
            if d1 <= EPS {
                push_dedup(&mut right, cur);
            }
            if (d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS) {
                let t = d1 / (d1 - d2);
                let ip = Point::lerp(cur, nxt, t);
                push_dedup(&mut left, ip);
                push_dedup(&mut right, ip);
            }
        }
        dedup_closed(&mut left);
        dedup_closed(&mut right);
        let lp = Polygon::new(left)?;
        let rp = Polygon::new(right)?;
        if lp.signed_area() < EPS || rp.signed_area() < EPS {
            return None;
        }
        Some((lp, rp))
    }

    /// Recenters and rescales the polygon to fit the canvas with a margin.
    /// Applied periodically to stop compounding numerical drift.
    pub fn fit_into(&mut self, width: f64, height: f64, margin: f64) {
        let bb = self.bbox();
        if bb.width() < EPS || bb.height() < EPS {
            return;
        }
        let scale = ((width - 2.0 * margin) / bb.width())
            .min((height - 2.0 * margin) / bb.height());
        let from = bb.center();
        let to = Point::new(width / 2.0, height / 2.0);
        for p in &mut self.pts {
            p.x = (p.x - from.x) * scale + to.x;
            p.y = (p.y - from.y) * scale + to.y;
        }
    }
}

fn push_dedup(list: &mut Vec<Point>, p: Point) {
    if let Some(last) = list.last() {
        if last.dist(p) < EPS {
            return;
        }
    }
    list.push(p);
}

fn dedup_closed(list: &mut Vec<Point>) {
    while list.len() >= 2 && list[0].dist(list[list.len() - 1]) < EPS {
        list.pop();
    }
}

/// Monotone-chain convex hull; output is CCW without repeated endpoints.
/// Returns `None` for fewer than 3 distinct hull points.
pub fn convex_hull(points: &[Point]) -> Option<Polygon> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
    });
    pts.dedup_by(|a, b| a.dist(*b) < EPS);
    if pts.len() < 3 {
        return None;
    }
    let mut lower: Vec<Point> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2
            && side_of(lower[lower.len() - 2], lower[lower.len() - 1], p) <= EPS
        {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2
            && side_of(upper[upper.len() - 2], upper[upper.len() - 1], p) <= EPS
        {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    Polygon::new(lower)
}

/// Parametric segment intersection. Both parameters must land strictly
/// inside `(0.001, 0.999)`, excluding touching and near-collinear cases.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let d1x = a2.x - a1.x;
    let d1y = a2.y - a1.y;
    let d2x = b2.x - b1.x;
    let d2y = b2.y - b1.y;
    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let sx = b1.x - a1.x;
    let sy = b1.y - a1.y;
    let t = (sx * d2y - sy * d2x) / denom;
    let u = (sx * d1y - sy * d1x) / denom;
    if t > 0.001 && t < 0.999 && u > 0.001 && u < 0.999 {
        Some(Point::new(a1.x + d1x * t, a1.y + d1y * t))
    } else {
        None
    }
}

/// Liang-Barsky clip of a segment to `[0, width] x [0, height]`.
pub fn clip_segment_to_rect(
    p1: Point,
    p2: Point,
    width: f64,
    height: f64,
) -> Option<(Point, Point)> {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let checks = [
        (-dx, p1.x),
        (dx, width - p1.x),
        (-dy, p1.y),
        (dy, height - p1.y),
    ];
    for (p, q) in checks {
        if p.abs() < 1e-12 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
            }
        }
    }
    Some((
        Point::new(p1.x + t0 * dx, p1.y + t0 * dy),
        Point::new(p1.x + t1 * dx, p1.y + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn sheet_is_ccw_with_expected_area() {
        let p = Polygon::sheet(100.0, 50.0);
        assert_eq!(p.len(), 4);
        assert!((p.signed_area() - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn split_square_down_the_middle() {
        let p = Polygon::sheet(10.0, 10.0);
        let (a, b) = p
            .split(Point::new(5.0, -100.0), Point::new(5.0, 100.0))
            .expect("central split cannot degenerate");
        assert!((a.signed_area() - 50.0).abs() < 1e-6);
        assert!((b.signed_area() - 50.0).abs() < 1e-6);
        assert!(a.signed_area() >= 0.0 && b.signed_area() >= 0.0);
    }

    #[test]
    fn split_missing_the_polygon_degenerates() {
        let p = Polygon::sheet(10.0, 10.0);
        assert!(p
            .split(Point::new(50.0, -100.0), Point::new(50.0, 100.0))
            .is_none());
    }

    #[test]
    fn reflection_is_an_involution() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let p = Point::new(3.0, 7.0);
        let r = reflect_across(a, b, p);
        // Across y=x the coordinates swap.
        assert!((r.x - 7.0).abs() < 1e-9);
        assert!((r.y - 3.0).abs() < 1e-9);
        let back = reflect_across(a, b, r);
        assert!(back.dist(p) < 1e-9);
    }

    #[test]
    fn convex_hull_drops_interior_points() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(5.0, 5.0),
            Point::new(2.0, 3.0),
        ];
        let hull = convex_hull(&pts).unwrap();
        assert_eq!(hull.len(), 4);
        assert!((hull.signed_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn segment_intersection_requires_interior_crossing() {
        let c = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert!(c.dist(Point::new(5.0, 5.0)) < 1e-9);
        // Endpoint touch is excluded by the strict parameter window.
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        )
        .is_none());
        // Parallel segments never intersect.
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn clip_keeps_inside_segments_and_trims_crossing_ones() {
        let kept = clip_segment_to_rect(Point::new(1.0, 1.0), Point::new(9.0, 9.0), 10.0, 10.0)
            .unwrap();
        assert!(kept.0.dist(Point::new(1.0, 1.0)) < 1e-9);
        assert!(kept.1.dist(Point::new(9.0, 9.0)) < 1e-9);

        let trimmed =
            clip_segment_to_rect(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), 10.0, 10.0)
                .unwrap();
        assert!(trimmed.0.dist(Point::new(0.0, 5.0)) < 1e-9);
        assert!(trimmed.1.dist(Point::new(10.0, 5.0)) < 1e-9);

        assert!(
            clip_segment_to_rect(Point::new(-5.0, -5.0), Point::new(-1.0, -1.0), 10.0, 10.0)
                .is_none()
        );
    }

    #[test]
    fn perimeter_point_walks_the_boundary() {
        let p = Polygon::sheet(10.0, 10.0);
        assert!(p.perimeter_point(0.0).dist(Point::new(0.0, 0.0)) < 1e-9);
        assert!(p.perimeter_point(0.25).dist(Point::new(10.0, 0.0)) < 1e-9);
        assert!(p.perimeter_point(0.5).dist(Point::new(10.0, 10.0)) < 1e-9);
        assert!(p.perimeter_point(0.125).dist(Point::new(5.0, 0.0)) < 1e-9);
    }

    #[test]
    fn fit_into_restores_canvas_bounds() {
        let mut p = Polygon::sheet(10.0, 10.0);
        // Blow the polygon out of bounds, then normalize back.
        let scaled: Vec<Point> = p
            .points()
            .iter()
            .map(|q| Point::new(q.x * 37.0 - 80.0, q.y * 37.0 + 120.0))
            .collect();
        p = Polygon::new(scaled).unwrap();
        p.fit_into(100.0, 80.0, 4.0);
        let bb = p.bbox();
        assert!(bb.min.x >= 3.9 && bb.min.y >= -0.1);
        assert!(bb.max.x <= 96.1 && bb.max.y <= 80.1);
    }
}
