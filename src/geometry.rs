//! Geometry primitives (C1): polygon area, bounding box, perimeter,
//! point-in-polygon, and vertex-proximity checks.

use crate::constants::GeometryConstants;
use crate::errors::AppError;
use crate::types::{Point, Polygon, Rect};
use crate::Result;

/// Absolute value of the signed shoelace sum: `|½ Σᵢ (xᵢ·y_{i+1} − x_{i+1}·yᵢ)|`.
pub fn polygon_area(poly: &Polygon) -> Result<f64> {
    if poly.points.len() < 3 {
        return Err(AppError::degenerate_polygon(format!(
            "polygon has {} points, need at least 3",
            poly.points.len()
        )));
    }

    let pts = &poly.points;
    let n = pts.len();
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
    }
    let area = (sum / 2.0).abs();

    if area <= 0.0 {
        return Err(AppError::degenerate_polygon("polygon has zero area"));
    }

    Ok(area)
}

/// Min/max over the polygon's coordinates.
pub fn bbox(poly: &Polygon) -> Result<Rect> {
    if poly.points.is_empty() {
        return Err(AppError::degenerate_polygon("polygon has no points"));
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in &poly.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    if max_x <= min_x || max_y <= min_y {
        return Err(AppError::degenerate_polygon(
            "polygon bounding box is degenerate",
        ));
    }

    Ok(Rect::new(min_x, min_y, max_x, max_y))
}

/// Sum of segment lengths around the implicitly-closed polygon.
pub fn perimeter(poly: &Polygon) -> f64 {
    let pts = &poly.points;
    if pts.len() < 2 {
        return 0.0;
    }
    let n = pts.len();
    (0..n).map(|i| pts[i].distance_to(&pts[(i + 1) % n])).sum()
}

/// Standard ray-casting point-in-polygon test with a horizontal rightward
/// ray. Points exactly on an edge are treated as inside.
pub fn point_in_polygon(p: &Point, poly: &Polygon) -> bool {
    let eps = GeometryConstants::COORDINATE_EPSILON;
    let pts = &poly.points;
    let n = pts.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        if point_on_segment(p, &a, &b, eps) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        let intersects = ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Like [`point_in_polygon`], but boundary points count as outside. Used
/// where "on the concave vertex itself" must not be conflated with "inside
/// the shape" — the decomposer's corner-admission rule in particular, since
/// a reflex vertex sits on the boundary of every cell touching it.
pub(crate) fn point_strictly_inside_polygon(p: &Point, poly: &Polygon) -> bool {
    let eps = GeometryConstants::COORDINATE_EPSILON;
    let pts = &poly.points;
    let n = pts.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        if point_on_segment(p, &a, &b, eps) {
            return false;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        let intersects = ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_on_segment(p: &Point, a: &Point, b: &Point, eps: f64) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > eps {
        return false;
    }
    let within_x = p.x >= a.x.min(b.x) - eps && p.x <= a.x.max(b.x) + eps;
    let within_y = p.y >= a.y.min(b.y) - eps && p.y <= a.y.max(b.y) + eps;
    within_x && within_y
}

/// Bounding box enclosing every polygon in `polys`. Used by the strategy
/// evaluator's `project_merged` candidate and the height grouper's
/// per-group bounding box.
pub fn merged_bbox(polys: &[&Polygon]) -> Result<Rect> {
    let mut iter = polys.iter();
    let first = iter.next().ok_or_else(|| AppError::degenerate_polygon("no polygons to merge"))?;
    let mut merged = bbox(first)?;
    for poly in iter {
        let b = bbox(poly)?;
        merged.min_x = merged.min_x.min(b.min_x);
        merged.min_y = merged.min_y.min(b.min_y);
        merged.max_x = merged.max_x.max(b.max_x);
        merged.max_y = merged.max_y.max(b.max_y);
    }
    Ok(merged)
}

/// True if any vertex of `poly1` is within `tol` millimeters of any vertex of
/// `poly2`. Used by the height grouper's connectivity heuristic.
pub fn polygons_close(poly1: &Polygon, poly2: &Polygon, tol: f64) -> bool {
    poly1.points.iter().any(|a| {
        poly2
            .points
            .iter()
            .any(|b| a.distance_to(b) <= tol)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_poly(w: f64, h: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ])
    }

    #[test]
    fn area_of_rectangle() {
        let poly = rect_poly(5000.0, 3000.0);
        assert_eq!(polygon_area(&poly).unwrap(), 15_000_000.0);
    }

    #[test]
    fn area_of_l_shape() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2000.0, 0.0),
            Point::new(2000.0, 1000.0),
            Point::new(1000.0, 1000.0),
            Point::new(1000.0, 2000.0),
            Point::new(0.0, 2000.0),
        ]);
        assert_eq!(polygon_area(&poly).unwrap(), 3_000_000.0);
    }

    #[test]
    fn degenerate_polygon_rejected() {
        let poly = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(polygon_area(&poly).is_err());
    }

    #[test]
    fn bbox_of_rectangle() {
        let poly = rect_poly(5000.0, 3000.0);
        let r = bbox(&poly).unwrap();
        assert_eq!(r.width(), 5000.0);
        assert_eq!(r.height(), 3000.0);
    }

    #[test]
    fn perimeter_of_rectangle() {
        let poly = rect_poly(5000.0, 3000.0);
        assert_eq!(perimeter(&poly), 2.0 * (5000.0 + 3000.0));
    }

    #[test]
    fn point_in_polygon_basic() {
        let poly = rect_poly(100.0, 100.0);
        assert!(point_in_polygon(&Point::new(50.0, 50.0), &poly));
        assert!(!point_in_polygon(&Point::new(150.0, 50.0), &poly));
        // On the boundary counts as inside.
        assert!(point_in_polygon(&Point::new(0.0, 50.0), &poly));
    }

    #[test]
    fn point_in_polygon_l_shape_concave_corner() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2000.0, 0.0),
            Point::new(2000.0, 1000.0),
            Point::new(1000.0, 1000.0),
            Point::new(1000.0, 2000.0),
            Point::new(0.0, 2000.0),
        ]);
        // Inside the "notch" cut out of the L.
        assert!(!point_in_polygon(&Point::new(1500.0, 1500.0), &poly));
        // Inside the body of the L.
        assert!(point_in_polygon(&Point::new(500.0, 500.0), &poly));
    }

    #[test]
    fn point_strictly_inside_excludes_boundary_and_vertices() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2000.0, 0.0),
            Point::new(2000.0, 1000.0),
            Point::new(1000.0, 1000.0),
            Point::new(1000.0, 2000.0),
            Point::new(0.0, 2000.0),
        ]);
        // The reflex vertex and its neighbors are "inside" for point_in_polygon...
        assert!(point_in_polygon(&Point::new(1000.0, 1000.0), &poly));
        // ...but not for the strict variant.
        assert!(!point_strictly_inside_polygon(&Point::new(1000.0, 1000.0), &poly));
        assert!(point_strictly_inside_polygon(&Point::new(500.0, 500.0), &poly));
    }

    #[test]
    fn polygons_close_detects_shared_vertex_within_tolerance() {
        let a = rect_poly(1000.0, 1000.0);
        let b = Polygon::new(vec![
            Point::new(1050.0, 0.0),
            Point::new(2000.0, 0.0),
            Point::new(2000.0, 1000.0),
            Point::new(1050.0, 1000.0),
        ]);
        assert!(polygons_close(&a, &b, 100.0));
        assert!(!polygons_close(&a, &b, 10.0));
    }
}
