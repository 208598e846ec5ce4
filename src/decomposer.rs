//! Shape decomposer (C2): splits a room polygon into axis-aligned rectangular
//! cells whose union approximates the polygon interior, via a universal grid
//! over the polygon's own vertex coordinates.

use tracing::warn;

use crate::constants::GeometryConstants;
use crate::geometry::{bbox, point_in_polygon, point_strictly_inside_polygon, polygon_area};
use crate::types::{Point, Polygon, Rect};
use crate::Result;

/// Decompose `poly` into axis-aligned cells. Falls back to the polygon's bbox
/// as a single cell if the coverage invariant is violated.
pub fn decompose(poly: &Polygon) -> Result<Vec<Rect>> {
    let area = polygon_area(poly)?;
    let bounds = bbox(poly)?;

    let cells = universal_grid_cells(poly, &bounds);
    let cell_area: f64 = cells.iter().map(|c| c.area()).sum();

    let divergence = if area > 0.0 {
        (area - cell_area).abs() / area
    } else {
        1.0
    };

    if divergence > GeometryConstants::MAX_COVERAGE_DIVERGENCE {
        warn!(
            polygon_area = area,
            cell_area, divergence, "decomposition diverged from polygon area, falling back to bbox"
        );
        return Ok(vec![bounds]);
    }

    Ok(cells)
}

fn universal_grid_cells(poly: &Polygon, bounds: &Rect) -> Vec<Rect> {
    let xs = filtered_axis_coords(poly.points.iter().map(|p| p.x), bounds.width());
    let ys = filtered_axis_coords(poly.points.iter().map(|p| p.y), bounds.height());

    let mut cells = Vec::new();
    for j in 0..ys.len().saturating_sub(1) {
        for i in 0..xs.len().saturating_sub(1) {
            let cell = Rect::new(xs[i], ys[j], xs[i + 1], ys[j + 1]);
            if cell_is_kept(&cell, poly) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Sorted, de-duplicated coordinates with near-duplicate values (within 1% of
/// the bbox extent) merged away, keeping the first and last.
fn filtered_axis_coords(coords: impl Iterator<Item = f64>, extent: f64) -> Vec<f64> {
    let mut values: Vec<f64> = coords.collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    if values.len() <= 2 || extent <= 0.0 {
        return values;
    }

    let min_spacing = extent * GeometryConstants::MIN_GRID_SPACING_FRACTION;
    let mut filtered = Vec::with_capacity(values.len());
    filtered.push(values[0]);
    for &v in &values[1..values.len() - 1] {
        if v - filtered.last().unwrap() >= min_spacing {
            filtered.push(v);
        }
    }
    let last = *values.last().unwrap();
    if last - filtered.last().unwrap() >= 1e-9 {
        filtered.push(last);
    }
    filtered
}

/// A cell is kept if its center is inside the polygon, or at least 3 of its
/// 4 corners are.
///
/// The center test follows `point_in_polygon`'s own boundary-inclusive
/// contract. The corner test does not: grid coordinates come straight from
/// the polygon's own vertices, so a reflex vertex sits exactly on 3 of a
/// cell's 4 corners (the vertex itself plus the two grid lines through it),
/// which would make every cell touching that vertex "pass" corner-counting
/// regardless of how much of the cell is actually outside the polygon.
/// Corners are therefore tested for strict interior containment, so a
/// corner that only qualifies by sitting on the boundary doesn't count;
/// only a corner genuinely inside the shape does. See `DESIGN.md`'s "Open
/// question decisions (decomposer)" for a worked case where this matters.
fn cell_is_kept(cell: &Rect, poly: &Polygon) -> bool {
    if point_in_polygon(&cell.center(), poly) {
        return true;
    }
    let corners = [
        Point::new(cell.min_x, cell.min_y),
        Point::new(cell.max_x, cell.min_y),
        Point::new(cell.max_x, cell.max_y),
        Point::new(cell.min_x, cell.max_y),
    ];
    corners
        .iter()
        .filter(|corner| point_strictly_inside_polygon(corner, poly))
        .count()
        >= 3
}
