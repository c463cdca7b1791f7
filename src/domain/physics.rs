/// Collision resolver: axis-separated tile sweep.
///
/// ## Algorithm
///
/// A body is moved along exactly ONE axis per call (X first, then Y each
/// step; never diagonally combined):
///
///   1. Apply the delta to the coordinate.
///   2. Find the inclusive tile range the box now covers. Leading edges use
///      `floor(edge / TILE)`; trailing edges use the last pixel the box
///      covers, `ceil(edge) - 1`. A box flush against a cell does not count
///      as inside it, but any sub-pixel penetration does.
///   3. Scan that range row-major. On the FIRST solid cell:
///
/// ┌──────┬──────────┬──────────────────────────────┬──────────────────────┐
/// │ Axis │ Delta    │ Clamp                         │ Flags                │
/// ├──────┼──────────┼──────────────────────────────┼──────────────────────┤
/// │ X    │ dx > 0   │ right edge = cell left edge   │ vx = 0               │
/// │ X    │ dx < 0   │ left edge = cell right edge   │ vx = 0               │
/// │ Y    │ dy > 0   │ bottom = cell top             │ vy = 0, on_ground    │
/// │ Y    │ dy < 0   │ top = cell bottom             │ vy = 0               │
/// │ any  │ 0        │ none                          │ none                 │
/// └──────┴──────────┴──────────────────────────────┴──────────────────────┘
///
///   4. A Y pass that finds NO solid cell clears `on_ground`. This is the
///      only place it is cleared, and zero-delta passes still scan, so
///      walking off a ledge is noticed on the very next vertical pass.
///
/// At most one cell is resolved per call. A box overlapping several solid
/// cells is clamped against whichever the row-major scan meets first.

use super::entity::{Body, Rect};
use super::tilemap::Tilemap;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
}

/// Move `body` horizontally by `dx` and clamp against walls.
pub fn move_x(body: &mut Body, dx: f32, map: &Tilemap) {
    sweep(body, Axis::X, dx, map);
}

/// Move `body` vertically by `dy`, clamp against floors/ceilings and
/// recompute `on_ground`.
pub fn move_y(body: &mut Body, dy: f32, map: &Tilemap) {
    sweep(body, Axis::Y, dy, map);
}

pub fn sweep(body: &mut Body, axis: Axis, delta: f32, map: &Tilemap) {
    match axis {
        Axis::X => body.rect.x += delta,
        Axis::Y => body.rect.y += delta,
    }

    let hit = first_solid(&body.rect, map);
    let t = map.tile_size();

    match (axis, hit) {
        (Axis::X, Some((col, _))) => {
            if delta > 0.0 {
                body.rect.x = col as f32 * t - body.rect.w;
                body.vx = 0.0;
            } else if delta < 0.0 {
                body.rect.x = (col + 1) as f32 * t;
                body.vx = 0.0;
            }
        }
        (Axis::Y, Some((_, row))) => {
            if delta > 0.0 {
                body.rect.y = row as f32 * t - body.rect.h;
                body.vy = 0.0;
                body.on_ground = true;
            } else if delta < 0.0 {
                body.rect.y = (row + 1) as f32 * t;
                body.vy = 0.0;
            }
        }
        (Axis::Y, None) => body.on_ground = false,
        (Axis::X, None) => {}
    }
}

/// Inclusive `(col0, col1, row0, row1)` tile range covered by `rect`.
pub fn covered_cells(rect: &Rect, map: &Tilemap) -> (i32, i32, i32, i32) {
    (
        map.cell_of(rect.x),
        map.cell_of(last_pixel(rect.right())),
        map.cell_of(rect.y),
        map.cell_of(last_pixel(rect.bottom())),
    )
}

/// Last pixel inside a box whose exclusive far edge is `edge`.
fn last_pixel(edge: f32) -> f32 {
    edge.ceil() - 1.0
}

/// First solid `(col, row)` under `rect`, scanning row-major.
pub fn first_solid(rect: &Rect, map: &Tilemap) -> Option<(i32, i32)> {
    let (c0, c1, r0, r1) = covered_cells(rect, map);
    for row in r0..=r1 {
        for col in c0..=c1 {
            if map.is_solid(col, row) {
                return Some((col, row));
            }
        }
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
