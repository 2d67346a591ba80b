use crate::config::SketchConfig;
use crate::direction::{Directions, resolve_directions};
use crate::geometry::{BoundingBox, Point};

use super::{LineShape, LineType};

/// Inset used when testing whether a segment runs through a box.
const CROSSING_INSET: f32 = 0.5;

/// Input for one connector path.
#[derive(Debug, Clone, Copy)]
pub struct LineRequest<'a> {
    pub line_type: LineType,
    pub start_point: Point,
    pub end_point: Point,
    pub source: &'a BoundingBox,
    pub target: &'a BoundingBox,
}

/// Compute the path for a connector. `None` means the edge cannot be drawn:
/// an endpoint is not finite or both endpoints coincide.
pub fn sketch_line(request: &LineRequest<'_>, config: &SketchConfig) -> Option<LineShape> {
    let start = request.start_point;
    let end = request.end_point;
    if !start.is_valid() || !end.is_valid() || same_point(start, end) {
        return None;
    }

    match request.line_type {
        LineType::Linear => Some(LineShape {
            line_type: LineType::Linear,
            start_point: start,
            end_point: end,
            coordinates: vec![start, end],
            control_points: Vec::new(),
        }),
        LineType::Rectilinear => {
            let directions = resolve_directions(
                start,
                end,
                request.source,
                request.target,
                config.direction_padding,
            );
            let coordinates = route_rectilinear(
                start,
                end,
                directions,
                request.source,
                request.target,
                config.jog,
            );
            let control_points = coordinates[1..coordinates.len() - 1].to_vec();
            Some(LineShape {
                line_type: LineType::Rectilinear,
                start_point: start,
                end_point: end,
                coordinates,
                control_points,
            })
        }
    }
}

/// Orthogonal route from `start` to `end` that leaves through
/// `directions.start` and enters through `directions.end`.
///
/// Candidate routes of growing complexity are generated (straight, L, Z/U
/// through a channel, stubbed L, stubbed detour); the winner avoids running
/// through either box, then has the fewest bends, then is the shortest.
pub fn route_rectilinear(
    start: Point,
    end: Point,
    directions: Directions,
    source: &BoundingBox,
    target: &BoundingBox,
    jog: f32,
) -> Vec<Point> {
    let jog = if jog.is_finite() && jog > 0.0 { jog } else { 20.0 };
    let from_dir = directions.start.normal();
    // direction of travel on the final segment, i.e. into the target
    let to_dir = directions.end.normal() * -1.0;

    let candidates = route_candidates(start, end, from_dir, to_dir, source, target, jog);

    let mut best: Option<(Vec<Point>, (bool, usize, f32))> = None;
    for path in candidates {
        let path = simplify_path(path);
        if !is_valid_route(&path, from_dir, to_dir) {
            continue;
        }
        let crosses = path
            .windows(2)
            .any(|seg| crosses_box(seg[0], seg[1], source) || crosses_box(seg[0], seg[1], target));
        let key = (crosses, path.len() - 2, path_length(&path));
        let replace = match &best {
            None => true,
            Some((_, best_key)) => {
                (key.0, key.1) < (best_key.0, best_key.1)
                    || ((key.0, key.1) == (best_key.0, best_key.1) && key.2 < best_key.2)
            }
        };
        if replace {
            best = Some((path, key));
        }
    }

    match best {
        Some((path, _)) => path,
        None => {
            tracing::trace!(?start, ?end, ?directions, "no clean orthogonal route, using stub detour");
            fallback_route(start, end, from_dir, to_dir, source, target, jog)
        }
    }
}

fn route_candidates(
    start: Point,
    end: Point,
    from_dir: Point,
    to_dir: Point,
    source: &BoundingBox,
    target: &BoundingBox,
    jog: f32,
) -> Vec<Vec<Point>> {
    let from_h = from_dir.x != 0.0;
    let to_h = to_dir.x != 0.0;
    let mut candidates: Vec<Vec<Point>> = Vec::new();

    candidates.push(vec![start, end]);

    if from_h && !to_h {
        candidates.push(vec![start, Point::new(end.x, start.y), end]);
    } else if !from_h && to_h {
        candidates.push(vec![start, Point::new(start.x, end.y), end]);
    }

    let start_out = start + from_dir * jog;
    let end_in = end - to_dir * jog;

    if from_h && to_h {
        let channels = [
            (start.x + end.x) / 2.0,
            start.x.max(end.x) + jog,
            start.x.min(end.x) - jog,
        ];
        for cx in channels {
            candidates.push(vec![start, Point::new(cx, start.y), Point::new(cx, end.y), end]);
        }
        let lanes = [
            (start.y + end.y) / 2.0,
            source.y.min(target.y) - jog,
            source.bottom().max(target.bottom()) + jog,
        ];
        for cy in lanes {
            candidates.push(vec![
                start,
                start_out,
                Point::new(start_out.x, cy),
                Point::new(end_in.x, cy),
                end_in,
                end,
            ]);
        }
    } else if !from_h && !to_h {
        let channels = [
            (start.y + end.y) / 2.0,
            start.y.max(end.y) + jog,
            start.y.min(end.y) - jog,
        ];
        for cy in channels {
            candidates.push(vec![start, Point::new(start.x, cy), Point::new(end.x, cy), end]);
        }
        let lanes = [
            (start.x + end.x) / 2.0,
            source.x.min(target.x) - jog,
            source.right().max(target.right()) + jog,
        ];
        for cx in lanes {
            candidates.push(vec![
                start,
                start_out,
                Point::new(cx, start_out.y),
                Point::new(cx, end_in.y),
                end_in,
                end,
            ]);
        }
    }

    candidates.push(vec![start, start_out, Point::new(end_in.x, start_out.y), end_in, end]);
    candidates.push(vec![start, start_out, Point::new(start_out.x, end_in.y), end_in, end]);

    candidates
}

/// Always-orthogonal route around the far side of both boxes.
fn fallback_route(
    start: Point,
    end: Point,
    from_dir: Point,
    to_dir: Point,
    source: &BoundingBox,
    target: &BoundingBox,
    jog: f32,
) -> Vec<Point> {
    let start_out = start + from_dir * jog;
    let end_in = end - to_dir * jog;
    let path = if from_dir.x != 0.0 {
        let cy = source.bottom().max(target.bottom()) + jog;
        vec![
            start,
            start_out,
            Point::new(start_out.x, cy),
            Point::new(end_in.x, cy),
            end_in,
            end,
        ]
    } else {
        let cx = source.right().max(target.right()) + jog;
        vec![
            start,
            start_out,
            Point::new(cx, start_out.y),
            Point::new(cx, end_in.y),
            end_in,
            end,
        ]
    };
    let path = simplify_path(path);
    if path.len() >= 2 {
        path
    } else {
        vec![start, end]
    }
}

fn same_point(a: Point, b: Point) -> bool {
    a.x == b.x && a.y == b.y
}

fn segment_direction(from: Point, to: Point) -> Option<Point> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx != 0.0 && dy != 0.0 {
        // diagonal
        return None;
    }
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    if dx != 0.0 {
        Some(Point::new(dx.signum(), 0.0))
    } else {
        Some(Point::new(0.0, dy.signum()))
    }
}

fn dot(a: Point, b: Point) -> f32 {
    a.x * b.x + a.y * b.y
}

fn path_length(path: &[Point]) -> f32 {
    path.windows(2).map(|pair| Point::distance(pair[0], pair[1])).sum()
}

/// Drop repeated points and straight-through bends. Backtracking bends are
/// kept so validation can reject them.
pub(crate) fn simplify_path(points: Vec<Point>) -> Vec<Point> {
    let mut cleaned: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if cleaned.last().is_some_and(|last| same_point(*last, point)) {
            continue;
        }
        cleaned.push(point);
    }

    let mut simplified: Vec<Point> = Vec::with_capacity(cleaned.len());
    for point in cleaned {
        while simplified.len() >= 2 {
            let len = simplified.len();
            let a = simplified[len - 2];
            let b = simplified[len - 1];
            let straight = match (segment_direction(a, b), segment_direction(b, point)) {
                (Some(first), Some(second)) => dot(first, second) > 0.5,
                _ => false,
            };
            if straight {
                simplified.pop();
            } else {
                break;
            }
        }
        simplified.push(point);
    }

    simplified
}

fn is_valid_route(path: &[Point], from_dir: Point, to_dir: Point) -> bool {
    if path.len() < 2 {
        return false;
    }
    let mut dirs = Vec::with_capacity(path.len() - 1);
    for pair in path.windows(2) {
        let Some(dir) = segment_direction(pair[0], pair[1]) else {
            return false;
        };
        dirs.push(dir);
    }
    if dot(dirs[0], from_dir) < 0.5 || dot(dirs[dirs.len() - 1], to_dir) < 0.5 {
        return false;
    }
    dirs.windows(2).all(|pair| dot(pair[0], pair[1]) > -0.5)
}

fn crosses_box(a: Point, b: Point, bounds: &BoundingBox) -> bool {
    let left = bounds.x + CROSSING_INSET;
    let right = bounds.right() - CROSSING_INSET;
    let top = bounds.y + CROSSING_INSET;
    let bottom = bounds.bottom() - CROSSING_INSET;
    if left >= right || top >= bottom {
        return false;
    }
    let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
    let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
    max_x > left && min_x < right && max_y > top && min_y < bottom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    fn config() -> SketchConfig {
        SketchConfig::default()
    }

    fn rectilinear(
        start: Point,
        end: Point,
        source: &BoundingBox,
        target: &BoundingBox,
    ) -> LineShape {
        sketch_line(
            &LineRequest {
                line_type: LineType::Rectilinear,
                start_point: start,
                end_point: end,
                source,
                target,
            },
            &config(),
        )
        .expect("drawable line")
    }

    fn assert_orthogonal(line: &LineShape) {
        assert_eq!(line.coordinates.first(), Some(&line.start_point));
        assert_eq!(line.coordinates.last(), Some(&line.end_point));
        for pair in line.coordinates.windows(2) {
            let same_x = pair[0].x == pair[1].x;
            let same_y = pair[0].y == pair[1].y;
            assert!(same_x ^ same_y, "segment {:?} -> {:?} is not axis aligned", pair[0], pair[1]);
        }
        assert_eq!(line.control_points.len(), line.coordinates.len() - 2);
    }

    #[test]
    fn linear_line_has_two_points() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let line = sketch_line(
            &LineRequest {
                line_type: LineType::Linear,
                start_point: Point::new(10.0, 5.0),
                end_point: Point::new(50.0, 40.0),
                source: &a,
                target: &a,
            },
            &config(),
        )
        .unwrap();
        assert_eq!(line.coordinates, vec![Point::new(10.0, 5.0), Point::new(50.0, 40.0)]);
        assert!(line.control_points.is_empty());
    }

    #[test]
    fn invalid_or_degenerate_points_are_not_drawn() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        for line_type in [LineType::Linear, LineType::Rectilinear] {
            let nan = LineRequest {
                line_type,
                start_point: Point::new(f32::NAN, 0.0),
                end_point: Point::new(5.0, 5.0),
                source: &a,
                target: &a,
            };
            assert!(sketch_line(&nan, &config()).is_none());
            let same = LineRequest {
                start_point: Point::new(5.0, 5.0),
                ..nan
            };
            assert!(sketch_line(&same, &config()).is_none());
        }
    }

    #[test]
    fn facing_aligned_anchors_need_no_bend() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        let b = BoundingBox::new(300.0, 0.0, 100.0, 50.0);
        let line = rectilinear(Point::new(100.0, 25.0), Point::new(300.0, 25.0), &a, &b);
        assert_eq!(line.bends(), 0);
        assert_orthogonal(&line);
    }

    #[test]
    fn perpendicular_exits_take_one_bend() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        let b = BoundingBox::new(300.0, 200.0, 100.0, 50.0);
        // leave east, enter from the north
        let line = rectilinear(Point::new(100.0, 25.0), Point::new(350.0, 200.0), &a, &b);
        assert_eq!(line.control_points, vec![Point::new(350.0, 25.0)]);
        assert_orthogonal(&line);
    }

    #[test]
    fn offset_facing_anchors_jog_through_the_middle() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        let b = BoundingBox::new(300.0, 100.0, 100.0, 50.0);
        let line = rectilinear(Point::new(100.0, 25.0), Point::new(300.0, 125.0), &a, &b);
        assert_eq!(
            line.control_points,
            vec![Point::new(200.0, 25.0), Point::new(200.0, 125.0)]
        );
        assert_orthogonal(&line);
    }

    #[test]
    fn first_segment_follows_exit_direction() {
        let a = BoundingBox::new(0.0, 100.0, 100.0, 50.0);
        let b = BoundingBox::new(300.0, 0.0, 100.0, 50.0);
        // leave south although the target is up and to the right
        let line = rectilinear(Point::new(50.0, 150.0), Point::new(300.0, 25.0), &a, &b);
        assert_orthogonal(&line);
        let first = line.coordinates[1];
        assert_eq!(first.x, 50.0);
        assert!(first.y > 150.0);
        let before_last = line.coordinates[line.coordinates.len() - 2];
        assert_eq!(before_last.y, 25.0);
        assert!(before_last.x < 300.0);
    }

    #[test]
    fn same_side_exits_wrap_around() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        let b = BoundingBox::new(0.0, 200.0, 160.0, 50.0);
        let directions = Directions {
            start: Direction::East,
            end: Direction::East,
        };
        let path = route_rectilinear(
            Point::new(100.0, 25.0),
            Point::new(160.0, 225.0),
            directions,
            &a,
            &b,
            20.0,
        );
        assert_eq!(
            path,
            vec![
                Point::new(100.0, 25.0),
                Point::new(180.0, 25.0),
                Point::new(180.0, 225.0),
                Point::new(160.0, 225.0),
            ]
        );
    }

    #[test]
    fn self_loop_goes_around_the_corner() {
        let a = BoundingBox::new(0.0, 0.0, 200.0, 100.0);
        let line = rectilinear(Point::new(200.0, 40.0), Point::new(160.0, 0.0), &a, &a);
        assert_orthogonal(&line);
        assert_eq!(
            line.control_points,
            vec![Point::new(220.0, 40.0), Point::new(220.0, -20.0), Point::new(160.0, -20.0)]
        );
    }

    #[test]
    fn every_direction_pair_yields_orthogonal_paths() {
        let source = BoundingBox::new(0.0, 0.0, 120.0, 80.0);
        let targets = [
            BoundingBox::new(300.0, 0.0, 120.0, 80.0),
            BoundingBox::new(300.0, 250.0, 120.0, 80.0),
            BoundingBox::new(-300.0, -250.0, 120.0, 80.0),
            BoundingBox::new(20.0, 200.0, 120.0, 80.0),
        ];
        let sides = [Direction::North, Direction::South, Direction::East, Direction::West];
        let padding = config().anchor_padding;
        for target in targets {
            for start_side in sides {
                for end_side in sides {
                    let start = crate::anchor::anchors_for_side(&source, start_side, padding).unwrap()[1];
                    let end = crate::anchor::anchors_for_side(&target, end_side, padding).unwrap()[1];
                    let path = route_rectilinear(
                        start,
                        end,
                        Directions { start: start_side, end: end_side },
                        &source,
                        &target,
                        20.0,
                    );
                    assert_eq!(path.first(), Some(&start));
                    assert_eq!(path.last(), Some(&end));
                    for pair in path.windows(2) {
                        assert!(
                            (pair[0].x == pair[1].x) ^ (pair[0].y == pair[1].y),
                            "{start_side:?}->{end_side:?}: diagonal or empty segment in {path:?}"
                        );
                    }
                }
            }
        }
    }
}
