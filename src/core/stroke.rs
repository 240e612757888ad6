use serde::{Deserialize, Serialize};

/// Dominance ratio one axis needs over the other to count as a straight stroke
const AXIS_DOMINANCE: f64 = 1.5;

const SHORT_RATIO: f64 = 0.2;
const MEDIUM_RATIO: f64 = 0.5;

const LOWER_THIRD: f64 = 0.33;
const UPPER_THIRD: f64 = 0.67;

/// A point either in device pixels or, inside a descriptor, in the unit square
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Drawing surface dimensions in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(450.0, 450.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalRight,
    DiagonalLeft,
    CurveRight,
    CurveLeft,
    Complex,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Horizontal => write!(f, "horizontal"),
            Direction::Vertical => write!(f, "vertical"),
            Direction::DiagonalRight => write!(f, "diagonal-right"),
            Direction::DiagonalLeft => write!(f, "diagonal-left"),
            Direction::CurveRight => write!(f, "curve-right"),
            Direction::CurveLeft => write!(f, "curve-left"),
            Direction::Complex => write!(f, "complex"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeLength {
    Short,
    Medium,
    Long,
}

impl std::fmt::Display for StrokeLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrokeLength::Short => write!(f, "short"),
            StrokeLength::Medium => write!(f, "medium"),
            StrokeLength::Long => write!(f, "long"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    Top,
    Middle,
    Bottom,
    Left,
    Right,
    Center,
}

impl Position {
    /// Place on a shared 0..=2 axis; vertical and horizontal senses collapse
    /// onto the same scale, so `Middle` and `Center` are both 1.
    pub fn ordinal(&self) -> u8 {
        match self {
            Position::Top | Position::Left => 0,
            Position::Middle | Position::Center => 1,
            Position::Bottom | Position::Right => 2,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Top => write!(f, "top"),
            Position::Middle => write!(f, "middle"),
            Position::Bottom => write!(f, "bottom"),
            Position::Left => write!(f, "left"),
            Position::Right => write!(f, "right"),
            Position::Center => write!(f, "center"),
        }
    }
}

/// Categorical summary of one drawn stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeDescriptor {
    pub direction: Direction,
    pub length: StrokeLength,
    pub position: Position,
    /// Start point in unit coordinates
    #[serde(alias = "startPoint")]
    pub start: Point,
    /// End point in unit coordinates
    #[serde(alias = "endPoint")]
    pub end: Point,
}

impl StrokeDescriptor {
    pub const fn new(
        direction: Direction,
        length: StrokeLength,
        position: Position,
        start: Point,
        end: Point,
    ) -> Self {
        Self {
            direction,
            length,
            position,
            start,
            end,
        }
    }

    /// Descriptor used when the input cannot be measured
    pub const fn fallback() -> Self {
        Self::new(
            Direction::Complex,
            StrokeLength::Short,
            Position::Center,
            Point::new(0.5, 0.5),
            Point::new(0.5, 0.5),
        )
    }
}

/// Analyze a stroke from its endpoints in device pixels.
///
/// Pure and total: a non-positive or non-finite canvas yields
/// [`StrokeDescriptor::fallback`].
pub fn analyze(start: Point, end: Point, canvas_width: f64, canvas_height: f64) -> StrokeDescriptor {
    let canvas = CanvasSize::new(canvas_width, canvas_height);
    if !canvas.is_valid() {
        return StrokeDescriptor::fallback();
    }

    StrokeDescriptor {
        direction: classify_direction(start, end),
        length: classify_length(start, end, canvas),
        position: classify_position(start, end, canvas),
        start: Point::new(start.x / canvas.width, start.y / canvas.height),
        end: Point::new(end.x / canvas.width, end.y / canvas.height),
    }
}

fn classify_direction(start: Point, end: Point) -> Direction {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let abs_x = dx.abs();
    let abs_y = dy.abs();

    if abs_x > abs_y * AXIS_DOMINANCE {
        Direction::Horizontal
    } else if abs_y > abs_x * AXIS_DOMINANCE {
        Direction::Vertical
    } else if dx > 0.0 && dy > 0.0 {
        Direction::DiagonalRight
    } else if dx < 0.0 && dy > 0.0 {
        Direction::DiagonalLeft
    } else {
        // upward diagonals and the ambiguous zone
        Direction::Complex
    }
}

fn classify_length(start: Point, end: Point, canvas: CanvasSize) -> StrokeLength {
    let ratio = start.distance_to(&end) / canvas.diagonal();

    if ratio < SHORT_RATIO {
        StrokeLength::Short
    } else if ratio < MEDIUM_RATIO {
        StrokeLength::Medium
    } else {
        StrokeLength::Long
    }
}

fn classify_position(start: Point, end: Point, canvas: CanvasSize) -> Position {
    let relative_x = (start.x + end.x) / 2.0 / canvas.width;
    let relative_y = (start.y + end.y) / 2.0 / canvas.height;

    // vertical thirds win over horizontal ones
    if relative_y < LOWER_THIRD {
        Position::Top
    } else if relative_y > UPPER_THIRD {
        Position::Bottom
    } else if relative_x < LOWER_THIRD {
        Position::Left
    } else if relative_x > UPPER_THIRD {
        Position::Right
    } else {
        Position::Center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_px(sx: f64, sy: f64, ex: f64, ey: f64) -> StrokeDescriptor {
        analyze(Point::new(sx, sy), Point::new(ex, ey), 450.0, 450.0)
    }

    #[test]
    fn test_direction_axes() {
        assert_eq!(analyze_px(100.0, 100.0, 300.0, 110.0).direction, Direction::Horizontal);
        assert_eq!(analyze_px(300.0, 110.0, 100.0, 100.0).direction, Direction::Horizontal);
        assert_eq!(analyze_px(200.0, 50.0, 210.0, 400.0).direction, Direction::Vertical);
        assert_eq!(analyze_px(200.0, 400.0, 210.0, 50.0).direction, Direction::Vertical);
    }

    #[test]
    fn test_direction_diagonals() {
        assert_eq!(analyze_px(100.0, 100.0, 200.0, 200.0).direction, Direction::DiagonalRight);
        assert_eq!(analyze_px(200.0, 100.0, 100.0, 200.0).direction, Direction::DiagonalLeft);
        // upward diagonals fold into complex
        assert_eq!(analyze_px(100.0, 200.0, 200.0, 100.0).direction, Direction::Complex);
        assert_eq!(analyze_px(200.0, 200.0, 100.0, 100.0).direction, Direction::Complex);
    }

    #[test]
    fn test_direction_boundary_is_exclusive() {
        // |dx| == 1.5 * |dy| is not horizontal
        assert_eq!(analyze_px(0.0, 0.0, 150.0, 100.0).direction, Direction::DiagonalRight);
    }

    #[test]
    fn test_length_thresholds() {
        let diagonal = CanvasSize::default().diagonal();
        assert_eq!(analyze_px(0.0, 0.0, diagonal * 0.1, 0.0).length, StrokeLength::Short);
        assert_eq!(analyze_px(0.0, 0.0, diagonal * 0.3, 0.0).length, StrokeLength::Medium);
        assert_eq!(analyze_px(0.0, 0.0, 0.0, 449.0).length, StrokeLength::Long);
    }

    #[test]
    fn test_position_prefers_vertical_thirds() {
        // midpoint is both top and left
        assert_eq!(analyze_px(10.0, 10.0, 40.0, 40.0).position, Position::Top);
        assert_eq!(analyze_px(10.0, 400.0, 40.0, 420.0).position, Position::Bottom);
        assert_eq!(analyze_px(10.0, 200.0, 40.0, 250.0).position, Position::Left);
        assert_eq!(analyze_px(400.0, 200.0, 420.0, 250.0).position, Position::Right);
        assert_eq!(analyze_px(200.0, 200.0, 250.0, 250.0).position, Position::Center);
    }

    #[test]
    fn test_endpoints_are_normalized() {
        let descriptor = analyze(Point::new(45.0, 90.0), Point::new(450.0, 0.0), 450.0, 900.0);
        assert_eq!(descriptor.start, Point::new(0.1, 0.1));
        assert_eq!(descriptor.end, Point::new(1.0, 0.0));
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let first = analyze_px(12.5, 300.25, 377.0, 18.0);
        for _ in 0..10 {
            assert_eq!(analyze_px(12.5, 300.25, 377.0, 18.0), first);
        }
    }

    #[test]
    fn test_degenerate_canvas_falls_back() {
        let descriptor = analyze(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0.0, 450.0);
        assert_eq!(descriptor, StrokeDescriptor::fallback());

        let descriptor = analyze(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 450.0, f64::NAN);
        assert_eq!(descriptor.direction, Direction::Complex);
        assert_eq!(descriptor.length, StrokeLength::Short);
        assert_eq!(descriptor.position, Position::Center);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&Direction::DiagonalRight).unwrap();
        assert_eq!(json, "\"diagonal-right\"");
        assert_eq!(Position::Middle.ordinal(), Position::Center.ordinal());
        assert_eq!(Direction::CurveLeft.to_string(), "curve-left");
    }
}
