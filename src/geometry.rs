//! Hub layout and connector-segment geometry.
//!
//! Coordinates are terminal cells. Points are relative to the home
//! container's top-left corner, like `getBoundingClientRect` offsets.

use ratatui::layout::Rect;

/// Connector pairs drawn between data cores on the hub.
pub const CONNECTIONS: &[(&str, &str)] = &[
    ("hyper-nexus", "emotions"),
    ("hyper-nexus", "image-hover"),
    ("hyper-nexus", "scroll-text"),
    ("hyper-nexus", "mystery"),
    ("emotions", "image-hover"),
    ("scroll-text", "mystery"),
];

/// Fractional placement of each core center inside the cores area.
const CORE_ANCHORS: &[(&str, f64, f64)] = &[
    ("hyper-nexus", 0.5, 0.5),
    ("emotions", 0.18, 0.2),
    ("image-hover", 0.82, 0.2),
    ("scroll-text", 0.18, 0.8),
    ("mystery", 0.82, 0.8),
];

const CORE_WIDTH: u16 = 18;
const CORE_HEIGHT: u16 = 3;

/// A point in cell space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Center of `rect`, relative to `container`.
pub fn center_in(rect: Rect, container: Rect) -> Point {
    Point::new(
        f64::from(rect.x) + f64::from(rect.width) / 2.0 - f64::from(container.x),
        f64::from(rect.y) + f64::from(rect.height) / 2.0 - f64::from(container.y),
    )
}

/// A decorative line between two core centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point (relative to the home container).
    pub start: Point,
    /// Euclidean length.
    pub length: f64,
    /// Orientation in degrees, `atan2(dy, dx)`.
    pub angle_deg: f64,
}

impl Segment {
    pub fn between(start: Point, end: Point) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        Self {
            start,
            length: (dx * dx + dy * dy).sqrt(),
            angle_deg: dy.atan2(dx).to_degrees(),
        }
    }

    /// End point reconstructed from start, length and angle.
    pub fn end(&self) -> Point {
        let radians = self.angle_deg.to_radians();
        Point::new(
            self.start.x + self.length * radians.cos(),
            self.start.y + self.length * radians.sin(),
        )
    }
}

/// A clickable data core on the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub core_id: &'static str,
    pub rect: Rect,
}

/// Split of the terminal area used by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubLayout {
    /// The home container: cores, connectors and the flock live here.
    pub cores: Rect,
    /// Chat input and response.
    pub chat: Rect,
    /// System log panel.
    pub logs: Rect,
    /// Key hints.
    pub footer: Rect,
}

impl HubLayout {
    pub fn compute(area: Rect) -> Self {
        let footer_height = 2.min(area.height);
        let footer = Rect::new(
            area.x,
            area.y + area.height - footer_height,
            area.width,
            footer_height,
        );
        let body_height = area.height - footer_height;
        let console_height = (body_height / 3).min(12);
        let cores_height = body_height - console_height;
        let cores = Rect::new(area.x, area.y, area.width, cores_height);

        let console_y = area.y + cores_height;
        let chat_width = area.width * 3 / 5;
        let chat = Rect::new(area.x, console_y, chat_width, console_height);
        let logs = Rect::new(
            area.x + chat_width,
            console_y,
            area.width - chat_width,
            console_height,
        );

        Self {
            cores,
            chat,
            logs,
            footer,
        }
    }
}

/// Place the data cores inside the cores area.
pub fn layout_cores(container: Rect) -> Vec<Affordance> {
    let width = CORE_WIDTH.min(container.width);
    let height = CORE_HEIGHT.min(container.height);

    CORE_ANCHORS
        .iter()
        .map(|&(core_id, fx, fy)| {
            let cx = f64::from(container.width) * fx;
            let cy = f64::from(container.height) * fy;
            let max_x = container.width.saturating_sub(width);
            let max_y = container.height.saturating_sub(height);
            let x = ((cx - f64::from(width) / 2.0).max(0.0) as u16).min(max_x);
            let y = ((cy - f64::from(height) / 2.0).max(0.0) as u16).min(max_y);
            Affordance {
                core_id,
                rect: Rect::new(container.x + x, container.y + y, width, height),
            }
        })
        .collect()
}

/// Compute the declared connector segments between affordance centers.
///
/// Pairs whose endpoints are missing are skipped.
pub fn connector_segments(affordances: &[Affordance], container: Rect) -> Vec<Segment> {
    let center = |id: &str| {
        affordances
            .iter()
            .find(|a| a.core_id == id)
            .map(|a| center_in(a.rect, container))
    };

    CONNECTIONS
        .iter()
        .filter_map(|&(from, to)| Some(Segment::between(center(from)?, center(to)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_three_four_five() {
        let segment = Segment::between(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((segment.length - 5.0).abs() < 1e-9);
        assert!((segment.angle_deg - 53.130_102_354).abs() < 1e-6);
    }

    #[test]
    fn test_segment_end_round_trips() {
        let segment = Segment::between(Point::new(2.0, 1.0), Point::new(-4.0, 9.0));
        let end = segment.end();
        assert!((end.x + 4.0).abs() < 1e-9);
        assert!((end.y - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_center_is_relative_to_container() {
        let container = Rect::new(10, 5, 100, 40);
        let rect = Rect::new(20, 10, 4, 2);
        assert_eq!(center_in(rect, container), Point::new(12.0, 6.0));
    }

    #[test]
    fn test_cores_stay_inside_container() {
        let container = Rect::new(0, 0, 80, 20);
        let cores = layout_cores(container);
        assert_eq!(cores.len(), 5);
        for core in &cores {
            assert!(core.rect.right() <= container.right());
            assert!(core.rect.bottom() <= container.bottom());
        }
    }

    #[test]
    fn test_all_declared_connectors_drawn() {
        let container = Rect::new(0, 0, 120, 30);
        let segments = connector_segments(&layout_cores(container), container);
        assert_eq!(segments.len(), CONNECTIONS.len());
    }

    #[test]
    fn test_missing_endpoint_skips_pair() {
        let container = Rect::new(0, 0, 120, 30);
        let cores: Vec<Affordance> = layout_cores(container)
            .into_iter()
            .filter(|a| a.core_id != "mystery")
            .collect();
        // two pairs touch the mystery core
        assert_eq!(connector_segments(&cores, container).len(), 4);
    }

    #[test]
    fn test_hub_layout_partitions_area() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = HubLayout::compute(area);
        assert_eq!(layout.footer.height, 2);
        assert_eq!(
            layout.cores.height + layout.chat.height + layout.footer.height,
            40
        );
        assert_eq!(layout.chat.width + layout.logs.width, 100);
    }

    #[test]
    fn test_hub_layout_tiny_area() {
        let layout = HubLayout::compute(Rect::new(0, 0, 10, 1));
        assert_eq!(layout.footer.height, 1);
        assert_eq!(layout.cores.height, 0);
    }
}
