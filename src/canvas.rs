//! Canvas auto-sizing.
//!
//! The host reports structural changes (nodes added, node attributes
//! changed). Affected nodes are queued and handled together in one flush that
//! the host runs on its next zero-delay timer tick; queueing again before that
//! tick supersedes the pending flush. A flush grows the canvas so every queued
//! node fits with a margin. The canvas never shrinks here.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Viewport};

/// Read access to the diagram surface the sizer works against.
pub trait CanvasSurface {
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Node rectangle in client (screen) space, `None` if it cannot be resolved.
    fn client_rect(&self, node: &Self::Node) -> Option<BoundingBox>;

    /// Pan/zoom used to map client rectangles back to canvas coordinates.
    fn viewport(&self) -> Viewport {
        Viewport::default()
    }

    fn children(&self, _node: &Self::Node) -> Vec<Self::Node> {
        Vec::new()
    }

    /// Connector (edge) elements are never sized against; resizing around
    /// them would retrigger their own redraw.
    fn is_connector(&self, _node: &Self::Node) -> bool {
        false
    }
}

/// A structural notification from the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralChange<N> {
    Added(N),
    Changed { node: N, attribute: String },
}

/// Something that records structural changes and hands them out in order.
pub trait StructuralSource {
    type Node;

    fn drain_changes(&mut self) -> Vec<StructuralChange<Self::Node>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasExtent {
    pub width: f32,
    pub height: f32,
}

impl CanvasExtent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Grow so `bounds` fits with `margin` to spare on the right and bottom.
    /// Returns which dimensions changed.
    pub fn grow_to_fit(&mut self, bounds: &BoundingBox, margin: f32) -> (bool, bool) {
        let mut grew = (false, false);
        let right = bounds.right();
        if right.is_finite() && right > self.width {
            self.width = right + margin;
            grew.0 = true;
        }
        let bottom = bounds.bottom();
        if bottom.is_finite() && bottom > self.height {
            self.height = bottom + margin;
            grew.1 = true;
        }
        grew
    }
}

/// Handle for one scheduled flush. Only the most recent one is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlushTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    Idle,
    Queued(FlushTicket),
    Flushing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlushReport {
    pub processed: usize,
    pub grew_width: bool,
    pub grew_height: bool,
    pub extent: CanvasExtent,
}

#[derive(Debug, Clone)]
pub struct AutoSizer<N> {
    state: FlushState,
    pending: Vec<N>,
    next_ticket: u64,
    margin: f32,
}

impl<N: Clone + PartialEq + std::fmt::Debug> AutoSizer<N> {
    pub fn new(margin: f32) -> Self {
        Self {
            state: FlushState::Idle,
            pending: Vec::new(),
            next_ticket: 0,
            margin,
        }
    }

    pub fn state(&self) -> FlushState {
        self.state
    }

    pub fn pending(&self) -> &[N] {
        &self.pending
    }

    /// Route one change into the queue. Returns the ticket the host should
    /// schedule a zero-delay flush for, or `None` when the change is ignored.
    pub fn notify<S>(&mut self, surface: &S, change: StructuralChange<N>) -> Option<FlushTicket>
    where
        S: CanvasSurface<Node = N>,
    {
        match change {
            StructuralChange::Added(node) => {
                if surface.is_connector(&node) {
                    return None;
                }
                let mut seen = vec![node.clone()];
                let mut stack = vec![node];
                while let Some(current) = stack.pop() {
                    for child in surface.children(&current) {
                        // Children may point back up the tree.
                        if surface.is_connector(&child) || seen.contains(&child) {
                            continue;
                        }
                        seen.push(child.clone());
                        stack.push(child);
                    }
                    self.enqueue(current);
                }
                Some(self.reschedule())
            }
            StructuralChange::Changed { node, attribute } => {
                if surface.is_connector(&node) {
                    return None;
                }
                tracing::trace!(?node, %attribute, "node changed");
                self.enqueue(node);
                Some(self.reschedule())
            }
        }
    }

    /// Feed every change from a source; returns the ticket to schedule, if any.
    pub fn observe<S, Src>(&mut self, surface: &S, source: &mut Src) -> Option<FlushTicket>
    where
        S: CanvasSurface<Node = N>,
        Src: StructuralSource<Node = N>,
    {
        let mut ticket = None;
        for change in source.drain_changes() {
            if let Some(next) = self.notify(surface, change) {
                ticket = Some(next);
            }
        }
        ticket
    }

    /// Run a scheduled flush. A ticket superseded by a later change is stale
    /// and does nothing.
    pub fn flush<S>(
        &mut self,
        ticket: FlushTicket,
        surface: &S,
        extent: &mut CanvasExtent,
    ) -> Option<FlushReport>
    where
        S: CanvasSurface<Node = N>,
    {
        if self.state != FlushState::Queued(ticket) {
            tracing::trace!(?ticket, state = ?self.state, "stale flush ticket");
            return None;
        }
        Some(self.flush_now(surface, extent))
    }

    /// Flush immediately, regardless of any pending ticket.
    pub fn flush_now<S>(&mut self, surface: &S, extent: &mut CanvasExtent) -> FlushReport
    where
        S: CanvasSurface<Node = N>,
    {
        self.state = FlushState::Flushing;
        let queued = std::mem::take(&mut self.pending);
        let viewport = surface.viewport();
        let mut report = FlushReport {
            processed: 0,
            grew_width: false,
            grew_height: false,
            extent: *extent,
        };
        for node in &queued {
            if surface.is_connector(node) {
                continue;
            }
            let Some(rect) = surface.client_rect(node) else {
                tracing::debug!(?node, "node has no resolvable bounds; skipped");
                continue;
            };
            let local = viewport.to_local(rect);
            let (width, height) = extent.grow_to_fit(&local, self.margin);
            report.grew_width |= width;
            report.grew_height |= height;
            report.processed += 1;
        }
        report.extent = *extent;
        if report.grew_width || report.grew_height {
            tracing::debug!(width = extent.width, height = extent.height, "canvas grown");
        }
        self.state = FlushState::Idle;
        report
    }

    fn enqueue(&mut self, node: N) {
        if !self.pending.contains(&node) {
            self.pending.push(node);
        }
    }

    fn reschedule(&mut self) -> FlushTicket {
        self.next_ticket += 1;
        let ticket = FlushTicket(self.next_ticket);
        self.state = FlushState::Queued(ticket);
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Surface {
        rects: HashMap<&'static str, BoundingBox>,
        children: HashMap<&'static str, Vec<&'static str>>,
        connectors: Vec<&'static str>,
        viewport: Viewport,
    }

    impl CanvasSurface for Surface {
        type Node = &'static str;

        fn client_rect(&self, node: &Self::Node) -> Option<BoundingBox> {
            self.rects.get(node).copied()
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
            self.children.get(node).cloned().unwrap_or_default()
        }

        fn is_connector(&self, node: &Self::Node) -> bool {
            self.connectors.contains(node)
        }
    }

    fn surface() -> Surface {
        let mut surface = Surface::default();
        surface.rects.insert("wide", BoundingBox::new(450.0, 10.0, 100.0, 40.0));
        surface.rects.insert("small", BoundingBox::new(300.0, 10.0, 100.0, 40.0));
        surface.rects.insert("tall", BoundingBox::new(10.0, 380.0, 100.0, 100.0));
        surface.rects.insert("edge", BoundingBox::new(0.0, 0.0, 2000.0, 2000.0));
        surface
    }

    #[test]
    fn grows_width_past_right_edge() {
        let surface = surface();
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(500.0, 400.0);
        let ticket = sizer
            .notify(
                &surface,
                StructuralChange::Changed {
                    node: "wide",
                    attribute: "transform".to_string(),
                },
            )
            .unwrap();
        let report = sizer.flush(ticket, &surface, &mut extent).unwrap();
        assert_eq!(extent.width, 590.0);
        assert_eq!(extent.height, 400.0);
        assert!(report.grew_width);
        assert!(!report.grew_height);
    }

    #[test]
    fn node_inside_canvas_changes_nothing() {
        let surface = surface();
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(500.0, 400.0);
        let ticket = sizer.notify(&surface, StructuralChange::Added("small")).unwrap();
        sizer.flush(ticket, &surface, &mut extent).unwrap();
        assert_eq!(extent, CanvasExtent::new(500.0, 400.0));
    }

    #[test]
    fn never_shrinks() {
        let mut extent = CanvasExtent::new(1000.0, 1000.0);
        assert_eq!(
            extent.grow_to_fit(&BoundingBox::new(0.0, 0.0, 10.0, 10.0), 40.0),
            (false, false)
        );
        assert_eq!(extent, CanvasExtent::new(1000.0, 1000.0));
    }

    #[test]
    fn last_scheduled_flush_wins() {
        let surface = surface();
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(500.0, 400.0);
        let first = sizer.notify(&surface, StructuralChange::Added("wide")).unwrap();
        let second = sizer.notify(&surface, StructuralChange::Added("tall")).unwrap();
        assert_ne!(first, second);
        assert_eq!(sizer.state(), FlushState::Queued(second));

        assert!(sizer.flush(first, &surface, &mut extent).is_none());
        assert_eq!(sizer.pending(), &["wide", "tall"]);

        let report = sizer.flush(second, &surface, &mut extent).unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(extent, CanvasExtent::new(590.0, 520.0));
        assert_eq!(sizer.state(), FlushState::Idle);
        assert!(sizer.pending().is_empty());
    }

    #[test]
    fn connectors_are_ignored() {
        let mut surface = surface();
        surface.connectors.push("edge");
        let mut sizer = AutoSizer::new(40.0);
        assert!(sizer.notify(&surface, StructuralChange::Added("edge")).is_none());
        assert_eq!(sizer.state(), FlushState::Idle);
    }

    #[test]
    fn added_nodes_bring_their_descendants() {
        let mut surface = surface();
        surface.rects.insert("group", BoundingBox::new(0.0, 0.0, 50.0, 50.0));
        surface.children.insert("group", vec!["wide", "edge"]);
        surface.children.insert("wide", vec!["tall"]);
        surface.connectors.push("edge");
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(500.0, 400.0);
        let ticket = sizer.notify(&surface, StructuralChange::Added("group")).unwrap();
        assert_eq!(sizer.pending().len(), 3);
        assert!(!sizer.pending().contains(&"edge"));
        sizer.flush(ticket, &surface, &mut extent).unwrap();
        assert_eq!(extent, CanvasExtent::new(590.0, 520.0));
    }

    #[test]
    fn cyclic_children_are_walked_once() {
        let mut surface = surface();
        surface.children.insert("wide", vec!["tall", "wide"]);
        surface.children.insert("tall", vec!["wide"]);
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(500.0, 400.0);
        let ticket = sizer.notify(&surface, StructuralChange::Added("wide")).unwrap();
        assert_eq!(sizer.pending(), &["wide", "tall"]);
        let report = sizer.flush(ticket, &surface, &mut extent).unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(extent, CanvasExtent::new(590.0, 520.0));
    }

    #[test]
    fn client_rects_are_unscaled_before_growth() {
        let mut surface = surface();
        surface.viewport = Viewport {
            pan: crate::geometry::Point::new(0.0, 0.0),
            scale: 2.0,
        };
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(200.0, 200.0);
        // client right edge 550 is 275 on the canvas
        let ticket = sizer.notify(&surface, StructuralChange::Added("wide")).unwrap();
        sizer.flush(ticket, &surface, &mut extent).unwrap();
        assert_eq!(extent.width, 315.0);
    }

    #[test]
    fn observes_a_change_source() {
        struct Log(Vec<StructuralChange<&'static str>>);
        impl StructuralSource for Log {
            type Node = &'static str;
            fn drain_changes(&mut self) -> Vec<StructuralChange<&'static str>> {
                std::mem::take(&mut self.0)
            }
        }
        let surface = surface();
        let mut log = Log(vec![
            StructuralChange::Added("small"),
            StructuralChange::Changed {
                node: "wide",
                attribute: "x".to_string(),
            },
        ]);
        let mut sizer = AutoSizer::new(40.0);
        let mut extent = CanvasExtent::new(500.0, 400.0);
        let ticket = sizer.observe(&surface, &mut log).unwrap();
        let report = sizer.flush(ticket, &surface, &mut extent).unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(extent.width, 590.0);
        assert!(log.0.is_empty());
    }
}
