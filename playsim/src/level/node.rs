//! BSP traversal. Point location descends to a single leaf, the trace and box
//! walks visit leaves near to far from the query origin. All walks use an
//! explicit stack so a deep tree cannot exhaust the call stack.

use math::{Fixed, Trace, point_on_side};

use crate::level::map_data::MapData;
use crate::level::map_defs::{BBox, Node, NodeChild};

impl Node {
    /// R_PointOnSide. `0` is the front child.
    #[inline]
    pub fn point_on_side(&self, x: Fixed, y: Fixed) -> usize {
        point_on_side(x, y, &self.line)
    }
}

impl MapData {
    /// The subsector containing a point. Always succeeds, a point outside the
    /// map lands in whichever leaf the partition lines lead to.
    pub fn point_in_subsector(&self, x: Fixed, y: Fixed) -> usize {
        let mut child = self.start_node();
        loop {
            match child {
                NodeChild::Subsector(s) => return s,
                NodeChild::Node(n) => {
                    let node = &self.nodes()[n];
                    child = node.children[node.point_on_side(x, y)];
                }
            }
        }
    }

    /// Sector containing a point
    #[inline]
    pub fn point_in_sector(&self, x: Fixed, y: Fixed) -> usize {
        self.subsectors()[self.point_in_subsector(x, y)].sector
    }

    /// Visit every subsector the trace from its origin to `origin + delta`
    /// passes through, nearest first. The far side of a partition is only
    /// entered if the end point lies on it. Stops early and returns false if
    /// `func` does.
    pub fn trace_subsectors(&self, trace: &Trace, mut func: impl FnMut(usize) -> bool) -> bool {
        let x2 = trace.x + trace.dx;
        let y2 = trace.y + trace.dy;

        let mut stack = Vec::with_capacity(32);
        stack.push(self.start_node());

        while let Some(child) = stack.pop() {
            match child {
                NodeChild::Subsector(s) => {
                    if !func(s) {
                        return false;
                    }
                }
                NodeChild::Node(n) => {
                    let node = &self.nodes()[n];
                    let side = node.point_on_side(trace.x, trace.y);
                    if side != node.point_on_side(x2, y2) {
                        stack.push(node.children[side ^ 1]);
                    }
                    // near side goes last so it is walked first
                    stack.push(node.children[side]);
                }
            }
        }
        true
    }

    /// Visit every subsector whose node box touches `bbox`, the side holding
    /// the box centre first. Stops early and returns false if `func` does.
    pub fn subsectors_in_box(&self, bbox: &BBox, mut func: impl FnMut(usize) -> bool) -> bool {
        let cx = Fixed((bbox.left.0 >> 1) + (bbox.right.0 >> 1));
        let cy = Fixed((bbox.bottom.0 >> 1) + (bbox.top.0 >> 1));

        let mut stack = Vec::with_capacity(32);
        stack.push(self.start_node());

        while let Some(child) = stack.pop() {
            match child {
                NodeChild::Subsector(s) => {
                    if !func(s) {
                        return false;
                    }
                }
                NodeChild::Node(n) => {
                    let node = &self.nodes()[n];
                    let side = node.point_on_side(cx, cy);
                    if node.bboxes[side ^ 1].touches(bbox) {
                        stack.push(node.children[side ^ 1]);
                    }
                    if node.bboxes[side].touches(bbox) {
                        stack.push(node.children[side]);
                    }
                }
            }
        }
        true
    }
}
