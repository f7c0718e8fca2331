//! Broad-phase spatial index
//!
//! A region quadtree over bounding boxes, rebuilt from scratch every tick.
//! Each node holds boxes until it has more than `max_objects`, then splits
//! into four equal quadrants and pushes its boxes down. A box is stored in
//! every quadrant it overlaps, so queries never miss a straddling object;
//! the cost is duplicate hits, which `retrieve` removes.

use super::physics::Rect;
use crate::config::SpatialConfig;

#[derive(Debug, Clone)]
pub struct QuadTree {
    bounds: Rect,
    depth: u32,
    max_objects: usize,
    max_depth: u32,
    /// (box, caller payload)
    objects: Vec<(Rect, usize)>,
    children: Option<Box<[QuadTree; 4]>>,
}

impl QuadTree {
    pub fn new(bounds: Rect, cfg: &SpatialConfig) -> Self {
        Self::with_depth(bounds, 0, cfg.max_objects, cfg.max_depth)
    }

    fn with_depth(bounds: Rect, depth: u32, max_objects: usize, max_depth: u32) -> Self {
        Self {
            bounds,
            depth,
            max_objects,
            max_depth,
            objects: Vec::new(),
            children: None,
        }
    }

    /// Drop every object and every subdivision
    pub fn clear(&mut self) {
        self.objects.clear();
        self.children = None;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// True once this node has been subdivided
    pub fn is_split(&self) -> bool {
        self.children.is_some()
    }

    /// Deepest level reached below (and including) this node
    pub fn depth(&self) -> u32 {
        match &self.children {
            Some(children) => children.iter().map(QuadTree::depth).max().unwrap_or(self.depth),
            None => self.depth,
        }
    }

    /// Insert a bounding box tagged with `id`
    pub fn insert(&mut self, bounds: Rect, id: usize) {
        if let Some(children) = self.children.as_deref_mut() {
            if route(children, bounds, id) {
                return;
            }
            self.objects.push((bounds, id));
            return;
        }

        self.objects.push((bounds, id));
        if self.objects.len() > self.max_objects && self.depth < self.max_depth {
            self.split();
        }
    }

    fn split(&mut self) {
        let Rect {
            x,
            y,
            width,
            height,
        } = self.bounds;
        let (w, h) = (width / 2.0, height / 2.0);
        let child = |cx: f32, cy: f32| {
            QuadTree::with_depth(
                Rect::new(cx, cy, w, h),
                self.depth + 1,
                self.max_objects,
                self.max_depth,
            )
        };
        let mut children = Box::new([
            child(x + w, y),
            child(x, y),
            child(x, y + h),
            child(x + w, y + h),
        ]);

        let mut kept = Vec::new();
        for (bounds, id) in self.objects.drain(..) {
            if !route(&mut children, bounds, id) {
                kept.push((bounds, id));
            }
        }
        self.objects = kept;
        self.children = Some(children);
    }

    /// Payloads of every object that may overlap `query`, ascending and
    /// without duplicates
    pub fn retrieve(&self, query: &Rect) -> Vec<usize> {
        let mut found = Vec::new();
        self.collect(query, &mut found);
        found.sort_unstable();
        found.dedup();
        found
    }

    fn collect(&self, query: &Rect, out: &mut Vec<usize>) {
        out.extend(self.objects.iter().map(|(_, id)| *id));
        if let Some(children) = &self.children {
            for child in children.iter().filter(|c| c.bounds.overlaps(query)) {
                child.collect(query, out);
            }
        }
    }
}

/// Insert into every child the box overlaps. Returns false if it overlaps none.
fn route(children: &mut [QuadTree; 4], bounds: Rect, id: usize) -> bool {
    let mut placed = false;
    for child in children.iter_mut().filter(|c| c.bounds.overlaps(&bounds)) {
        child.insert(bounds, id);
        placed = true;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_no_split_under_threshold() {
        let mut tree = QuadTree::new(world(), &SpatialConfig::default());
        for i in 0..10 {
            tree.insert(Rect::around(Vec2::new(50.0 + i as f32 * 60.0, 100.0), 5.0), i);
        }
        assert!(!tree.is_split());
        tree.insert(Rect::around(Vec2::new(700.0, 500.0), 5.0), 10);
        assert!(tree.is_split());
    }

    #[test]
    fn test_depth_is_capped() {
        let cfg = SpatialConfig {
            max_objects: 1,
            max_depth: 3,
        };
        let mut tree = QuadTree::new(world(), &cfg);
        for i in 0..20 {
            tree.insert(Rect::around(Vec2::new(10.0, 10.0), 1.0), i);
        }
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.retrieve(&Rect::around(Vec2::new(10.0, 10.0), 1.0)).len(), 20);
    }

    #[test]
    fn test_straddling_box_found_once() {
        let cfg = SpatialConfig {
            max_objects: 1,
            max_depth: 5,
        };
        let mut tree = QuadTree::new(world(), &cfg);
        tree.insert(Rect::around(Vec2::new(400.0, 300.0), 40.0), 0);
        tree.insert(Rect::around(Vec2::new(100.0, 100.0), 10.0), 1);
        tree.insert(Rect::around(Vec2::new(700.0, 500.0), 10.0), 2);
        assert!(tree.is_split());

        // Query in the top-left quadrant sees the centre box but not the far one
        let hits = tree.retrieve(&Rect::around(Vec2::new(380.0, 280.0), 2.0));
        assert!(hits.contains(&0));
        assert!(!hits.contains(&2));
        let all = tree.retrieve(&world());
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn test_clear_resets() {
        let mut tree = QuadTree::new(world(), &SpatialConfig::default());
        for i in 0..30 {
            tree.insert(Rect::around(Vec2::new(i as f32 * 20.0, 300.0), 5.0), i);
        }
        tree.clear();
        assert!(!tree.is_split());
        assert!(tree.retrieve(&world()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_retrieve_covers_brute_force(
            boxes in proptest::collection::vec((0.0f32..800.0, 0.0f32..600.0, 1.0f32..50.0), 0..60),
            qx in 0.0f32..800.0, qy in 0.0f32..600.0, qr in 1.0f32..20.0,
        ) {
            let cfg = SpatialConfig { max_objects: 3, max_depth: 5 };
            let mut tree = QuadTree::new(world(), &cfg);
            let rects: Vec<Rect> = boxes
                .iter()
                .map(|&(x, y, r)| Rect::around(Vec2::new(x, y), r))
                .collect();
            for (i, r) in rects.iter().enumerate() {
                tree.insert(*r, i);
            }

            let query = Rect::around(Vec2::new(qx, qy), qr);
            let found = tree.retrieve(&query);
            prop_assert!(found.windows(2).all(|w| w[0] < w[1]));
            for (i, r) in rects.iter().enumerate() {
                if r.overlaps(&query) {
                    prop_assert!(found.contains(&i));
                }
            }
        }
    }
}
