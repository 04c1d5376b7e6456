//! Bubble pool and lane occupancy
//!
//! Invariant: after every public call, live bubbles occupy pairwise-distinct
//! lanes and their count never exceeds the configured cap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::Item;

/// One falling instance of a catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    /// Unique for the lifetime of the spawner, never reused
    pub id: u64,
    pub item: Item,
    /// Fixed at spawn time
    pub is_good: bool,
    pub lane: usize,
    /// Horizontal offset in px
    pub left: f32,
    pub spawned_at_ms: u64,
    /// Set by the first click; later clicks and fall-outs are no-ops
    pub resolved: bool,
}

impl Bubble {
    /// 0.0 at spawn, 1.0 once the fall animation completes
    pub fn fall_progress(&self, now_ms: u64, fall_duration_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.spawned_at_ms);
        (elapsed as f32 / fall_duration_ms.max(1) as f32).min(1.0)
    }

    /// Top-left corner inside the play area
    pub fn position(&self, now_ms: u64, fall_duration_ms: u64, area_height: f32) -> Vec2 {
        Vec2::new(
            self.left,
            self.fall_progress(now_ms, fall_duration_ms) * area_height,
        )
    }
}

/// Result of a spawn: the new bubble and any bubbles dropped to make room
#[derive(Debug, Clone)]
pub struct SpawnReport {
    pub bubble: Bubble,
    /// Oldest first; treated as misses
    pub evicted: Vec<Bubble>,
}

/// Owns live bubbles and decides where new ones go
#[derive(Debug, Clone)]
pub struct Spawner {
    lanes: usize,
    max_live: usize,
    bubble_width: f32,
    lane_inset: f32,
    area_width: f32,
    /// Spawn order, oldest first
    bubbles: Vec<Bubble>,
    next_id: u64,
}

impl Spawner {
    pub fn new(lanes: usize, max_live: usize, bubble_width: f32, lane_inset: f32, area_width: f32) -> Self {
        let lanes = lanes.max(1);
        Self {
            lanes,
            max_live: max_live.max(lanes),
            bubble_width,
            lane_inset,
            area_width,
            bubbles: Vec::new(),
            next_id: 0,
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn get(&self, id: u64) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Play-area width reported by the presentation layer
    pub fn set_area_width(&mut self, width: f32) {
        if width > 0.0 {
            self.area_width = width;
        }
    }

    /// Lanes spread evenly over the area minus one bubble width
    pub fn lane_left(&self, lane: usize) -> f32 {
        if self.lanes == 1 {
            return self.lane_inset;
        }
        let step = (self.area_width - self.bubble_width).max(0.0) / (self.lanes - 1) as f32;
        self.lane_inset + lane as f32 * step
    }

    pub fn occupied_lanes(&self) -> Vec<usize> {
        let mut lanes: Vec<usize> = self.bubbles.iter().map(|b| b.lane).collect();
        lanes.sort_unstable();
        lanes
    }

    fn free_lane(&self) -> Option<usize> {
        (0..self.lanes).find(|lane| self.bubbles.iter().all(|b| b.lane != *lane))
    }

    /// Place a new bubble in the lowest free lane
    ///
    /// When every lane is taken the oldest bubble is evicted and its lane
    /// reused, so a spawn tick is never skipped.
    pub fn spawn(&mut self, item: Item, is_good: bool, now_ms: u64) -> SpawnReport {
        let mut evicted = Vec::new();

        let lane = match self.free_lane() {
            Some(lane) => lane,
            None => {
                // No free lane means at least one bubble is alive
                let oldest = self.bubbles.remove(0);
                log::debug!("Evicting bubble {} from lane {}", oldest.id, oldest.lane);
                let lane = oldest.lane;
                evicted.push(oldest);
                lane
            }
        };

        let bubble = Bubble {
            id: self.next_id,
            item,
            is_good,
            lane,
            left: self.lane_left(lane),
            spawned_at_ms: now_ms,
            resolved: false,
        };
        self.next_id += 1;
        self.bubbles.push(bubble.clone());

        // Unreachable while max_live >= lanes; kept as a hard bound on the board
        while self.bubbles.len() > self.max_live {
            evicted.push(self.bubbles.remove(0));
        }

        SpawnReport { bubble, evicted }
    }

    /// Mark a bubble resolved; `None` if it is gone or was already resolved
    pub fn resolve(&mut self, id: u64) -> Option<&Bubble> {
        let bubble = self.bubbles.iter_mut().find(|b| b.id == id)?;
        if bubble.resolved {
            return None;
        }
        bubble.resolved = true;
        Some(bubble)
    }

    pub fn remove(&mut self, id: u64) -> Option<Bubble> {
        let index = self.bubbles.iter().position(|b| b.id == id)?;
        Some(self.bubbles.remove(index))
    }

    /// Drop every live bubble; ids keep increasing
    pub fn clear(&mut self) -> Vec<Bubble> {
        std::mem::take(&mut self.bubbles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner(lanes: usize) -> Spawner {
        Spawner::new(lanes, 10, 140.0, 10.0, 480.0)
    }

    fn item() -> Item {
        Item::new("Zinc", &["immunite"], "Minéral")
    }

    fn assert_distinct_lanes(s: &Spawner) {
        let lanes = s.occupied_lanes();
        let mut deduped = lanes.clone();
        deduped.dedup();
        assert_eq!(lanes, deduped, "lane collision");
    }

    #[test]
    fn test_fills_lowest_free_lane_first() {
        let mut s = spawner(3);
        let lanes: Vec<usize> = (0..3).map(|_| s.spawn(item(), true, 0).bubble.lane).collect();
        assert_eq!(lanes, vec![0, 1, 2]);

        // Free the middle lane
        s.remove(1);
        assert_eq!(s.spawn(item(), true, 0).bubble.lane, 1);
        assert_distinct_lanes(&s);
    }

    #[test]
    fn test_full_lanes_evict_oldest() {
        let mut s = spawner(3);
        for t in 0..3 {
            s.spawn(item(), true, t);
        }
        s.remove(0);
        s.spawn(item(), true, 3); // id 3 takes lane 0

        // Lanes full: oldest live bubble is id 1 in lane 1
        let report = s.spawn(item(), false, 4);
        assert_eq!(report.evicted.len(), 1);
        assert_eq!(report.evicted[0].id, 1);
        assert_eq!(report.bubble.lane, 1);
        assert_eq!(s.bubbles().len(), 3);
        assert_distinct_lanes(&s);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut s = spawner(2);
        let mut ids = Vec::new();
        for t in 0..10 {
            ids.push(s.spawn(item(), true, t).bubble.id);
            if t % 3 == 0 {
                s.clear();
            }
        }
        let mut sorted = ids.clone();
        sorted.dedup();
        assert_eq!(ids, sorted);
        assert_eq!(ids, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn test_lane_left_positions() {
        let s = spawner(3);
        assert_eq!(s.lane_left(0), 10.0);
        assert_eq!(s.lane_left(1), 180.0);
        assert_eq!(s.lane_left(2), 350.0);

        let single = spawner(1);
        assert_eq!(single.lane_left(0), 10.0);
    }

    #[test]
    fn test_area_width_changes_positions() {
        let mut s = spawner(2);
        s.set_area_width(340.0);
        assert_eq!(s.lane_left(1), 210.0);
        s.set_area_width(0.0); // ignored
        assert_eq!(s.lane_left(1), 210.0);
    }

    #[test]
    fn test_resolve_only_once() {
        let mut s = spawner(3);
        let id = s.spawn(item(), true, 0).bubble.id;
        assert!(s.resolve(id).is_some());
        assert!(s.resolve(id).is_none());
        assert!(s.resolve(99).is_none());
        assert!(s.get(id).unwrap().resolved);
    }

    #[test]
    fn test_cap_raised_to_lane_count() {
        let s = Spawner::new(4, 2, 140.0, 10.0, 480.0);
        assert_eq!(s.max_live, 4);
        let s = Spawner::new(3, 10, 140.0, 10.0, 480.0);
        assert_eq!(s.max_live, 10);
    }

    #[test]
    fn test_fall_progress_and_position() {
        let mut s = spawner(3);
        let bubble = s.spawn(item(), true, 1000).bubble;
        assert_eq!(bubble.fall_progress(1000, 6000), 0.0);
        assert_eq!(bubble.fall_progress(4000, 6000), 0.5);
        assert_eq!(bubble.fall_progress(9000, 6000), 1.0);
        assert_eq!(bubble.position(4000, 6000, 260.0), Vec2::new(10.0, 130.0));
    }
}
