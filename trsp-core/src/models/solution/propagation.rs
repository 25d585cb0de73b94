#[cfg(test)]
#[path = "../../../tests/unit/models/solution/propagation_test.rs"]
mod propagation_test;

use crate::algorithms::structures::BitVec;
use crate::models::common::{NodeId, UNLIMITED_SPARE_PARTS};
use crate::models::solution::Tour;
use crate::utils::is_same_float;

/// A minimum amount of nodes visited by a sweep: the start node has new links, so its neighbour
/// is always revisited even if the start node's own value is the same as before.
const MIN_VISITS: usize = 2;

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

type NodeUpdate = fn(&mut Tour, NodeId) -> bool;

impl Tour {
    /// Propagates derived state: forward sweeps (arrival, waiting, tools, spare parts, main depot flag)
    /// start at `fwd_from` (the head by default), backward sweeps (latest arrival, required spare parts)
    /// start at `bwd_from` (the tail by default).
    ///
    /// Each sweep advances to the next node only while the recomputed value differs from the cached one,
    /// unless `force` is set. Does nothing if the tour is not auto updated.
    pub fn propagate_update(&mut self, fwd_from: Option<NodeId>, bwd_from: Option<NodeId>, force: bool) {
        if !self.auto_updated {
            return;
        }

        self.propagate(fwd_from.or(self.first), bwd_from.or(self.last), force, MIN_VISITS);
    }

    /// Propagates derived state around a point where nodes were removed: a missing side means there are no
    /// nodes to update in that direction, so no sweep starts from the tour end there.
    pub(super) fn propagate_removal(&mut self, fwd_from: Option<NodeId>, bwd_from: Option<NodeId>) {
        if !self.auto_updated {
            return;
        }

        self.propagate(fwd_from, bwd_from, false, MIN_VISITS);
    }

    /// Propagates derived state after a change of a contiguous segment: at least `min_visits` nodes are
    /// recomputed in each direction before the early exit applies.
    pub(super) fn propagate_segment(&mut self, fwd_from: NodeId, bwd_from: NodeId, min_visits: usize) {
        if !self.auto_updated {
            return;
        }

        self.propagate(Some(fwd_from), Some(bwd_from), false, min_visits.max(MIN_VISITS));
    }

    fn propagate(&mut self, fwd_from: Option<NodeId>, bwd_from: Option<NodeId>, force: bool, min_visits: usize) {
        if let Some(start) = fwd_from {
            let visited = self.sweep(start, Direction::Forward, force, min_visits, Self::update_arrival);
            // waiting depends on arrival times, so it covers at least the nodes where arrival was recomputed
            self.sweep(start, Direction::Forward, force, visited.max(min_visits), Self::update_waiting);
            self.sweep(start, Direction::Forward, force, min_visits, Self::update_tools);
            self.sweep(start, Direction::Forward, force, min_visits, Self::update_spare_parts);
            self.sweep(start, Direction::Forward, force, min_visits, Self::update_depot_visited);
        }

        if let Some(start) = bwd_from {
            self.sweep(start, Direction::Backward, force, min_visits, Self::update_latest_arrival);
            self.sweep(start, Direction::Backward, force, min_visits, Self::update_required_spare_parts);
        }
    }

    fn sweep(&mut self, start: NodeId, direction: Direction, force: bool, min_visits: usize, update: NodeUpdate) -> usize {
        let mut cursor = Some(start);
        let mut visited = 0;

        while let Some(node) = cursor {
            let changed = update(self, node);
            visited += 1;

            if !(force || changed || visited < min_visits) {
                break;
            }

            cursor = match direction {
                Direction::Forward => self.succ[node],
                Direction::Backward => self.pred[node],
            };
        }

        visited
    }

    fn update_arrival(&mut self, node: NodeId) -> bool {
        let value = match self.pred[node] {
            Some(pred) => self.instance.arrival_time(node, pred, self.earliest_arrival[pred], self.technician),
            None => self.instance.time_window(self.technician().home).start,
        };

        let changed = !is_same_float(self.earliest_arrival[node], value);
        self.earliest_arrival[node] = value;

        changed
    }

    fn update_waiting(&mut self, node: NodeId) -> bool {
        let waiting = self.instance.time_window(node).waiting(self.earliest_arrival[node]);
        let cumulative = waiting + self.pred[node].map_or(0., |pred| self.cumulative_waiting[pred]);

        let changed =
            !is_same_float(self.waiting[node], waiting) || !is_same_float(self.cumulative_waiting[node], cumulative);
        self.waiting[node] = waiting;
        self.cumulative_waiting[node] = cumulative;

        changed
    }

    fn update_tools(&mut self, node: NodeId) -> bool {
        let value = if self.instance.is_main_depot(node) {
            BitVec::new_full(self.instance.dimensions().tools)
        } else {
            match self.pred[node] {
                Some(pred) => self.tools[pred].clone(),
                None => self.technician().tools.clone(),
            }
        };

        let changed = self.tools[node] != value;
        self.tools[node] = value;

        changed
    }

    fn update_spare_parts(&mut self, node: NodeId) -> bool {
        let is_main_depot = self.instance.is_main_depot(node);
        let mut changed = false;

        for part in 0..self.instance.dimensions().spare_parts {
            let value = if is_main_depot {
                UNLIMITED_SPARE_PARTS
            } else {
                let available = match self.pred[node] {
                    Some(pred) => self.available_spare_parts(pred, part),
                    None => self.technician().spare_parts[part],
                };

                if available == UNLIMITED_SPARE_PARTS {
                    UNLIMITED_SPARE_PARTS
                } else {
                    available - self.instance.spare_part_requirement(node, part)
                }
            };

            let index = self.part_index(node, part);
            changed |= self.spare_parts[index] != value;
            self.spare_parts[index] = value;
        }

        changed
    }

    fn update_depot_visited(&mut self, node: NodeId) -> bool {
        let value = self.instance.is_main_depot(node) || self.pred[node].is_some_and(|pred| self.depot_visited[pred]);

        let changed = self.depot_visited[node] != value;
        self.depot_visited[node] = value;

        changed
    }

    fn update_latest_arrival(&mut self, node: NodeId) -> bool {
        let end = self.instance.time_window(node).end;
        let value = match self.succ[node] {
            Some(succ) => end.min(
                self.latest_arrival[succ]
                    - self.instance.service_time(node)
                    - self.instance.travel_time(node, succ, self.technician),
            ),
            None => end,
        };

        let changed = !is_same_float(self.latest_arrival[node], value);
        self.latest_arrival[node] = value;

        changed
    }

    fn update_required_spare_parts(&mut self, node: NodeId) -> bool {
        let is_main_depot = self.instance.is_main_depot(node);
        let mut changed = false;

        for part in 0..self.instance.dimensions().spare_parts {
            let value = if is_main_depot {
                0
            } else {
                self.instance.spare_part_requirement(node, part)
                    + self.succ[node].map_or(0, |succ| self.required_spare_parts(succ, part))
            };

            let index = self.part_index(node, part);
            changed |= self.required_spare_parts[index] != value;
            self.required_spare_parts[index] = value;
        }

        changed
    }
}
