#[cfg(test)]
#[path = "../../../tests/unit/models/solution/tour_test.rs"]
mod tour_test;

use crate::algorithms::structures::BitVec;
use crate::models::common::{Cost, Duration, NodeId, Timestamp};
use crate::models::problem::{Instance, Technician};
use crate::models::solution::{CostDelegate, TourChange};
use crate::utils::{AdvisoryLock, GenericError, LockError, LockGuard, LockToken};
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// An error returned when a tour operation is called with arguments violating its contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TourError {
    /// The node is already in the tour.
    AlreadyVisited {
        /// Node id.
        node: NodeId,
    },
    /// The node is expected to be in the tour, but it is not.
    NotVisited {
        /// Node id.
        node: NodeId,
    },
    /// The main depot is visited using an id which does not belong to the tour's technician.
    WrongMainDepot {
        /// Node id.
        node: NodeId,
        /// The main depot id of the tour's technician.
        expected: NodeId,
    },
    /// The position is outside of the tour.
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Tour length.
        length: usize,
    },
}

impl Display for TourError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TourError::AlreadyVisited { node } => write!(f, "node {node} is already visited"),
            TourError::NotVisited { node } => write!(f, "node {node} is not visited"),
            TourError::WrongMainDepot { node, expected } => {
                write!(f, "main depot has to be visited as node {expected}, got {node}")
            }
            TourError::IndexOutOfRange { index, length } => {
                write!(f, "index {index} is out of range for tour with length {length}")
            }
        }
    }
}

impl std::error::Error for TourError {}

impl From<TourError> for GenericError {
    fn from(value: TourError) -> Self {
        value.to_string().into()
    }
}

/// Represents a technician's tour: an ordered sequence of visited nodes stored as a doubly linked list
/// over arrays indexed by node id.
///
/// Besides the links, the tour keeps derived per node state (arrival times, waiting, tools and spare parts)
/// which is propagated incrementally after each structural change while the tour is auto updated.
pub struct Tour {
    pub(super) instance: Arc<Instance>,
    pub(super) cost_delegate: Arc<dyn CostDelegate>,
    pub(super) technician: usize,

    pub(super) first: Option<NodeId>,
    pub(super) last: Option<NodeId>,
    pub(super) length: usize,
    pub(super) auto_updated: bool,

    pub(super) pred: Vec<Option<NodeId>>,
    pub(super) succ: Vec<Option<NodeId>>,

    pub(super) cumulative_cost: Vec<Cost>,
    pub(super) total_cost: Cost,

    pub(super) earliest_arrival: Vec<Timestamp>,
    pub(super) latest_arrival: Vec<Timestamp>,
    pub(super) waiting: Vec<Duration>,
    /// Waiting accumulated from the head up to the node (inclusive).
    pub(super) cumulative_waiting: Vec<Duration>,

    /// Tools available when arriving at the node.
    pub(super) tools: Vec<BitVec>,
    /// Spare parts available after serving the node, `max_id * parts` layout.
    pub(super) spare_parts: Vec<i32>,
    /// Spare parts required from the node (inclusive) up to the next main depot visit, `max_id * parts` layout.
    pub(super) required_spare_parts: Vec<i32>,
    pub(super) depot_visited: Vec<bool>,

    lock: Arc<AdvisoryLock>,
}

impl Tour {
    /// Creates a new empty tour for given technician.
    pub fn new(instance: Arc<Instance>, technician: usize, cost_delegate: Arc<dyn CostDelegate>) -> Self {
        assert!(technician < instance.fleet_size(), "unknown technician: {technician}");

        let size = instance.max_id();
        let dimensions = instance.dimensions();

        Self {
            technician,
            first: None,
            last: None,
            length: 0,
            auto_updated: true,
            pred: vec![None; size],
            succ: vec![None; size],
            cumulative_cost: vec![f64::NAN; size],
            total_cost: 0.,
            earliest_arrival: vec![f64::NAN; size],
            latest_arrival: vec![f64::NAN; size],
            waiting: vec![f64::NAN; size],
            cumulative_waiting: vec![f64::NAN; size],
            tools: vec![BitVec::new(dimensions.tools); size],
            spare_parts: vec![0; size * dimensions.spare_parts],
            required_spare_parts: vec![0; size * dimensions.spare_parts],
            depot_visited: vec![false; size],
            lock: Arc::new(AdvisoryLock::default()),
            instance,
            cost_delegate,
        }
    }

    /// Appends technician's home and home duplicate to an empty tour.
    pub fn initialize(&mut self) -> Result<(), TourError> {
        let technician = self.technician();
        let (home, home_duplicate) = (technician.home, technician.home_duplicate);

        self.append_node(home)?;
        self.append_node(home_duplicate)
    }

    /// Returns the instance.
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Returns the cost delegate used to evaluate the tour.
    pub fn cost_delegate(&self) -> &Arc<dyn CostDelegate> {
        &self.cost_delegate
    }

    /// Returns technician index.
    pub fn technician_id(&self) -> usize {
        self.technician
    }

    /// Returns the technician.
    pub fn technician(&self) -> &Technician {
        self.instance.technician(self.technician)
    }

    /// Returns the first node.
    pub fn first_node(&self) -> Option<NodeId> {
        self.first
    }

    /// Returns the last node.
    pub fn last_node(&self) -> Option<NodeId> {
        self.last
    }

    /// Returns amount of nodes in the tour.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Checks whether the tour has no nodes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the predecessor of the node.
    pub fn pred(&self, node: NodeId) -> Option<NodeId> {
        self.pred[node]
    }

    /// Returns the successor of the node.
    pub fn succ(&self, node: NodeId) -> Option<NodeId> {
        self.succ[node]
    }

    /// Checks whether the node belongs to the tour.
    pub fn is_visited(&self, node: NodeId) -> bool {
        self.pred[node].is_some() || self.succ[node].is_some() || self.first == Some(node)
    }

    /// Returns visited requests in tour order.
    pub fn requests(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().filter(|&node| self.instance.is_request(node))
    }

    /// Returns an iterator over nodes from the head to the tail.
    pub fn iter(&self) -> TourIter<'_> {
        TourIter { tour: self, cursor: self.first, reverse: false }
    }

    /// Returns an iterator over nodes starting from given node (inclusive) to the tail.
    pub fn iter_from(&self, node: NodeId) -> TourIter<'_> {
        TourIter { tour: self, cursor: self.is_visited(node).then_some(node), reverse: false }
    }

    /// Returns an iterator over nodes from the tail to the head.
    pub fn iter_rev(&self) -> TourIter<'_> {
        TourIter { tour: self, cursor: self.last, reverse: true }
    }

    /// Returns the node at given position, walks from the closest end of the tour.
    pub fn node_at(&self, index: usize) -> Result<NodeId, TourError> {
        if index >= self.length {
            return Err(TourError::IndexOutOfRange { index, length: self.length });
        }

        let node = if index <= self.length / 2 {
            self.iter().nth(index)
        } else {
            self.iter_rev().nth(self.length - 1 - index)
        };

        node.ok_or(TourError::IndexOutOfRange { index, length: self.length })
    }

    /// Returns position of the node in the tour.
    pub fn node_position(&self, node: NodeId) -> Option<usize> {
        if !self.is_visited(node) {
            return None;
        }

        self.iter().position(|current| current == node)
    }

    /// Checks whether the node can be added to the tour.
    pub fn check_node(&self, node: NodeId) -> Result<(), TourError> {
        if self.is_visited(node) {
            return Err(TourError::AlreadyVisited { node });
        }

        let expected = self.technician().main_depot_duplicate;
        if self.instance.is_main_depot(node) && node != expected {
            return Err(TourError::WrongMainDepot { node, expected });
        }

        Ok(())
    }

    /// Appends the node after the last node.
    pub fn append_node(&mut self, node: NodeId) -> Result<(), TourError> {
        self.check_node(node)?;

        let pred = self.last;
        self.link(pred, node, None);
        self.propagate_update(Some(node), Some(node), false);
        self.notify(TourChange::Inserted { pred, node, succ: None });

        Ok(())
    }

    /// Inserts the node after `pred`, `None` means at the head of the tour.
    pub fn insert_after(&mut self, pred: Option<NodeId>, node: NodeId) -> Result<(), TourError> {
        self.check_node(node)?;

        let succ = match pred {
            Some(pred) => {
                self.ensure_visited(pred)?;
                self.succ[pred]
            }
            None => self.first,
        };

        self.insert_between(pred, node, succ);

        Ok(())
    }

    /// Inserts the node before `succ`, `None` means after the last node.
    pub fn insert_before(&mut self, succ: Option<NodeId>, node: NodeId) -> Result<(), TourError> {
        self.check_node(node)?;

        let pred = match succ {
            Some(succ) => {
                self.ensure_visited(succ)?;
                self.pred[succ]
            }
            None => self.last,
        };

        self.insert_between(pred, node, succ);

        Ok(())
    }

    /// Removes the node from the tour. Returns whether the node had at least one neighbour.
    pub fn remove_node(&mut self, node: NodeId) -> Result<bool, TourError> {
        self.ensure_visited(node)?;

        let (pred, succ) = (self.pred[node], self.succ[node]);
        self.unlink(pred, succ);
        self.reset_node(node);
        self.length -= 1;

        self.propagate_removal(succ, pred);
        self.notify(TourChange::Removed { pred, node, succ });

        Ok(pred.is_some() || succ.is_some())
    }

    /// Replaces a visited node by another one keeping its neighbours.
    pub fn set_node(&mut self, old: NodeId, node: NodeId) -> Result<(), TourError> {
        self.ensure_visited(old)?;
        self.check_node(node)?;

        let (pred, succ) = (self.pred[old], self.succ[old]);
        self.reset_node(old);
        self.length -= 1;
        self.link(pred, node, succ);

        self.propagate_update(Some(node), Some(node), false);
        self.notify(TourChange::Replaced { pred, old, node, succ });

        Ok(())
    }

    /// Removes nodes at positions in `[start, end]` range and returns them in the former order.
    pub fn extract_subtour(&mut self, start: usize, end: usize) -> Result<Vec<NodeId>, TourError> {
        self.ensure_range(start, end)?;

        let first = self.node_at(start)?;
        let nodes = self.iter_from(first).take(end - start + 1).collect::<Vec<_>>();
        let last = nodes.last().copied().unwrap_or(first);
        let (pred, succ) = (self.pred[first], self.succ[last]);

        self.unlink(pred, succ);
        nodes.iter().for_each(|&node| self.reset_node(node));
        self.length -= nodes.len();

        self.propagate_removal(succ, pred);
        self.notify(TourChange::SubtourRemoved { pred, nodes: &nodes, succ });

        Ok(nodes)
    }

    /// Inserts nodes keeping their order so that the first of them takes given position.
    pub fn insert_nodes(&mut self, index: usize, nodes: &[NodeId]) -> Result<(), TourError> {
        if index > self.length {
            return Err(TourError::IndexOutOfRange { index, length: self.length });
        }

        let mut unique = FxHashSet::default();
        for &node in nodes {
            self.check_node(node)?;
            if !unique.insert(node) {
                return Err(TourError::AlreadyVisited { node });
            }
        }

        let (Some(&head), Some(&tail)) = (nodes.first(), nodes.last()) else {
            return Ok(());
        };

        let succ = if index == self.length { None } else { Some(self.node_at(index)?) };
        let pred = succ.map_or(self.last, |succ| self.pred[succ]);

        nodes.iter().fold(pred, |pred, &node| {
            self.link(pred, node, succ);
            Some(node)
        });

        self.propagate_segment(head, tail, nodes.len() + 1);
        self.notify(TourChange::BulkInserted { pred, nodes, succ });

        Ok(())
    }

    /// Reverses the order of nodes at positions in `[start, end]` range.
    pub fn reverse_subtour(&mut self, start: usize, end: usize) -> Result<(), TourError> {
        self.ensure_range(start, end)?;
        if start == end {
            return Ok(());
        }

        let first = self.node_at(start)?;
        let last = self.node_at(end)?;
        let (pred, succ) = (self.pred[first], self.succ[last]);

        let mut cursor = Some(first);
        while let Some(node) = cursor {
            cursor = if node == last { None } else { self.succ[node] };
            std::mem::swap(&mut self.pred[node], &mut self.succ[node]);
        }

        self.pred[last] = pred;
        self.succ[first] = succ;
        match pred {
            Some(pred) => self.succ[pred] = Some(last),
            None => self.first = Some(last),
        }
        match succ {
            Some(succ) => self.pred[succ] = Some(first),
            None => self.last = Some(first),
        }

        // all links inside the segment are changed, so every node of it has to be revisited
        let segment = end - start + 1;
        self.propagate_segment(last, first, segment + 1);
        self.notify(TourChange::SubtourReversed { pred, first, last, succ });

        Ok(())
    }

    /// Removes all nodes after the given one.
    pub fn truncate(&mut self, node: NodeId) -> Result<(), TourError> {
        self.ensure_visited(node)?;

        let removed = self.iter_from(node).skip(1).collect::<Vec<_>>();
        if removed.is_empty() {
            return Ok(());
        }

        removed.iter().for_each(|&removed| self.reset_node(removed));
        self.succ[node] = None;
        self.last = Some(node);
        self.length -= removed.len();

        self.propagate_removal(None, Some(node));
        self.notify(TourChange::SubtourRemoved { pred: Some(node), nodes: &removed, succ: None });

        Ok(())
    }

    /// Removes all nodes.
    pub fn clear(&mut self) {
        let nodes = self.iter().collect::<Vec<_>>();
        nodes.into_iter().for_each(|node| self.reset_node(node));

        self.first = None;
        self.last = None;
        self.length = 0;
        self.total_cost = 0.;

        self.notify(TourChange::Reset);
    }

    /// Checks whether derived state is propagated after each change.
    pub fn is_auto_updated(&self) -> bool {
        self.auto_updated
    }

    /// Sets auto update flag. Switching it on triggers full propagation and re-evaluation of the tour cost.
    pub fn set_auto_updated(&mut self, auto_updated: bool) {
        let was_auto_updated = self.auto_updated;
        self.auto_updated = auto_updated;

        if auto_updated && !was_auto_updated {
            self.propagate_update(None, None, true);
            let delegate = self.cost_delegate.clone();
            delegate.update_tour(self, None);
        }
    }

    /// Returns the total cost as evaluated by the cost delegate.
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// Sets the total cost, used by cost delegates.
    pub fn set_total_cost(&mut self, cost: Cost) {
        self.total_cost = cost;
    }

    /// Returns the cost accumulated from the head to the node.
    pub fn cumulative_cost(&self, node: NodeId) -> Cost {
        self.cumulative_cost[node]
    }

    /// Sets the cost accumulated from the head to the node, used by cost delegates.
    pub fn set_cumulative_cost(&mut self, node: NodeId, cost: Cost) {
        self.cumulative_cost[node] = cost;
    }

    /// Returns the earliest arrival time at the node.
    pub fn earliest_arrival_time(&self, node: NodeId) -> Timestamp {
        self.earliest_arrival[node]
    }

    /// Returns the earliest departure time from the node.
    pub fn earliest_departure_time(&self, node: NodeId) -> Timestamp {
        self.instance.time_window(node).earliest_start_of_service(self.earliest_arrival[node])
            + self.instance.service_time(node)
    }

    /// Returns the latest arrival time at the node which keeps the rest of the tour feasible.
    pub fn latest_feasible_arrival_time(&self, node: NodeId) -> Timestamp {
        self.latest_arrival[node]
    }

    /// Returns waiting time before the start of service at the node.
    pub fn waiting_time(&self, node: NodeId) -> Duration {
        self.waiting[node]
    }

    /// Returns waiting time accumulated at the nodes strictly between `from` and `to`, where `from`
    /// is visited before `to`.
    pub fn waiting_time_between(&self, from: NodeId, to: NodeId) -> Duration {
        match self.pred[to] {
            Some(pred) if from != to && pred != from => self.cumulative_waiting[pred] - self.cumulative_waiting[from],
            _ => 0.,
        }
    }

    /// Returns the time window violation at the earliest arrival.
    pub fn lateness(&self, node: NodeId) -> Duration {
        self.instance.time_window(node).lateness(self.earliest_arrival[node])
    }

    /// Returns the duration of the tour: from the arrival at the head to the departure from the tail.
    pub fn duration(&self) -> Duration {
        match (self.first, self.last) {
            (Some(first), Some(last)) => self.earliest_departure_time(last) - self.earliest_arrival[first],
            _ => 0.,
        }
    }

    /// Returns tools available when arriving at the node.
    pub fn available_tools(&self, node: NodeId) -> &BitVec {
        &self.tools[node]
    }

    /// Returns amount of spare parts of given type available after serving the node.
    pub fn available_spare_parts(&self, node: NodeId, part: usize) -> i32 {
        self.spare_parts[self.part_index(node, part)]
    }

    /// Returns amount of spare parts of given type required from the node up to the next main depot visit.
    pub fn required_spare_parts(&self, node: NodeId, part: usize) -> i32 {
        self.required_spare_parts[self.part_index(node, part)]
    }

    /// Checks whether the main depot is visited at the node or before it.
    pub fn is_main_depot_visited(&self, node: NodeId) -> bool {
        self.depot_visited[node]
    }

    /// Checks whether the technician lacks tools or spare parts to serve the tour without visiting the main depot.
    pub fn is_visit_to_main_depot_required(&self) -> bool {
        let Some(first) = self.first else {
            return false;
        };

        let technician = self.technician();
        let lacks_parts = technician
            .spare_parts
            .iter()
            .enumerate()
            .any(|(part, &available)| self.required_spare_parts(first, part) > available);

        lacks_parts || self.requests().any(|node| !self.instance.node(node).tools.is_subset(&self.tools[node]))
    }

    /// Tries to acquire the tour's advisory lock.
    pub fn try_lock(&self, token: LockToken, timeout: std::time::Duration) -> Result<LockGuard, LockError> {
        self.lock.try_acquire(token, timeout)
    }

    /// Returns the tour's advisory lock.
    pub fn lock(&self) -> &Arc<AdvisoryLock> {
        &self.lock
    }

    pub(super) fn part_index(&self, node: NodeId, part: usize) -> usize {
        node * self.instance.dimensions().spare_parts + part
    }

    fn insert_between(&mut self, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>) {
        self.link(pred, node, succ);
        self.propagate_update(Some(node), Some(node), false);
        self.notify(TourChange::Inserted { pred, node, succ });
    }

    fn link(&mut self, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>) {
        self.pred[node] = pred;
        self.succ[node] = succ;

        match pred {
            Some(pred) => self.succ[pred] = Some(node),
            None => self.first = Some(node),
        }

        match succ {
            Some(succ) => self.pred[succ] = Some(node),
            None => self.last = Some(node),
        }

        self.length += 1;
    }

    fn unlink(&mut self, pred: Option<NodeId>, succ: Option<NodeId>) {
        match pred {
            Some(pred) => self.succ[pred] = succ,
            None => self.first = succ,
        }

        match succ {
            Some(succ) => self.pred[succ] = pred,
            None => self.last = pred,
        }
    }

    fn reset_node(&mut self, node: NodeId) {
        self.pred[node] = None;
        self.succ[node] = None;
        self.cumulative_cost[node] = f64::NAN;
        self.earliest_arrival[node] = f64::NAN;
        self.latest_arrival[node] = f64::NAN;
        self.waiting[node] = f64::NAN;
        self.cumulative_waiting[node] = f64::NAN;
        self.tools[node] = BitVec::new(self.instance.dimensions().tools);
        self.depot_visited[node] = false;

        let parts = self.instance.dimensions().spare_parts;
        let start = node * parts;
        self.spare_parts[start..start + parts].fill(0);
        self.required_spare_parts[start..start + parts].fill(0);
    }

    fn ensure_visited(&self, node: NodeId) -> Result<(), TourError> {
        if self.is_visited(node) { Ok(()) } else { Err(TourError::NotVisited { node }) }
    }

    fn ensure_range(&self, start: usize, end: usize) -> Result<(), TourError> {
        if end >= self.length {
            Err(TourError::IndexOutOfRange { index: end, length: self.length })
        } else if start > end {
            Err(TourError::IndexOutOfRange { index: start, length: end + 1 })
        } else {
            Ok(())
        }
    }

    fn notify(&mut self, change: TourChange) {
        let delegate = self.cost_delegate.clone();
        delegate.on_change(self, &change);
    }
}

impl Clone for Tour {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
            cost_delegate: self.cost_delegate.clone(),
            technician: self.technician,
            first: self.first,
            last: self.last,
            length: self.length,
            auto_updated: self.auto_updated,
            pred: self.pred.clone(),
            succ: self.succ.clone(),
            cumulative_cost: self.cumulative_cost.clone(),
            total_cost: self.total_cost,
            earliest_arrival: self.earliest_arrival.clone(),
            latest_arrival: self.latest_arrival.clone(),
            waiting: self.waiting.clone(),
            cumulative_waiting: self.cumulative_waiting.clone(),
            tools: self.tools.clone(),
            spare_parts: self.spare_parts.clone(),
            required_spare_parts: self.required_spare_parts.clone(),
            depot_visited: self.depot_visited.clone(),
            lock: Arc::new(AdvisoryLock::default()),
        }
    }
}

impl Display for Tour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}: <", self.technician)?;
        for (idx, node) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, "> cost={}", self.total_cost)
    }
}

/// Iterates over tour nodes following successor or predecessor links.
pub struct TourIter<'a> {
    tour: &'a Tour,
    cursor: Option<NodeId>,
    reverse: bool,
}

impl Iterator for TourIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = if self.reverse { self.tour.pred[current] } else { self.tour.succ[current] };

        Some(current)
    }
}
