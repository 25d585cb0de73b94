use crate::construction::heuristics::{InsertionMove, with_depot_visit};
use crate::models::common::{Cost, NodeId};
use crate::models::solution::Tour;

/// Describes a structural change of the tour which is reported to the cost delegate.
#[derive(Clone, Debug, PartialEq)]
pub enum TourChange<'a> {
    /// A node was inserted between two nodes.
    Inserted {
        /// Predecessor of the inserted node.
        pred: Option<NodeId>,
        /// Inserted node.
        node: NodeId,
        /// Successor of the inserted node.
        succ: Option<NodeId>,
    },
    /// A node was removed from between two nodes.
    Removed {
        /// Former predecessor of the removed node.
        pred: Option<NodeId>,
        /// Removed node.
        node: NodeId,
        /// Former successor of the removed node.
        succ: Option<NodeId>,
    },
    /// A node was replaced by another one.
    Replaced {
        /// Predecessor of both nodes.
        pred: Option<NodeId>,
        /// The node which left the tour.
        old: NodeId,
        /// The node which took its place.
        node: NodeId,
        /// Successor of both nodes.
        succ: Option<NodeId>,
    },
    /// A contiguous sequence of nodes was removed.
    SubtourRemoved {
        /// Former predecessor of the sequence.
        pred: Option<NodeId>,
        /// Removed nodes in their former order.
        nodes: &'a [NodeId],
        /// Former successor of the sequence.
        succ: Option<NodeId>,
    },
    /// A contiguous sequence of nodes was reversed, `first` and `last` refer to the order before the reversal.
    SubtourReversed {
        /// Predecessor of the sequence.
        pred: Option<NodeId>,
        /// First node of the sequence before reversal.
        first: NodeId,
        /// Last node of the sequence before reversal.
        last: NodeId,
        /// Successor of the sequence.
        succ: Option<NodeId>,
    },
    /// A contiguous sequence of nodes was inserted.
    BulkInserted {
        /// Predecessor of the sequence.
        pred: Option<NodeId>,
        /// Inserted nodes in their new order.
        nodes: &'a [NodeId],
        /// Successor of the sequence.
        succ: Option<NodeId>,
    },
    /// The whole tour has to be re-evaluated.
    Reset,
}

impl TourChange<'_> {
    /// Returns the node from which cumulative values have to be recomputed: `None` means from the tour head.
    pub fn update_from(&self) -> Option<NodeId> {
        match self {
            TourChange::Inserted { pred, node, .. } => pred.or(Some(*node)),
            TourChange::Removed { pred, succ, .. } => pred.or(*succ),
            TourChange::Replaced { pred, node, .. } => pred.or(Some(*node)),
            TourChange::SubtourRemoved { pred, succ, .. } => pred.or(*succ),
            TourChange::SubtourReversed { pred, last, .. } => pred.or(Some(*last)),
            TourChange::BulkInserted { pred, nodes, succ } => pred.or(nodes.first().copied()).or(*succ),
            TourChange::Reset => None,
        }
    }
}

/// A pluggable objective function: evaluates tours and moves and keeps cumulative costs of the tour up to date.
///
/// Every structural change of an auto updated tour is reported exactly once through [CostDelegate::on_change].
pub trait CostDelegate: Send + Sync {
    /// Evaluates the tour from scratch without modifying it.
    fn evaluate_tour(&self, tour: &Tour) -> Cost;

    /// Recomputes cumulative costs starting from given node (from the head if `None`), stores the total
    /// cost in the tour and returns it.
    fn update_tour(&self, tour: &mut Tour, from: Option<NodeId>) -> Cost;

    /// Evaluates the cost difference caused by inserting `node` between `pred` and `succ`, or removing it
    /// from there when `is_removal` is set. The node does not have to be reflected in the cached values.
    fn evaluate_detour(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>, is_removal: bool) -> Cost;

    /// Returns the marginal cost of inserting `node` between `pred` and `succ`.
    fn insertion_cost(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>) -> Cost {
        self.evaluate_detour(tour, pred, node, succ, false)
    }

    /// Evaluates the insertion move against the current state of its tour, a planned main depot trip
    /// is included. Returns infinity if the depot cannot be inserted at its position.
    fn evaluate_move(&self, tour: &Tour, insertion: &InsertionMove) -> Cost {
        let Some((depot_pred, depot_succ)) = insertion.depot_position(tour) else {
            return self.insertion_cost(tour, insertion.pred, insertion.node, insertion.succ);
        };

        let depot = tour.technician().main_depot_duplicate;
        let Some(with_depot) = with_depot_visit(tour, depot_pred) else {
            return Cost::INFINITY;
        };
        let pred = if insertion.depot_succ == Some(insertion.node) { Some(depot) } else { insertion.pred };

        self.insertion_cost(tour, depot_pred, depot, depot_succ) + self.insertion_cost(&with_depot, pred, insertion.node, insertion.succ)
    }

    /// Receives a structural change notification, updates cached costs of auto updated tours.
    fn on_change(&self, tour: &mut Tour, change: &TourChange) {
        if tour.is_auto_updated() {
            self.update_tour(tour, change.update_from());
        }
    }
}
