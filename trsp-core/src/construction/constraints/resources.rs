use super::*;
use crate::models::common::UNLIMITED_SPARE_PARTS;

/// Checks that tools required by the node are available at the position: carried by the technician from
/// the start or picked up at the main depot earlier in the tour.
#[derive(Clone, Debug, Default)]
pub struct ToolsConstraint;

impl ConstraintChecker for ToolsConstraint {
    fn check_insertion(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, _: Option<NodeId>, _: FeasibilityMode) -> FeasibilityState {
        let required = &tour.instance().node(node).tools;
        let available = match pred {
            Some(pred) => tour.available_tools(pred),
            None => &tour.technician().tools,
        };

        if required.is_subset(available) { FeasibilityState::FEASIBLE } else { FeasibilityState::SKIP }
    }
}

/// Checks that spare parts left after serving the inserted node cover the demand of the following nodes
/// up to the next main depot visit.
#[derive(Clone, Debug, Default)]
pub struct SparePartsConstraint;

impl ConstraintChecker for SparePartsConstraint {
    fn check_insertion(
        &self,
        tour: &Tour,
        pred: Option<NodeId>,
        node: NodeId,
        succ: Option<NodeId>,
        _: FeasibilityMode,
    ) -> FeasibilityState {
        let instance = tour.instance();

        let is_feasible = (0..instance.dimensions().spare_parts).all(|part| {
            let available = match pred {
                Some(pred) => tour.available_spare_parts(pred, part),
                None => tour.technician().spare_parts[part],
            };

            if available == UNLIMITED_SPARE_PARTS || instance.is_main_depot(node) {
                return true;
            }

            let required_ahead = succ.map_or(0, |succ| tour.required_spare_parts(succ, part));

            available - instance.spare_part_requirement(node, part) >= required_ahead
        });

        if is_feasible { FeasibilityState::FEASIBLE } else { FeasibilityState::SKIP }
    }
}
