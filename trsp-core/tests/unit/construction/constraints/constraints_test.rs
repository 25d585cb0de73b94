use super::*;
use crate::helpers::models::problem::*;
use crate::helpers::models::solution::*;
use crate::models::common::TimeWindow;
use crate::models::problem::{Instance, ResourceDimensions};

const FEASIBLE: FeasibilityState = FeasibilityState::FEASIBLE;
const SKIP: FeasibilityState = FeasibilityState::SKIP;
const STOP: FeasibilityState = FeasibilityState::STOP;

/// Nodes: 1 home, 2 a, 3 b, 4 d, 5 e, 6 g, 7 home duplicate.
fn create_time_window_instance() -> Arc<Instance> {
    let instance = test_instance_builder()
        .add_technician(test_technician("t0"))
        .add_requests(vec![
            test_request("a", 10.).time_window(TimeWindow::new(0., 15.)).service_time(3.),
            test_request("b", 50.).time_window(TimeWindow::new(0., 55.)),
            test_request("d", 40.).time_window(TimeWindow::new(0., 45.)),
            test_request("e", -3.),
            test_request("g", 14.).time_window(TimeWindow::new(0., 15.)),
        ])
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

/// Nodes: 1 and 2 homes, 3 request with a skill, 4 and 5 home duplicates, 6 and 7 depot duplicates.
fn create_skill_instance() -> Arc<Instance> {
    let instance = test_instance_builder()
        .dimensions(ResourceDimensions { skills: 1, tools: 0, spare_parts: 0 })
        .add_technician(test_technician("t0"))
        .add_technician(test_technician("t1").skills(&[0]))
        .add_request(test_request("r0", 10.).skills(&[0]))
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

parameterized_test! {can_check_time_windows, (pred, node, succ, mode, expected), {
    can_check_time_windows_impl(pred, node, succ, mode, expected);
}}

can_check_time_windows! {
    case01_successor_too_late: (Some(1), 5, Some(2), FeasibilityMode::Forward, SKIP),
    case02_successor_ignored: (Some(1), 5, Some(2), FeasibilityMode::Local, FEASIBLE),
    case03_node_too_late: (Some(2), 6, Some(3), FeasibilityMode::Forward, SKIP),
    case04_predecessor_too_late: (Some(3), 4, Some(7), FeasibilityMode::Forward, STOP),
    case05_arc_infeasible: (Some(3), 6, Some(7), FeasibilityMode::Forward, SKIP),
    case06_feasible: (Some(3), 5, Some(7), FeasibilityMode::Forward, FEASIBLE),
}

fn can_check_time_windows_impl(
    pred: Option<NodeId>,
    node: NodeId,
    succ: Option<NodeId>,
    mode: FeasibilityMode,
    expected: FeasibilityState,
) {
    let tour = create_test_tour(create_time_window_instance(), 0, &[2, 3]);

    let state = TimeWindowConstraint.check_insertion(&tour, pred, node, succ, mode);

    assert_eq!(state, expected);
}

parameterized_test! {can_keep_tour_bounds, (pred, succ, expected), {
    let tour = create_test_tour(create_time_window_instance(), 0, &[2]);

    let state = TourBoundsConstraint.check_insertion(&tour, pred, 3, succ, FeasibilityMode::Forward);

    assert_eq!(state, expected);
}}

can_keep_tour_bounds! {
    case01_after_tail: (Some(7), None, STOP),
    case02_before_head: (None, Some(1), SKIP),
    case03_inside: (Some(1), Some(2), FEASIBLE),
}

parameterized_test! {can_check_compatibility, (technician, node, expected), {
    let tour = create_test_solution(create_skill_instance()).tour(technician).clone();

    let state = CompatibilityConstraint.check_insertion(&tour, None, node, None, FeasibilityMode::Forward);

    assert_eq!(state, expected);
}}

can_check_compatibility! {
    case01_missing_skill: (0, 3, STOP),
    case02_has_skill: (1, 3, FEASIBLE),
    case03_own_depot_duplicate: (0, 6, FEASIBLE),
    case04_other_depot_duplicate: (0, 7, STOP),
    case05_other_home: (1, 1, STOP),
}

#[test]
fn can_check_tools_picked_up_at_depot() {
    let instance = create_rich_instance();
    let (home, depot_duplicate, request) = (1, 9, 3);
    let tour = create_test_tour(instance, 0, &[depot_duplicate]);

    let at_home = ToolsConstraint.check_insertion(&tour, Some(home), request, Some(depot_duplicate), FeasibilityMode::Forward);
    let after_depot = ToolsConstraint.check_insertion(&tour, Some(depot_duplicate), request, Some(8), FeasibilityMode::Forward);

    assert_eq!(at_home, SKIP);
    assert_eq!(after_depot, FEASIBLE);
}

parameterized_test! {can_check_spare_parts, (nodes, pred, node, succ, expected), {
    let nodes: &[NodeId] = nodes;
    let tour = create_test_tour(create_rich_instance(), 0, nodes);

    let state = SparePartsConstraint.check_insertion(&tour, pred, node, succ, FeasibilityMode::Forward);

    assert_eq!(state, expected);
}}

can_check_spare_parts! {
    case01_enough_for_node: (&[], Some(1), 3, Some(8), FEASIBLE),
    case02_not_enough_for_node: (&[], Some(1), 7, Some(8), SKIP),
    case03_not_enough_ahead: (&[5], Some(1), 3, Some(5), SKIP),
    case04_nothing_left: (&[5], Some(5), 3, Some(8), SKIP),
    case05_after_depot: (&[5, 9], Some(9), 3, Some(8), FEASIBLE),
    case06_depot_itself: (&[5], Some(5), 9, Some(8), FEASIBLE),
}

#[test]
fn can_combine_constraints() {
    let tour = create_test_tour(create_time_window_instance(), 0, &[2, 3]);
    let handler = TourConstraintHandler::default();

    assert_eq!(handler.check_insertion(&tour, Some(3), 4, Some(7), FeasibilityMode::Forward), STOP);
    assert_eq!(handler.check_insertion(&tour, Some(1), 5, Some(2), FeasibilityMode::Forward), SKIP);
    assert_eq!(handler.check_insertion(&tour, Some(7), 5, None, FeasibilityMode::Forward), STOP);
    assert!(handler.is_feasible(&tour, Some(1), 5, Some(2), FeasibilityMode::Local));
    assert!(handler.is_feasible(&tour, Some(3), 5, Some(7), FeasibilityMode::Forward));
}

struct PanickingConstraint;

impl ConstraintChecker for PanickingConstraint {
    fn check_insertion(&self, _: &Tour, _: Option<NodeId>, _: NodeId, _: Option<NodeId>, _: FeasibilityMode) -> FeasibilityState {
        unreachable!("constraint should not be called")
    }
}

#[test]
fn can_stop_checking_after_first_stop() {
    let tour = create_test_tour(create_time_window_instance(), 0, &[2]);
    let handler = TourConstraintHandler::new(vec![Arc::new(TourBoundsConstraint)]).add_constraint(Arc::new(PanickingConstraint));

    let state = handler.check_insertion(&tour, Some(7), 5, None, FeasibilityMode::Forward);

    assert_eq!(state, STOP);
}
