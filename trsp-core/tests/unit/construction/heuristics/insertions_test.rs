use super::*;
use crate::construction::constraints::TourConstraintHandler;
use crate::construction::costs::DistanceDelegate;
use crate::helpers::models::problem::*;
use crate::helpers::models::solution::*;
use crate::models::common::{Location, TimeWindow};
use crate::models::problem::{Instance, InstanceBuilder, RequestBuilder, ResourceDimensions};
use std::sync::Arc;

/// Nodes: 1 home, 2 at 10, 3 at 30, 4 at 20, 5 home duplicate.
fn create_tour(nodes: &[NodeId]) -> Tour {
    create_test_tour(create_line_instance(&[10., 30., 20.]), 0, nodes)
}

fn find_best_insertion(node: NodeId, tour: &Tour, mode: FeasibilityMode) -> InsertionMove {
    best_insertion(node, tour, &DistanceDelegate, &TourConstraintHandler::default(), mode)
}

/// Nodes: 1 home, 2 with tight window, 3 with tight window, 4 home duplicate.
fn create_tight_instance() -> Arc<Instance> {
    let instance = test_instance_builder()
        .add_technician(test_technician("t0"))
        .add_request(test_request("a", 10.).time_window(TimeWindow::new(0., 15.)).service_time(3.))
        .add_request(test_request("g", 14.).time_window(TimeWindow::new(0., 15.)))
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

#[test]
fn can_find_cheapest_position() {
    let tour = create_tour(&[2, 3]);

    let insertion = find_best_insertion(4, &tour, FeasibilityMode::Forward);

    assert_eq!(insertion, InsertionMove::new(4, 0, Some(2), Some(3), 0.));
}

#[test]
fn can_keep_earliest_position_among_equal() {
    let tour = create_tour(&[2]);

    let insertion = find_best_insertion(4, &tour, FeasibilityMode::Forward);

    assert_eq!(insertion.pred, Some(1));
    assert_eq!(insertion.succ, Some(2));
    assert_eq!(insertion.cost, 20.);
}

#[test]
fn can_return_infeasible_for_visited_node() {
    let tour = create_tour(&[2, 3]);

    let insertion = find_best_insertion(3, &tour, FeasibilityMode::Forward);

    assert_eq!(insertion, InsertionMove::infeasible(3, 0));
    assert!(insertion.cost.is_infinite());
}

#[test]
fn can_return_infeasible_for_incompatible_node() {
    let instance = test_instance_builder()
        .dimensions(ResourceDimensions { skills: 1, tools: 0, spare_parts: 0 })
        .add_technician(test_technician("t0"))
        .add_technician(test_technician("t1").skills(&[0]))
        .add_request(test_request("r0", 10.).skills(&[0]))
        .build()
        .expect("cannot build instance");
    let solution = create_test_solution(Arc::new(instance));

    assert!(!find_best_insertion(3, solution.tour(0), FeasibilityMode::Forward).feasible);
    assert_eq!(find_best_insertion(3, solution.tour(1), FeasibilityMode::Forward).pred, Some(2));
}

#[test]
fn can_use_feasibility_mode() {
    let tour = create_test_tour(create_tight_instance(), 0, &[2]);

    let forward = find_best_insertion(3, &tour, FeasibilityMode::Forward);
    let local = find_best_insertion(3, &tour, FeasibilityMode::Local);

    assert!(!forward.feasible);
    assert_eq!(local, InsertionMove::new(3, 0, Some(1), Some(2), 8.));
}

#[test]
fn can_use_insertion_cost_of_delegate() {
    struct FlatDelegate;
    impl CostDelegate for FlatDelegate {
        fn evaluate_tour(&self, _: &Tour) -> Cost {
            0.
        }
        fn update_tour(&self, _: &mut Tour, _: Option<NodeId>) -> Cost {
            0.
        }
        fn evaluate_detour(&self, _: &Tour, _: Option<NodeId>, _: NodeId, succ: Option<NodeId>, _: bool) -> Cost {
            if succ == Some(5) { 1. } else { 2. }
        }
    }
    let tour = create_tour(&[2, 3]);

    let insertion = best_insertion(4, &tour, &FlatDelegate, &TourConstraintHandler::default(), FeasibilityMode::Forward);

    assert_eq!(insertion, InsertionMove::new(4, 0, Some(3), Some(5), 1.));
}

#[test]
fn can_execute_move() {
    let mut tour = create_tour(&[2, 3]);
    let insertion = find_best_insertion(4, &tour, FeasibilityMode::Forward);

    insertion.execute(&mut tour).expect("cannot execute");

    assert_eq!(get_tour_nodes(&tour), vec![1, 2, 4, 3, 5]);
    assert_eq!(tour.total_cost(), 60.);
    assert!(!insertion.is_applicable(&tour));
    assert_tour_state(&tour);
}

parameterized_test! {can_reject_move_execution, (insertion, expected), {
    let mut tour = create_tour(&[3]);
    let before = get_tour_nodes(&tour);

    let result = insertion.execute(&mut tour);

    assert_eq!(result, Err(expected));
    assert_eq!(get_tour_nodes(&tour), before);
}}

can_reject_move_execution! {
    case01_infeasible: (InsertionMove::infeasible(2, 0), MoveError::Infeasible),
    case02_wrong_tour: (InsertionMove::new(2, 1, Some(1), Some(3), 0.), MoveError::WrongTour { expected: 1, actual: 0 }),
    case03_not_visited_pred: (InsertionMove::new(4, 0, Some(2), Some(3), 0.), MoveError::Stale { pred: Some(2), succ: Some(3) }),
    case04_not_adjacent: (InsertionMove::new(4, 0, Some(1), Some(5), 0.), MoveError::Stale { pred: Some(1), succ: Some(5) }),
    case05_head_changed: (InsertionMove::new(4, 0, None, Some(3), 0.), MoveError::Stale { pred: None, succ: Some(3) }),
    case06_visited: (InsertionMove::new(3, 0, Some(1), Some(3), 0.), MoveError::Tour(TourError::AlreadyVisited { node: 3 })),
    case07_depot_after_pred: (InsertionMove::new_with_depot_trip(2, 0, Some(1), Some(3), 3, 0.), MoveError::Stale { pred: Some(1), succ: Some(3) }),
}

#[test]
fn can_display_move_and_errors() {
    let insertion = InsertionMove::new(4, 0, Some(2), None, 1.5);
    let wrong_tour = MoveError::WrongTour { expected: 1, actual: 0 };
    let error: GenericError = MoveError::Tour(TourError::NotVisited { node: 2 }).into();

    assert_eq!(insertion.to_string(), "ins(4 in t0: Some(2) -> None, cost=1.5, feasible=true)");
    assert_eq!(
        InsertionMove::new_with_depot_trip(2, 0, Some(1), Some(4), 2, 40.).to_string(),
        "ins(2 in t0: Some(1) -> Some(4), depot before 2, cost=40, feasible=true)"
    );
    assert_eq!(wrong_tour.to_string(), "move for technician 1 is applied to tour of technician 0");
    assert_eq!(error.to_string(), "node 2 is not visited");
}

parameterized_test! {can_plan_depot_trip_when_resources_are_missing, (node, expected_cost), {
    let mut tour = create_test_tour(create_depot_trip_instance(), 0, &[]);

    let insertion = find_best_insertion(node, &tour, FeasibilityMode::Forward);

    assert_eq!(insertion, InsertionMove::new_with_depot_trip(node, 0, Some(1), Some(4), node, expected_cost));
    assert_eq!(DistanceDelegate.evaluate_move(&tour, &insertion), expected_cost);

    insertion.execute(&mut tour).expect("cannot execute");

    assert_eq!(get_tour_nodes(&tour), vec![1, 5, node, 4]);
    assert_eq!(tour.total_cost(), expected_cost);
    assert!(tour.is_main_depot_visited(node));
    assert_tour_state(&tour);
}}

can_plan_depot_trip_when_resources_are_missing! {
    case01_tool: (2, 40.),
    case02_spare_part: (3, 60.),
}

#[test]
fn can_insert_without_depot_trip_when_depot_is_visited() {
    let instance = create_depot_trip_instance();
    let tour = create_test_tour(instance, 0, &[5, 2]);

    let insertion = find_best_insertion(3, &tour, FeasibilityMode::Forward);

    assert!(!insertion.is_depot_trip());
    assert_eq!(insertion, InsertionMove::new(3, 0, Some(5), Some(2), 20.));
}

/// Nodes: main depot at (10, 0), 1 home, 2 plain request at (20, 0), 3 request at (30, 10) which needs a
/// spare part, 4 home duplicate, 5 main depot duplicate.
fn create_depot_before_pred_instance() -> Arc<Instance> {
    let instance = InstanceBuilder::default()
        .main_depot(Location::new(10., 0.), TimeWindow::new(0., 1000.))
        .dimensions(ResourceDimensions { skills: 0, tools: 0, spare_parts: 1 })
        .add_technician(test_technician("t0").spare_parts(&[0]))
        .add_request(test_request("plain", 20.).spare_parts(&[0]))
        .add_request(RequestBuilder::new("needs_part").location(Location::new(30., 10.)).spare_parts(&[1]))
        .build()
        .expect("cannot build instance");

    Arc::new(instance)
}

#[test]
fn can_plan_depot_trip_before_predecessor() {
    let mut tour = create_test_tour(create_depot_before_pred_instance(), 0, &[2]);
    let expected_cost = 200_f64.sqrt() + 1000_f64.sqrt() - 20.;

    let insertion = find_best_insertion(3, &tour, FeasibilityMode::Forward);

    assert_eq!((insertion.pred, insertion.succ, insertion.depot_succ), (Some(2), Some(4), Some(2)));
    assert_float_eq!(insertion.cost, expected_cost);
    assert_eq!(insertion.depot_position(&tour), Some((Some(1), Some(2))));
    assert_float_eq!(DistanceDelegate.evaluate_move(&tour, &insertion), expected_cost);

    insertion.execute(&mut tour).expect("cannot execute");

    assert_eq!(get_tour_nodes(&tour), vec![1, 5, 2, 3, 4]);
    assert_float_eq!(tour.total_cost(), 40. + expected_cost);
    assert_tour_state(&tour);
}
