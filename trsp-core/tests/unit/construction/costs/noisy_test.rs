use super::*;
use crate::construction::costs::DistanceDelegate;
use crate::helpers::models::problem::*;
use crate::helpers::models::solution::*;
use crate::helpers::utils::FakeRandom;

fn create_delegate(hit: bool) -> NoisyCostDelegate {
    let random = Arc::new(FakeRandom { real: 2., hit });

    NoisyCostDelegate::new(Arc::new(DistanceDelegate), Noise::new_with_ratio(0.5, (0.5, 2.), random))
}

parameterized_test! {can_add_noise_to_insertion_cost, (hit, pred, succ, expected), {
    can_add_noise_to_insertion_cost_impl(hit, pred, succ, expected);
}}

can_add_noise_to_insertion_cost! {
    case01_hit: (true, Some(2), Some(5), 40.),
    case02_miss: (false, Some(2), Some(5), 20.),
    case03_zero_cost_hit: (true, None, None, 2.),
    case04_zero_cost_miss: (false, None, None, 0.),
}

fn can_add_noise_to_insertion_cost_impl(hit: bool, pred: Option<NodeId>, succ: Option<NodeId>, expected: f64) {
    let tour = create_test_tour(create_line_instance(&[10., 20., 30.]), 0, &[2]);

    let cost = create_delegate(hit).insertion_cost(&tour, pred, 3, succ);

    assert_eq!(cost, expected);
}

#[test]
fn can_keep_tour_costs_without_noise() {
    let delegate = Arc::new(create_delegate(true));
    let mut tour = create_test_tour_with_delegate(create_line_instance(&[10., 20., 30.]), 0, &[2], delegate.clone());

    tour.insert_after(Some(2), 3).expect("cannot insert");

    assert_eq!(delegate.evaluate_tour(&tour), 40.);
    assert_eq!(tour.total_cost(), 40.);
    assert_eq!(delegate.evaluate_detour(&tour, Some(2), 4, Some(5), false), 40.);
}
