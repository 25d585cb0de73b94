use super::BitVec;

#[test]
fn can_set_and_get_bits() {
    let mut bits = BitVec::new(10);

    bits.set(0, true);
    bits.set(9, true);
    bits.set(0, false);

    assert_eq!(bits.get(0), Some(false));
    assert_eq!(bits.get(9), Some(true));
    assert_eq!(bits.get(10), None);
    assert_eq!(bits.blocks.len(), 2);
}

#[test]
fn can_create_full_and_from_indices() {
    let full = BitVec::new_full(9);
    let some = BitVec::from_indices(9, &[1, 8]);

    assert_eq!(full.ones().count(), 9);
    assert_eq!(some.ones().collect::<Vec<_>>(), vec![1, 8]);
    assert_eq!(some.to_string(), "[010000001]");
}

parameterized_test! {can_check_subset, (left, right, expected), {
    can_check_subset_impl(left, right, expected);
}}

can_check_subset! {
    case01_empty_of_any: (vec![], vec![2], true),
    case02_same: (vec![1, 2], vec![1, 2], true),
    case03_proper: (vec![2], vec![1, 2, 11], true),
    case04_missing: (vec![1, 3], vec![1, 2], false),
    case05_missing_in_second_block: (vec![11], vec![1, 2], false),
}

fn can_check_subset_impl(left: Vec<usize>, right: Vec<usize>, expected: bool) {
    let left = BitVec::from_indices(12, &left);
    let right = BitVec::from_indices(12, &right);

    assert_eq!(left.is_subset(&right), expected);
}

#[test]
fn can_handle_empty_bitvec() {
    let bits = BitVec::new(0);

    assert!(bits.is_empty());
    assert!(bits.is_subset(&BitVec::new_full(0)));
    assert_eq!(bits.to_string(), "[]");
}
