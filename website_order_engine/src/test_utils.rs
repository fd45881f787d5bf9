//! Helpers shared by the unit tests.

/// Every ordering of `items`, including orderings that only differ in the positions of equal elements.
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            result.push(tail);
        }
    }
    result
}

#[test]
fn permutation_counts() {
    assert_eq!(permutations::<u8>(&[]).len(), 1);
    assert_eq!(permutations(&[1, 2, 3]).len(), 6);
    assert_eq!(permutations(&[1, 2, 3, 4, 5]).len(), 120);
    assert!(permutations(&[1, 2, 3]).contains(&vec![3, 1, 2]));
}
