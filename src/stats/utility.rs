use std::collections::BTreeMap;

/// Counts occurrences of each distinct value.
pub fn frequencies<T: Ord>(values: impl IntoIterator<Item = T>) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

/// Every value that attains the highest frequency, in ascending order.
/// Returns an empty vector for empty input.
pub fn modes<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let counts = frequencies(values);
    let Some(&max) = counts.values().max() else {
        return Vec::new();
    };
    counts
        .into_iter()
        .filter(|(_, n)| *n == max)
        .map(|(v, _)| v)
        .collect()
}

/// The most frequent value; ties go to the smallest value.
pub fn mode<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<T> {
    modes(values).into_iter().next()
}

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
