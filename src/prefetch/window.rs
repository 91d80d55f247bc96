use std::collections::HashSet;

/// Indices within `radius` of `position`, wrapped into `[0, length)`.
///
/// Ordered by offset from `-radius` to `+radius` with repeats removed, so short lists
/// never yield the same index twice.
pub fn compute_window(position: usize, length: usize, radius: usize) -> Vec<usize> {
    if length == 0 {
        return Vec::new();
    }

    let length = length as i64;
    let position = position as i64 % length;
    let radius = (radius as i64).min(length);

    let mut seen = HashSet::new();
    (-radius..=radius)
        .map(|offset| (position + offset).rem_euclid(length) as usize)
        .filter(|index| seen.insert(*index))
        .collect()
}
