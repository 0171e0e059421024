//! Plurality tally.

/// Return the first item whose count is strictly greater than every count
/// before it, together with that count.
///
/// Later items that only *equal* the running maximum never replace it, so on
/// a tie the earliest item in iteration order wins. Items with a count of
/// zero can never win; an empty or all-zero input yields `None`.
pub fn first_max<T, I>(items: I) -> Option<(T, u64)>
where
    I: IntoIterator<Item = (T, u64)>,
{
    let mut best: Option<(T, u64)> = None;
    for (item, count) in items {
        let current = best.as_ref().map_or(0, |(_, c)| *c);
        if count > current {
            best = Some((item, count));
        }
    }
    best
}
