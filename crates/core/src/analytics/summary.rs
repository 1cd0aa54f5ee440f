use std::collections::BTreeMap;

/// Picks the most used tag from `(name, entry_count)` pairs.
///
/// Ties go to the lexicographically smallest name so the answer does not
/// depend on storage order. Tags with a zero count are ignored.
pub fn pick_most_used_tag<I, S>(usage: I) -> Option<String>
where
    I: IntoIterator<Item = (S, u64)>,
    S: Into<String>,
{
    usage
        .into_iter()
        .map(|(name, count)| (name.into(), count))
        .filter(|(_, count)| *count > 0)
        .min_by(|(a_name, a_count), (b_name, b_count)| {
            b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
        })
        .map(|(name, _)| name)
}

/// Counts how many entries carry each tag name.
pub fn tag_usage<'a, I>(tag_lists: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    let mut usage = BTreeMap::new();
    for tags in tag_lists {
        for tag in tags {
            *usage.entry(tag.to_string()).or_default() += 1;
        }
    }
    usage
}
