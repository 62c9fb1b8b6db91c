//! Closest-name suggestions for unresolved references

use crate::validation::ValidationOptions;

/// Levenshtein distance between two strings, by character
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Distance of a candidate to the target, also comparing the part after the
/// last `.` so `unemployed` still finds `us_employment.unemployed`
fn score(target: &str, candidate: &str) -> usize {
    let full = edit_distance(target, candidate);
    let short_target = target.rsplit('.').next().unwrap_or(target);
    let short_candidate = candidate.rsplit('.').next().unwrap_or(candidate);
    full.min(edit_distance(short_target, short_candidate))
}

/// Candidates within `max_edit_distance` of `target`, closest first
///
/// Ties keep the candidates' input order. At most `max_suggestions` names are
/// returned.
pub fn closest_names<'a, I>(target: &str, candidates: I, options: &ValidationOptions) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(usize, usize, &str)> = candidates
        .into_iter()
        .enumerate()
        .map(|(order, c)| (score(target, c), order, c))
        .filter(|(distance, _, _)| *distance <= options.max_edit_distance)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(options.max_suggestions)
        .map(|(_, _, c)| c.to_string())
        .collect()
}

/// Suggestion text for an unresolved name
///
/// Lists the closest names when any are close enough, otherwise every known
/// name. Returns `None` when nothing is known at all.
pub fn suggestion_for<'a, I>(target: &str, candidates: I, options: &ValidationOptions) -> Option<String>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let close = closest_names(target, candidates.clone(), options);
    if !close.is_empty() {
        return Some(format!("Did you mean: {}?", close.join(", ")));
    }
    let all: Vec<&str> = candidates.into_iter().collect();
    if all.is_empty() {
        None
    } else {
        Some(format!("Known names: {}", all.join(", ")))
    }
}
