fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let m = b.len();
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0; m + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }
    prev[m]
}

fn score(input: &str, candidate: &str) -> usize {
    let a = normalize_token(input);
    let b = normalize_token(candidate);
    if a.is_empty() || b.is_empty() {
        return usize::MAX;
    }
    if a == b {
        return 0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 1;
    }
    edit_distance(&a, &b)
}

fn max_allowed_distance(input: &str) -> usize {
    match normalize_token(input).len() {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        len => (len as f32 * 0.35).floor().max(3.0) as usize,
    }
}

/// Ranks `candidates` by fuzzy similarity to `input` for did-you-mean
/// hints on unknown tool or action names.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    if input.trim().is_empty() || candidates.is_empty() {
        return Vec::new();
    }
    let allowed = max_allowed_distance(input);

    let mut scored: Vec<(String, usize)> = candidates
        .iter()
        .map(|candidate| (candidate.clone(), score(input, candidate)))
        .filter(|(_, score)| *score <= allowed)
        .collect();

    scored.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.0.len().cmp(&b.0.len()))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut out = Vec::new();
    for (candidate, _) in scored {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
        if out.len() >= limit.max(1) {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn suggests_close_action_name() {
        let out = suggest("craete", &names(&["create", "read", "delete"]), 3);
        assert_eq!(out, vec!["create".to_string()]);
    }

    #[test]
    fn substring_match_ranks_high() {
        let out = suggest("bulk", &names(&["bulk_create", "create", "read"]), 3);
        assert_eq!(out.first().map(|s| s.as_str()), Some("bulk_create"));
    }

    #[test]
    fn distant_inputs_yield_nothing() {
        let out = suggest("zzzz", &names(&["create", "read"]), 3);
        assert!(out.is_empty());
    }
}
