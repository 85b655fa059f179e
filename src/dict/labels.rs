//! Label clean-up helpers.

use std::collections::HashSet;

/// De-duplicate labels while keeping storage order.
///
/// The first occurrence of a name keeps it; later occurrences become
/// `<name>_<k>` with the smallest `k >= 1` that collides neither with an
/// original label nor with a name assigned earlier.
pub fn make_labels_unique<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let reserved: HashSet<&str> = labels.iter().map(|l| l.as_ref()).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut out = Vec::with_capacity(labels.len());

    for label in labels {
        let label = label.as_ref();
        if taken.insert(label.to_string()) {
            out.push(label.to_string());
            continue;
        }
        let mut k = 1usize;
        let name = loop {
            let candidate = format!("{}_{}", label, k);
            if !reserved.contains(candidate.as_str()) && !taken.contains(&candidate) {
                break candidate;
            }
            k += 1;
        };
        taken.insert(name.clone());
        out.push(name);
    }
    out
}
