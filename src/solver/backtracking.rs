use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Follows `prevs` back from `final_state` - the initial state is the only one without a prev.
pub(crate) fn backtrack_path<S, H>(prevs: &HashMap<&S, &S, H>, final_state: &S) -> Vec<S>
where
    S: Clone + Eq + Hash,
    H: BuildHasher,
{
    let mut states = vec![final_state.clone()];
    let mut cur = final_state;
    while let Some(&prev) = prevs.get(cur) {
        states.push(prev.clone());
        cur = prev;
    }
    states.reverse();
    states
}
