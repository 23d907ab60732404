//! Path reconstruction from the two parent chains.

use crate::error::SearchError;
use crate::search::frontier::DirectionState;
use std::fmt::Debug;
use std::hash::Hash;

/// Build the path `source .. meeting .. target`.
///
/// Walks the forward parent chain from `meeting` back to the source and the
/// backward chain from `meeting` to the target. `meeting` appears once.
/// A corrupted chain is reported as [`SearchError::Internal`].
pub fn reconstruct<N>(
    forward: &DirectionState<N>,
    backward: &DirectionState<N>,
    meeting: &N,
) -> Result<Vec<N>, SearchError>
where
    N: Clone + Eq + Hash + Debug,
{
    let mut path = chain_to_start(forward, meeting)?;
    path.reverse();

    let tail = chain_to_start(backward, meeting)?;
    path.extend(tail.into_iter().skip(1));
    Ok(path)
}

/// Follow parents from `node` to the start of `state`, returning
/// `[node, parent, .., start]`.
fn chain_to_start<N>(state: &DirectionState<N>, node: &N) -> Result<Vec<N>, SearchError>
where
    N: Clone + Eq + Hash + Debug,
{
    let corrupt = |what: String| {
        SearchError::Internal(format!("{} parent chain corrupted: {}", state.direction(), what))
    };

    let mut record = state
        .record(node)
        .ok_or_else(|| corrupt(format!("{:?} is not visited", node)))?;
    let mut chain = vec![node.clone()];

    // Each step must lower the depth by one, so a chain can be no longer
    // than the starting depth; anything longer contains a cycle.
    let limit = record.depth;
    while let Some(parent) = &record.parent {
        if chain.len() > limit {
            return Err(corrupt(format!("cycle through {:?}", parent)));
        }
        let parent_record = state
            .record(parent)
            .ok_or_else(|| corrupt(format!("parent {:?} is not visited", parent)))?;
        if parent_record.depth + 1 != record.depth {
            return Err(corrupt(format!(
                "depth of {:?} is {} but its child has depth {}",
                parent, parent_record.depth, record.depth
            )));
        }
        chain.push(parent.clone());
        record = parent_record;
    }

    let end = chain.last().unwrap_or(node);
    if end != state.start() {
        return Err(corrupt(format!(
            "chain ends at {:?}, expected {:?}",
            end,
            state.start()
        )));
    }
    Ok(chain)
}
