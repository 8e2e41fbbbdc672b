//! Closing an unordered pool of plane segments into polygons.
//!
//! Segments come from independent face cuts, so a shared end point is only
//! equal up to round-off. End points closer than the tolerance are first
//! merged into one node; a segment whose ends merge collapses and takes no
//! part in the loops. Chaining then follows exact node matches, preferring
//! segments that continue in the same direction and falling back to reversed
//! ones.

use crate::error::ChainError;
use crate::face_cutter::Segment;
use crate::polygon::distance;

/// Assembles the segments into exactly one closed loop.
///
/// The loop is returned without repeating its first point.
pub fn assemble_loop(segments: &[Segment], tolerance: f64) -> Result<Vec<[f64; 3]>, ChainError> {
    let mut loops = assemble_loops(segments, tolerance)?;
    match loops.len() {
        0 => Err(ChainError::OpenChain {
            linked: 0,
            total: segments.len(),
        }),
        1 => Ok(loops.swap_remove(0)),
        loops => Err(ChainError::MultipleLoops { loops }),
    }
}

/// Assembles the segments into as many closed loops as they form.
///
/// Loops with fewer than three distinct points enclose nothing and are dropped,
/// so a pool of collapsed segments gives an empty list.
pub fn assemble_loops(segments: &[Segment], tolerance: f64) -> Result<Vec<Vec<[f64; 3]>>, ChainError> {
    let total = segments.len();
    let mut nodes: Vec<[f64; 3]> = Vec::new();
    let edges: Vec<(usize, usize)> = segments
        .iter()
        .map(|s| (node_index(&mut nodes, s[0], tolerance), node_index(&mut nodes, s[1], tolerance)))
        .collect();

    let mut used: Vec<bool> = edges.iter().map(|(a, b)| a == b).collect();
    let mut linked = used.iter().filter(|&&u| u).count();
    let mut loops = Vec::new();

    while let Some(first) = used.iter().position(|&u| !u) {
        used[first] = true;
        linked += 1;

        let (start, mut current) = edges[first];
        let mut chain = vec![start];

        while current != start {
            let Some((next, far)) = find_next(&edges, &used, current) else {
                return Err(ChainError::OpenChain { linked, total });
            };
            used[next] = true;
            linked += 1;
            chain.push(current);
            current = far;
        }

        if chain.len() >= 3 {
            loops.push(chain.into_iter().map(|n| nodes[n]).collect());
        }
    }

    Ok(loops)
}

/// Index of the node within `tolerance` of `p`, adding `p` as a new node if none is.
fn node_index(nodes: &mut Vec<[f64; 3]>, p: [f64; 3], tolerance: f64) -> usize {
    match nodes.iter().position(|&q| distance(q, p) <= tolerance) {
        Some(index) => index,
        None => {
            nodes.push(p);
            nodes.len() - 1
        }
    }
}

/// Next unused edge leaving `from`, with the node it leads to.
fn find_next(edges: &[(usize, usize)], used: &[bool], from: usize) -> Option<(usize, usize)> {
    let unused = move || (0..edges.len()).filter(move |&k| !used[k]);
    unused()
        .find(|&k| edges[k].0 == from)
        .map(|k| (k, edges[k].1))
        .or_else(|| unused().find(|&k| edges[k].1 == from).map(|k| (k, edges[k].0)))
}
