//! Cycle removal and rank assignment for one scope.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    OnStack,
    Done,
}

/// Reverses every DFS back edge so the block graph becomes acyclic.
///
/// The DFS visits roots and out-edges in declaration order, so the result is deterministic.
/// Returned edges keep input order; reversed ones are flipped in place.
pub(super) fn make_acyclic(n: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, &(v, _)) in edges.iter().enumerate() {
        out_edges[v].push(i);
    }

    let mut mark = vec![Mark::New; n];
    let mut reversed = vec![false; edges.len()];
    for root in 0..n {
        if mark[root] != Mark::New {
            continue;
        }
        mark[root] = Mark::OnStack;
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some((v, cursor)) = stack.last_mut() {
            let v = *v;
            let Some(&ei) = out_edges[v].get(*cursor) else {
                mark[v] = Mark::Done;
                stack.pop();
                continue;
            };
            *cursor += 1;
            let w = edges[ei].1;
            match mark[w] {
                Mark::OnStack => reversed[ei] = true,
                Mark::New => {
                    mark[w] = Mark::OnStack;
                    stack.push((w, 0));
                }
                Mark::Done => {}
            }
        }
    }

    edges
        .iter()
        .zip(reversed)
        .map(|(&(v, w), rev)| if rev { (w, v) } else { (v, w) })
        .collect()
}

/// Longest-path ranking over an acyclic edge list: `rank(w) >= rank(v) + 1` for every edge.
///
/// Sources are then pulled towards their successors so short chains hanging off a long one do
/// not stretch back to rank 0.
pub(super) fn longest_path(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut indegree = vec![0usize; n];
    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(v, w) in edges {
        indegree[w] += 1;
        succ[v].push(w);
    }

    let mut rank = vec![0usize; n];
    let mut remaining = indegree.clone();
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    while let Some(v) = queue.pop_front() {
        for &w in &succ[v] {
            rank[w] = rank[w].max(rank[v] + 1);
            remaining[w] -= 1;
            if remaining[w] == 0 {
                queue.push_back(w);
            }
        }
    }

    for v in 0..n {
        if indegree[v] != 0 {
            continue;
        }
        if let Some(min_succ) = succ[v].iter().map(|&w| rank[w]).min() {
            rank[v] = rank[v].max(min_succ.saturating_sub(1));
        }
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_edges_are_reversed() {
        let edges = [(0, 1), (1, 2), (2, 0)];
        let acyclic = make_acyclic(3, &edges);
        assert_eq!(acyclic, [(0, 1), (1, 2), (0, 2)]);
        assert_eq!(longest_path(3, &acyclic), [0, 1, 2]);
    }

    #[test]
    fn sources_are_pulled_towards_their_successors() {
        // 0 -> 1 -> 2 -> 3, and 4 -> 3
        let edges = [(0, 1), (1, 2), (2, 3), (4, 3)];
        let ranks = longest_path(5, &edges);
        assert_eq!(ranks, [0, 1, 2, 3, 2]);
    }

    #[test]
    fn isolated_blocks_stay_on_rank_zero() {
        assert_eq!(longest_path(2, &[]), [0, 0]);
    }
}
