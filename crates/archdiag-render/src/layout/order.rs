//! In-rank ordering: declaration order refined by barycenter sweeps, keeping the ordering with
//! the fewest crossings between adjacent ranks.

pub(super) const SWEEPS: usize = 4;

pub(super) fn order_layers(
    ranks: &[usize],
    edges: &[(usize, usize)],
    sweeps: usize,
) -> Vec<Vec<usize>> {
    let Some(max_rank) = ranks.iter().copied().max() else {
        return Vec::new();
    };
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (v, &r) in ranks.iter().enumerate() {
        layers[r].push(v);
    }

    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); ranks.len()];
    for &(v, w) in edges {
        neighbors[v].push(w);
        neighbors[w].push(v);
    }

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(&layers, ranks, edges);
    let mut pos = positions(&layers, ranks.len());

    for sweep in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        let down = sweep % 2 == 0;
        let order: Vec<usize> = if down {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };
        for r in order {
            let mut keyed: Vec<(f64, usize)> = layers[r]
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let fixed: Vec<f64> = neighbors[v]
                        .iter()
                        .filter(|&&u| if down { ranks[u] < r } else { ranks[u] > r })
                        .map(|&u| pos[u] as f64)
                        .collect();
                    let key = if fixed.is_empty() {
                        i as f64
                    } else {
                        fixed.iter().sum::<f64>() / fixed.len() as f64
                    };
                    (key, v)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            layers[r] = keyed.into_iter().map(|(_, v)| v).collect();
            for (i, &v) in layers[r].iter().enumerate() {
                pos[v] = i;
            }
        }

        let crossings = count_crossings(&layers, ranks, edges);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
    }
    best
}

fn positions(layers: &[Vec<usize>], n: usize) -> Vec<usize> {
    let mut pos = vec![0usize; n];
    for layer in layers {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }
    pos
}

/// Crossings between edges that join adjacent ranks.
fn count_crossings(layers: &[Vec<usize>], ranks: &[usize], edges: &[(usize, usize)]) -> usize {
    let pos = positions(layers, ranks.len());
    let spans: Vec<(usize, usize, usize)> = edges
        .iter()
        .filter_map(|&(v, w)| {
            let (top, bottom) = if ranks[v] < ranks[w] { (v, w) } else { (w, v) };
            (ranks[bottom] == ranks[top] + 1).then_some((ranks[top], pos[top], pos[bottom]))
        })
        .collect();

    let mut crossings = 0;
    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            if a.0 == b.0 && ((a.1 < b.1 && a.2 > b.2) || (a.1 > b.1 && a.2 < b.2)) {
                crossings += 1;
            }
        }
    }
    crossings
}
