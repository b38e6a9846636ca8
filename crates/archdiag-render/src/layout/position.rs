//! Coordinate assignment for one scope.
//!
//! Ranks are packed in a top-to-bottom frame (each rank centered against the widest one), then
//! mapped to the requested direction. For `LR`/`RL` block sizes are swapped on the way in so
//! the rank axis always runs along the frame's y.

use archdiag_core::Direction;

pub(super) struct Placement {
    /// Block centers, relative to the scope's content origin.
    pub centers: Vec<(f64, f64)>,
    pub width: f64,
    pub height: f64,
}

pub(super) fn place(
    layers: &[Vec<usize>],
    sizes: &[(f64, f64)],
    direction: Direction,
    node_sep: f64,
    rank_sep: f64,
) -> Placement {
    let n = sizes.len();
    if n == 0 {
        return Placement {
            centers: Vec::new(),
            width: 0.0,
            height: 0.0,
        };
    }

    let frame_size = |v: usize| {
        let (w, h) = sizes[v];
        if direction.is_horizontal() { (h, w) } else { (w, h) }
    };

    let mut rank_depth: Vec<f64> = Vec::with_capacity(layers.len());
    let mut rank_span: Vec<f64> = Vec::with_capacity(layers.len());
    for layer in layers {
        let mut depth: f64 = 0.0;
        let mut span: f64 = 0.0;
        for (i, &v) in layer.iter().enumerate() {
            let (w, h) = frame_size(v);
            depth = depth.max(h);
            span += w;
            if i + 1 < layer.len() {
                span += node_sep;
            }
        }
        rank_depth.push(depth);
        rank_span.push(span);
    }
    let max_span = rank_span.iter().copied().fold(0.0_f64, f64::max);

    let mut frame = vec![(0.0, 0.0); n];
    let mut cursor: f64 = 0.0;
    for (r, layer) in layers.iter().enumerate() {
        let y = cursor + rank_depth[r] / 2.0;
        let mut x = (max_span - rank_span[r]) / 2.0;
        for &v in layer {
            let (w, _) = frame_size(v);
            frame[v] = (x + w / 2.0, y);
            x += w + node_sep;
        }
        cursor += rank_depth[r];
        if r + 1 < layers.len() {
            cursor += rank_sep;
        }
    }
    let total_depth = cursor;

    let centers = frame
        .into_iter()
        .map(|(x, y)| match direction {
            Direction::TB => (x, y),
            Direction::BT => (x, total_depth - y),
            Direction::LR => (y, x),
            Direction::RL => (total_depth - y, x),
        })
        .collect();

    let (width, height) = if direction.is_horizontal() {
        (total_depth, max_span)
    } else {
        (max_span, total_depth)
    };
    Placement {
        centers,
        width,
        height,
    }
}
