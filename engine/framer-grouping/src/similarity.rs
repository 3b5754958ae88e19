use crate::embedding::Vector;
use crate::error::GroupingError;
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{debug, trace};

/// Rejects thresholds outside [-1, 1] (and NaN).
pub fn validate_threshold(threshold: f32) -> Result<(), GroupingError> {
    if (-1.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(GroupingError::InvalidThreshold(threshold))
    }
}

/// Normalized dot product. Undefined (an error) when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, GroupingError> {
    if a.len() != b.len() {
        return Err(GroupingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !dot.is_finite() || !norm_a.is_finite() || !norm_b.is_finite() {
        return Err(GroupingError::NonFinite);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(GroupingError::ZeroVector);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Err(GroupingError::NonFinite);
    }
    // Rounding can push |similarity| a hair past 1
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Pairwise similarities of `vectors`, row-major.
pub fn similarity_matrix(vectors: &[&Vector]) -> Result<Vec<Vec<f32>>, GroupingError> {
    let n = vectors.len();
    let mut matrix = vec![vec![0.0f32; n]; n];

    for i in 0..n {
        for j in i..n {
            let sim = cosine_similarity(vectors[i], vectors[j])?;
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }
    Ok(matrix)
}

/// Single pass, seed-based grouping.
///
/// Each unassigned vector seeds a group and absorbs every later unassigned
/// vector whose similarity to the seed reaches `threshold`. Members are only
/// compared to the seed, so the relation is not transitive.
/// Sentinel entries (`None`) never join a group.
pub fn group_greedy(vectors: &[Option<Vector>], threshold: f32) -> Result<Vec<Vec<usize>>, GroupingError> {
    validate_threshold(threshold)?;

    let mut used: Vec<bool> = vectors.iter().map(Option::is_none).collect();
    let mut groups = Vec::new();

    for i in 0..vectors.len() {
        if used[i] {
            continue;
        }
        let Some(seed) = &vectors[i] else { continue };

        let mut group = vec![i];
        used[i] = true;

        for j in (i + 1)..vectors.len() {
            if used[j] {
                continue;
            }
            let Some(candidate) = &vectors[j] else { continue };

            if cosine_similarity(seed, candidate)? >= threshold {
                group.push(j);
                used[j] = true;
            }
        }
        groups.push(group);
    }

    debug!(groups = groups.len(), "Greedy grouping done");
    Ok(groups)
}

/// Connected components of the "similar enough" graph.
///
/// Vectors i and j share an edge iff their similarity reaches `threshold`, so
/// chains of similar vectors merge even when the endpoints are dissimilar.
/// Components are discovered in input order and listed in depth-first
/// pre-order, neighbours visited by ascending index.
pub fn group_connected(vectors: &[Option<Vector>], threshold: f32) -> Result<Vec<Vec<usize>>, GroupingError> {
    validate_threshold(threshold)?;

    // 1. Keep only real vectors; node weight is the original input index
    let valid: Vec<(usize, &Vector)> = vectors
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_ref().map(|v| (i, v)))
        .collect();

    let mut graph: UnGraph<usize, f32> = UnGraph::with_capacity(valid.len(), valid.len());
    let nodes: Vec<NodeIndex> = valid.iter().map(|(i, _)| graph.add_node(*i)).collect();

    // 2. Edges from the similarity matrix
    let refs: Vec<&Vector> = valid.iter().map(|(_, v)| *v).collect();
    let matrix = similarity_matrix(&refs)?;
    trace!(?matrix, "Similarity matrix");

    for a in 0..nodes.len() {
        for b in (a + 1)..nodes.len() {
            if matrix[a][b] >= threshold {
                graph.add_edge(nodes[a], nodes[b], matrix[a][b]);
            }
        }
    }

    // 3. Depth-first walk with an explicit stack
    let mut visited = vec![false; nodes.len()];
    let mut groups = Vec::new();

    for &start in &nodes {
        if visited[start.index()] {
            continue;
        }

        let mut group = Vec::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;
            group.push(graph[node]);

            let mut next: Vec<NodeIndex> = graph
                .neighbors(node)
                .filter(|n| !visited[n.index()])
                .collect();
            next.sort_unstable();
            // Reversed so the smallest index is popped first
            stack.extend(next.into_iter().rev());
        }
        groups.push(group);
    }

    debug!(
        nodes = nodes.len(),
        edges = graph.edge_count(),
        groups = groups.len(),
        "Connected grouping done"
    );
    Ok(groups)
}
