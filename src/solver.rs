//! Route optimization over a [`RouteGraph`].
//!
//! Two strategies share the [`RouteSolver`] interface: exhaustive
//! permutation search for small graphs, and a spanning-tree
//! 2-approximation above [`SolveOptions::exact_search_limit`]. Both are
//! fully deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::SolveError;
use crate::graph::RouteGraph;

/// Largest node count handled by exhaustive search. Factorial blowup makes
/// anything beyond this impractical.
pub const DEFAULT_EXACT_SEARCH_LIMIT: usize = 6;

/// Cooperative cancellation flag shared with a running solve.
///
/// Clones observe the same flag. Solvers poll it between search steps and
/// bail out with [`SolveError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask any solve holding a clone of this token to stop early.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Node count at or below which exhaustive search is used.
    pub exact_search_limit: usize,
    /// Cancellation flag polled during the search.
    pub cancel: CancelToken,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            exact_search_limit: DEFAULT_EXACT_SEARCH_LIMIT,
            cancel: CancelToken::new(),
        }
    }
}

/// A complete visiting order with its total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedRoute {
    /// Every graph node exactly once, starting at the source.
    pub route: Vec<String>,
    /// Sum of edge weights over consecutive pairs.
    pub total_km: f64,
}

/// One strategy for finding the cheapest full visiting order from a source.
pub trait RouteSolver {
    fn solve(&self, graph: &RouteGraph, source: &str) -> Result<SolvedRoute, SolveError>;
}

/// Pick a solver by graph size and run it.
pub fn find_best_route(
    graph: &RouteGraph,
    source: &str,
    options: &SolveOptions,
) -> Result<SolvedRoute, SolveError> {
    if graph.node_count() <= options.exact_search_limit {
        debug!(nodes = graph.node_count(), "solving with exhaustive search");
        BruteForceSolver::new(options.cancel.clone()).solve(graph, source)
    } else {
        debug!(nodes = graph.node_count(), "solving with spanning-tree approximation");
        MstApproxSolver::new(options.cancel.clone()).solve(graph, source)
    }
}

// ============================================================================
// Exhaustive search
// ============================================================================

/// Exact solver: tries every permutation of the non-source nodes.
///
/// A permutation is abandoned the moment a consecutive pair has no edge.
/// The first minimum encountered in generation order wins ties, so results
/// are stable across runs.
#[derive(Debug, Clone)]
pub struct BruteForceSolver {
    cancel: CancelToken,
}

impl BruteForceSolver {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl RouteSolver for BruteForceSolver {
    fn solve(&self, graph: &RouteGraph, source: &str) -> Result<SolvedRoute, SolveError> {
        let source_idx = graph
            .node_index(source)
            .ok_or(SolveError::NoFeasibleRoute)?;
        if graph.node_count() < 2 {
            return Err(SolveError::NoFeasibleRoute);
        }

        let mut remaining: Vec<usize> = (0..graph.node_count())
            .filter(|&v| v != source_idx)
            .collect();
        let mut path = vec![source_idx];
        let mut best: Option<(Vec<usize>, f64)> = None;

        search(
            graph,
            source_idx,
            &mut remaining,
            &mut path,
            0.0,
            &mut best,
            &self.cancel,
        )?;

        let (order, total_km) = best.ok_or(SolveError::NoFeasibleRoute)?;
        Ok(SolvedRoute {
            route: node_names(graph, &order),
            total_km,
        })
    }
}

fn search(
    graph: &RouteGraph,
    prev: usize,
    remaining: &mut [usize],
    path: &mut Vec<usize>,
    cost: f64,
    best: &mut Option<(Vec<usize>, f64)>,
    cancel: &CancelToken,
) -> Result<(), SolveError> {
    if cancel.is_cancelled() {
        return Err(SolveError::Cancelled);
    }
    if remaining.is_empty() {
        // strict comparison keeps the first minimum seen
        let improves = match best {
            Some((_, best_cost)) => cost < *best_cost,
            None => true,
        };
        if improves {
            *best = Some((path.clone(), cost));
        }
        return Ok(());
    }

    for i in 0..remaining.len() {
        remaining.swap(0, i);
        let next = remaining[0];
        if let Some(step) = graph.weight_by_index(prev, next) {
            path.push(next);
            let (_, rest) = remaining.split_at_mut(1);
            search(graph, next, rest, path, cost + step, best, cancel)?;
            path.pop();
        }
        remaining.swap(0, i);
    }
    Ok(())
}

// ============================================================================
// Spanning-tree approximation
// ============================================================================

/// Approximate solver for graphs too large for exhaustive search.
///
/// Builds a minimum spanning tree (Prim), takes its preorder walk as an
/// open path, and rotates the walk so it starts at the source. On a
/// complete metric graph the walk costs at most twice the optimum. The
/// total is recomputed from the rotated sequence, since rotation changes
/// which edge is cut.
#[derive(Debug, Clone)]
pub struct MstApproxSolver {
    cancel: CancelToken,
}

impl MstApproxSolver {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl RouteSolver for MstApproxSolver {
    fn solve(&self, graph: &RouteGraph, source: &str) -> Result<SolvedRoute, SolveError> {
        let source_idx = graph
            .node_index(source)
            .ok_or(SolveError::NoFeasibleRoute)?;
        if graph.node_count() < 2 {
            return Err(SolveError::NoFeasibleRoute);
        }

        // The walk is rooted independently of the source; rotation below
        // puts the source first while preserving relative cyclic order.
        let children = minimum_spanning_tree(graph, 0, &self.cancel)?;
        let walk = preorder_walk(&children, 0);
        let Some(pos) = walk.iter().position(|&v| v == source_idx) else {
            return Err(SolveError::NoFeasibleRoute);
        };
        let rotated = rotate_to_start(&walk, pos);

        let total_km = route_cost(graph, &rotated)?;
        Ok(SolvedRoute {
            route: node_names(graph, &rotated),
            total_km,
        })
    }
}

/// Prim's algorithm over the full node set.
///
/// Ties break toward the lower node index, keeping the tree deterministic.
/// Returns each node's children, sorted by index, or `NoFeasibleRoute` if
/// the graph does not span.
fn minimum_spanning_tree(
    graph: &RouteGraph,
    root: usize,
    cancel: &CancelToken,
) -> Result<Vec<Vec<usize>>, SolveError> {
    let n = graph.node_count();
    let mut in_tree = vec![false; n];
    let mut best_cost = vec![f64::INFINITY; n];
    let mut best_parent: Vec<Option<usize>> = vec![None; n];
    best_cost[root] = 0.0;

    for _ in 0..n {
        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        let mut next = None;
        let mut next_cost = f64::INFINITY;
        for v in 0..n {
            if !in_tree[v] && best_cost[v] < next_cost {
                next = Some(v);
                next_cost = best_cost[v];
            }
        }
        let Some(v) = next else {
            // no reachable frontier vertex left: disconnected
            return Err(SolveError::NoFeasibleRoute);
        };
        in_tree[v] = true;

        for u in 0..n {
            if in_tree[u] {
                continue;
            }
            if let Some(w) = graph.weight_by_index(v, u) {
                if w < best_cost[u] {
                    best_cost[u] = w;
                    best_parent[u] = Some(v);
                }
            }
        }
    }

    let mut children = vec![Vec::new(); n];
    for v in 0..n {
        if let Some(p) = best_parent[v] {
            children[p].push(v);
        }
    }
    for list in &mut children {
        list.sort_unstable();
    }
    Ok(children)
}

/// Depth-first preorder of the tree, children visited in index order.
fn preorder_walk(children: &[Vec<usize>], root: usize) -> Vec<usize> {
    let mut walk = Vec::with_capacity(children.len());
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        walk.push(v);
        for &child in children[v].iter().rev() {
            stack.push(child);
        }
    }
    walk
}

/// Cyclically shift `walk` so the element at `pos` comes first.
fn rotate_to_start(walk: &[usize], pos: usize) -> Vec<usize> {
    let mut rotated = Vec::with_capacity(walk.len());
    rotated.extend_from_slice(&walk[pos..]);
    rotated.extend_from_slice(&walk[..pos]);
    rotated
}

/// Sum edge weights over consecutive pairs, failing loudly if the order
/// traverses an edge the graph does not have.
fn route_cost(graph: &RouteGraph, order: &[usize]) -> Result<f64, SolveError> {
    let mut total = 0.0;
    for pair in order.windows(2) {
        let Some(w) = graph.weight_by_index(pair[0], pair[1]) else {
            return Err(SolveError::MissingEdge {
                from: graph.node_name(pair[0]).to_string(),
                to: graph.node_name(pair[1]).to_string(),
            });
        };
        total += w;
    }
    Ok(total)
}

fn node_names(graph: &RouteGraph, order: &[usize]) -> Vec<String> {
    order.iter().map(|&v| graph.node_name(v).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_graph(weights: &[(&str, &str, f64)]) -> RouteGraph {
        let mut graph = RouteGraph::new();
        for (from, to, km) in weights {
            graph.add_edge(from, to, *km);
        }
        graph
    }

    #[test]
    fn test_rotate_middle() {
        assert_eq!(rotate_to_start(&[0, 1, 2, 3], 2), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_rotate_front_is_identity() {
        assert_eq!(rotate_to_start(&[4, 5, 6], 0), vec![4, 5, 6]);
    }

    #[test]
    fn test_rotate_last() {
        assert_eq!(rotate_to_start(&[7, 8, 9], 2), vec![9, 7, 8]);
    }

    #[test]
    fn test_rotate_preserves_cyclic_order() {
        let walk = [3, 1, 4, 0, 2];
        let rotated = rotate_to_start(&walk, 3);
        // successor relation is unchanged when read cyclically
        for i in 0..walk.len() {
            let v = walk[i];
            let succ = walk[(i + 1) % walk.len()];
            let pos = rotated.iter().position(|&x| x == v).unwrap();
            assert_eq!(rotated[(pos + 1) % rotated.len()], succ);
        }
    }

    #[test]
    fn test_mst_spans_path_graph() {
        let graph = complete_graph(&[("a", "b", 1.0), ("b", "c", 2.0)]);
        let children = minimum_spanning_tree(&graph, 0, &CancelToken::new()).unwrap();
        assert_eq!(preorder_walk(&children, 0), vec![0, 1, 2]);
    }

    #[test]
    fn test_mst_tie_breaks_toward_lower_index() {
        // both b and c connect to a at weight 1.0; b (lower index) first
        let graph = complete_graph(&[("a", "b", 1.0), ("a", "c", 1.0), ("b", "c", 1.0)]);
        let children = minimum_spanning_tree(&graph, 0, &CancelToken::new()).unwrap();
        assert_eq!(children[0], vec![1, 2]);
        assert_eq!(preorder_walk(&children, 0), vec![0, 1, 2]);
    }

    #[test]
    fn test_mst_disconnected_graph_fails() {
        let mut graph = complete_graph(&[("a", "b", 1.0)]);
        graph.add_node("c");
        let result = minimum_spanning_tree(&graph, 0, &CancelToken::new());
        assert_eq!(result.unwrap_err(), SolveError::NoFeasibleRoute);
    }

    #[test]
    fn test_route_cost_missing_edge_is_loud() {
        let graph = complete_graph(&[("a", "b", 1.0), ("b", "c", 2.0)]);
        let err = route_cost(&graph, &[0, 2, 1]).unwrap_err();
        assert_eq!(
            err,
            SolveError::MissingEdge {
                from: "a".to_string(),
                to: "c".to_string(),
            }
        );
    }

    #[test]
    fn test_route_cost_sums_pairs() {
        let graph = complete_graph(&[("a", "b", 1.5), ("b", "c", 2.5)]);
        let total = route_cost(&graph, &[0, 1, 2]).unwrap();
        assert!((total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancelled_token_aborts_search() {
        let graph = complete_graph(&[("a", "b", 1.0), ("b", "c", 1.0), ("a", "c", 1.0)]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = BruteForceSolver::new(cancel).solve(&graph, "a");
        assert_eq!(result.unwrap_err(), SolveError::Cancelled);
    }
}
