//! Path-based centrality over the unweighted interaction topology.
//!
//! Every function takes the petgraph view built by the metrics calculator
//! and returns one value per node index. Distances count hops; strengths
//! are ignored here.

use std::collections::VecDeque;

use petgraph::algo::page_rank;
use petgraph::graph::DiGraph;
use petgraph::Direction;

pub(crate) type Topology = DiGraph<(), ()>;

pub(crate) const PAGERANK_DAMPING: f64 = 0.85;
pub(crate) const PAGERANK_ITERATIONS: usize = 50;

/// Adjacency lists for one traversal direction.
fn adjacency(graph: &Topology, direction: Option<Direction>) -> Vec<Vec<usize>> {
    graph
        .node_indices()
        .map(|v| {
            let mut next: Vec<usize> = match direction {
                Some(dir) => graph.neighbors_directed(v, dir).map(|w| w.index()).collect(),
                None => graph
                    .neighbors_directed(v, Direction::Outgoing)
                    .chain(graph.neighbors_directed(v, Direction::Incoming))
                    .map(|w| w.index())
                    .collect(),
            };
            next.sort_unstable();
            next.dedup();
            next
        })
        .collect()
}

/// Hop distances from `start`; `None` where unreachable.
fn hops_from(adj: &[Vec<usize>], start: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; adj.len()];
    let mut queue = VecDeque::new();
    dist[start] = Some(0);
    queue.push_back(start);

    while let Some(v) = queue.pop_front() {
        let Some(d) = dist[v] else { continue };
        for &w in &adj[v] {
            if dist[w].is_none() {
                dist[w] = Some(d + 1);
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Directed betweenness (Brandes), normalized by `(n - 1)(n - 2)`.
pub(crate) fn betweenness(graph: &Topology) -> Vec<f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0; n];
    if n < 3 {
        return scores;
    }
    let out = adjacency(graph, Some(Direction::Outgoing));

    for s in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::new();

        sigma[s] = 1.0;
        dist[s] = Some(0);
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let Some(dv) = dist[v] else { continue };
            for &w in &out[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                scores[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    scores.iter_mut().for_each(|c| *c *= scale);
    scores
}

/// Closeness over incoming paths, scaled by the share of the graph that
/// reaches each node.
pub(crate) fn closeness(graph: &Topology) -> Vec<f64> {
    let n = graph.node_count();
    if n < 2 {
        return vec![0.0; n];
    }
    let inc = adjacency(graph, Some(Direction::Incoming));

    (0..n)
        .map(|v| {
            let (reached, total) = hops_from(&inc, v)
                .into_iter()
                .flatten()
                .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));
            let others = reached - 1;
            if total == 0 {
                0.0
            } else {
                (others as f64 / total as f64) * (others as f64 / (n - 1) as f64)
            }
        })
        .collect()
}

/// Unweighted PageRank, indexed like the graph's nodes.
pub(crate) fn pagerank(graph: &Topology) -> Vec<f64> {
    if graph.node_count() == 0 {
        return Vec::new();
    }
    page_rank(graph, PAGERANK_DAMPING, PAGERANK_ITERATIONS)
}

/// Longest shortest path over the undirected view. 0 for empty or
/// disconnected graphs.
pub(crate) fn diameter(graph: &Topology) -> usize {
    let n = graph.node_count();
    if n == 0 {
        return 0;
    }
    let und = adjacency(graph, None);

    let mut longest = 0;
    for v in 0..n {
        let dist = hops_from(&und, v);
        if dist.iter().any(Option::is_none) {
            return 0;
        }
        longest = dist.into_iter().flatten().fold(longest, usize::max);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a topology from `(source, target)` index pairs.
    fn topology(n: usize, edges: &[(usize, usize)]) -> Topology {
        let mut graph = Topology::with_capacity(n, edges.len());
        for _ in 0..n {
            graph.add_node(());
        }
        for &(s, t) in edges {
            graph.add_edge(
                petgraph::graph::NodeIndex::new(s),
                petgraph::graph::NodeIndex::new(t),
                (),
            );
        }
        graph
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 0 → 1 → 2
    fn path() -> Topology {
        topology(3, &[(0, 1), (1, 2)])
    }

    /// Hub 0 talks with leaves 1..=4 in both directions.
    fn star() -> Topology {
        let edges: Vec<(usize, usize)> = (1..=4).flat_map(|leaf| [(0, leaf), (leaf, 0)]).collect();
        topology(5, &edges)
    }

    #[test]
    fn test_path_betweenness() {
        let scores = betweenness(&path());
        assert!(close(scores[0], 0.0));
        assert!(close(scores[1], 0.5));
        assert!(close(scores[2], 0.0));
    }

    #[test]
    fn test_path_closeness_follows_incoming_paths() {
        let scores = closeness(&path());
        assert!(close(scores[0], 0.0));
        assert!(close(scores[1], 0.5));
        assert!(close(scores[2], 2.0 / 3.0));
    }

    #[test]
    fn test_path_diameter() {
        assert_eq!(diameter(&path()), 2);
    }

    #[test]
    fn test_star_hub_is_central() {
        let graph = star();

        let between = betweenness(&graph);
        assert!(close(between[0], 1.0));
        assert!(between[1..].iter().all(|&b| close(b, 0.0)));

        let near = closeness(&graph);
        assert!(close(near[0], 1.0));
        assert!(near[1..].iter().all(|&c| close(c, 4.0 / 7.0)));

        assert_eq!(diameter(&graph), 2);
    }

    #[test]
    fn test_star_pagerank() {
        let ranks = pagerank(&star());
        assert_eq!(ranks.len(), 5);
        assert!(close(ranks.iter().sum::<f64>(), 1.0));
        assert!(ranks[1..].iter().all(|&r| r < ranks[0]));
        assert!(ranks[1..].iter().all(|&r| close(r, ranks[1])));
    }

    #[test]
    fn test_disconnected_diameter_is_zero() {
        assert_eq!(diameter(&topology(4, &[(0, 1), (2, 3)])), 0);
    }

    #[test]
    fn test_degenerate_graphs() {
        let empty = topology(0, &[]);
        assert!(betweenness(&empty).is_empty());
        assert!(closeness(&empty).is_empty());
        assert!(pagerank(&empty).is_empty());
        assert_eq!(diameter(&empty), 0);

        let single = topology(1, &[]);
        assert_eq!(betweenness(&single), vec![0.0]);
        assert_eq!(closeness(&single), vec![0.0]);
        assert_eq!(diameter(&single), 0);
    }
}
