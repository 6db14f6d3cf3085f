use std::collections::{HashMap, VecDeque};

use pcn_core::{Amount, UserId};

use crate::error::RoutingError;
use crate::graph::ChannelGraph;

/// Configuration for the PathFinder.
#[derive(Debug, Clone, Default)]
pub struct PathFinderConfig {
    /// Maximum number of hops allowed in a single route. Unset means no cap.
    pub max_hops: Option<usize>,
    /// Only traverse hops whose sender currently holds the full amount.
    pub capacity_aware: bool,
}

/// How a breadth-first search ended.
enum Search {
    Found(Vec<UserId>),
    Exhausted { depth_limited: bool },
}

/// Finds shortest payment paths by breadth-first search over a
/// [`ChannelGraph`].
///
/// Neighbours are expanded in ascending [`UserId`] order, so among paths of
/// equal length the one found is always the same for the same graph.
pub struct PathFinder {
    config: PathFinderConfig,
}

impl PathFinder {
    pub fn new(config: PathFinderConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PathFinderConfig::default())
    }

    pub fn config(&self) -> &PathFinderConfig {
        &self.config
    }

    /// Shortest path from `from` to `to`, both included.
    ///
    /// In capacity-aware mode a hop is only taken when
    /// `balance(hop.from) >= amount` at the time of the search; the balances
    /// may change before the path is settled.
    ///
    /// `MaxHopsExceeded` is only reported when `to` is reachable, just not
    /// within the hop cap. An unreachable `to` is always `NoRoute`.
    pub fn find_path<G: ChannelGraph + ?Sized>(
        &self,
        graph: &G,
        from: UserId,
        to: UserId,
        amount: Amount,
    ) -> Result<Vec<UserId>, RoutingError> {
        if from == to {
            return Err(RoutingError::SamePeer(from));
        }

        match self.search(graph, from, to, amount, self.config.max_hops) {
            Search::Found(path) => {
                tracing::debug!(from = %from, to = %to, hops = path.len() - 1, "route found");
                Ok(path)
            }
            Search::Exhausted { depth_limited: true } => match self.config.max_hops {
                Some(max_hops) if self.reachable(graph, from, to, amount) => {
                    tracing::debug!(
                        from = %from,
                        to = %to,
                        max_hops,
                        "route search hit hop limit"
                    );
                    Err(RoutingError::MaxHopsExceeded { from, to, max_hops })
                }
                _ => {
                    tracing::debug!(from = %from, to = %to, "no route");
                    Err(RoutingError::NoRoute { from, to })
                }
            },
            Search::Exhausted { depth_limited: false } => {
                tracing::debug!(from = %from, to = %to, "no route");
                Err(RoutingError::NoRoute { from, to })
            }
        }
    }

    fn reachable<G: ChannelGraph + ?Sized>(
        &self,
        graph: &G,
        from: UserId,
        to: UserId,
        amount: Amount,
    ) -> bool {
        matches!(self.search(graph, from, to, amount, None), Search::Found(_))
    }

    fn search<G: ChannelGraph + ?Sized>(
        &self,
        graph: &G,
        from: UserId,
        to: UserId,
        amount: Amount,
        max_hops: Option<usize>,
    ) -> Search {
        // user -> (predecessor, depth)
        let mut visited: HashMap<UserId, (Option<UserId>, usize)> = HashMap::new();
        let mut queue = VecDeque::new();
        let mut depth_limited = false;

        visited.insert(from, (None, 0));
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let depth = visited.get(&current).map(|(_, d)| *d).unwrap_or(0);
            if max_hops.is_some_and(|max| depth >= max) {
                depth_limited = true;
                continue;
            }

            let mut neighbours = graph.neighbours(current);
            neighbours.sort_unstable();

            for next in neighbours {
                if visited.contains_key(&next) {
                    continue;
                }
                if self.config.capacity_aware && !graph.has_capacity(current, next, amount) {
                    continue;
                }
                visited.insert(next, (Some(current), depth + 1));
                if next == to {
                    return Search::Found(reconstruct(&visited, to));
                }
                queue.push_back(next);
            }
        }

        Search::Exhausted { depth_limited }
    }
}

fn reconstruct(visited: &HashMap<UserId, (Option<UserId>, usize)>, to: UserId) -> Vec<UserId> {
    let mut path = vec![to];
    let mut cursor = to;
    while let Some((Some(prev), _)) = visited.get(&cursor) {
        path.push(*prev);
        cursor = *prev;
    }
    path.reverse();
    path
}
