use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use serde::{Deserialize, Serialize};

use super::domain::HouseId;

/// Undirected road distance between two houses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseLink {
    pub from: HouseId,
    pub to: HouseId,
    pub distance: f64,
}

impl HouseLink {
    pub fn joins(&self, left: HouseId, right: HouseId) -> bool {
        (self.from == left && self.to == right) || (self.from == right && self.to == left)
    }

    pub fn touches(&self, id: HouseId) -> bool {
        self.from == id || self.to == id
    }
}

/// Shortest known travel distance from a start house.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteDistance {
    pub house_id: HouseId,
    pub distance: f64,
}

/// Weighted adjacency between houses, used to offer nearby alternatives.
#[derive(Debug, Clone, Default)]
pub struct LocationGraph {
    adjacency: BTreeMap<HouseId, Vec<RouteDistance>>,
}

impl LocationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_links<'a, I>(links: I) -> Self
    where
        I: IntoIterator<Item = &'a HouseLink>,
    {
        let mut graph = Self::new();
        for link in links {
            graph.add_link(*link);
        }
        graph
    }

    /// Adds the link in both directions. A repeated pair keeps the latest distance.
    pub fn add_link(&mut self, link: HouseLink) {
        self.connect(link.from, link.to, link.distance);
        self.connect(link.to, link.from, link.distance);
    }

    fn connect(&mut self, from: HouseId, to: HouseId, distance: f64) {
        let edges = self.adjacency.entry(from).or_default();
        match edges.iter_mut().find(|edge| edge.house_id == to) {
            Some(edge) => edge.distance = distance,
            None => edges.push(RouteDistance {
                house_id: to,
                distance,
            }),
        }
    }

    /// Houses reachable from `start` within `max_distance`, nearest first.
    ///
    /// Distances are shortest paths over the whole graph, so a house reached
    /// through an intermediate house counts at the summed distance. `start`
    /// itself is never returned. Ties are broken by house id.
    pub fn within(&self, start: HouseId, max_distance: f64) -> Vec<RouteDistance> {
        let mut settled: BTreeMap<HouseId, f64> = BTreeMap::new();
        let mut frontier = BinaryHeap::new();
        frontier.push(Frontier {
            distance: 0.0,
            house_id: start,
        });

        while let Some(Frontier { distance, house_id }) = frontier.pop() {
            if distance > max_distance {
                break;
            }
            if settled.contains_key(&house_id) {
                continue;
            }
            settled.insert(house_id, distance);

            for edge in self.adjacency.get(&house_id).into_iter().flatten() {
                if !settled.contains_key(&edge.house_id) {
                    frontier.push(Frontier {
                        distance: distance + edge.distance,
                        house_id: edge.house_id,
                    });
                }
            }
        }

        let mut nearby: Vec<RouteDistance> = settled
            .into_iter()
            .filter(|(house_id, _)| *house_id != start)
            .map(|(house_id, distance)| RouteDistance { house_id, distance })
            .collect();
        nearby.sort_by(|left, right| {
            left.distance
                .total_cmp(&right.distance)
                .then_with(|| left.house_id.cmp(&right.house_id))
        });
        nearby
    }
}

// Min-heap entry: `BinaryHeap` pops the greatest, so the ordering is reversed.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    distance: f64,
    house_id: HouseId,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.house_id.cmp(&self.house_id))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}
