/*
Copyright 2017 Takashi Ogura

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use super::{sync_nearest, SolveContext};
use crate::errors::*;
use crate::funcs::*;

#[derive(Default)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn push(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.parent.len() - 1
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Collision free milestones and the free segments between them
#[derive(Default)]
pub(super) struct Roadmap {
    milestones: Vec<Configuration>,
    edges: Vec<Vec<usize>>,
    components: UnionFind,
    synced: bool,
}

impl Roadmap {
    pub(super) fn len(&self) -> usize {
        self.milestones.len()
    }

    fn add(&mut self, q: Configuration) -> usize {
        self.milestones.push(q);
        self.edges.push(Vec::new());
        self.components.push()
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        self.edges[a].push(b);
        self.edges[b].push(a);
        self.components.union(a, b);
    }
}

/// Connections of the start and the goal of one query to the roadmap
struct Query<'q> {
    start: &'q [f64],
    goal: &'q [f64],
    start_edges: Vec<usize>,
    goal_edges: Vec<usize>,
    direct: bool,
}

impl<'q> Query<'q> {
    /// Milestones keep their index, the start is `len()` and the goal `len() + 1`
    fn position<'a>(&'a self, roadmap: &'a Roadmap, node: usize) -> &'a [f64] {
        if node == roadmap.len() {
            self.start
        } else if node == roadmap.len() + 1 {
            self.goal
        } else {
            &roadmap.milestones[node]
        }
    }

    fn neighbours(&self, roadmap: &Roadmap, node: usize) -> Vec<usize> {
        let (start, goal) = (roadmap.len(), roadmap.len() + 1);
        if node == start {
            let mut found = self.start_edges.clone();
            if self.direct {
                found.push(goal);
            }
            found
        } else if node == goal {
            self.goal_edges.clone()
        } else {
            let mut found = roadmap.edges[node].clone();
            if self.start_edges.contains(&node) {
                found.push(start);
            }
            if self.goal_edges.contains(&node) {
                found.push(goal);
            }
            found
        }
    }

    fn is_connected(&self, roadmap: &mut Roadmap) -> bool {
        if self.direct {
            return true;
        }
        let start_components = self
            .start_edges
            .iter()
            .map(|id| roadmap.components.find(*id))
            .collect::<Vec<_>>();
        self.goal_edges
            .iter()
            .any(|id| start_components.contains(&roadmap.components.find(*id)))
    }
}

#[derive(PartialEq)]
struct Candidate {
    cost: f64,
    node: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    // reversed for a min-heap
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* from the start to the goal of `query`
fn shortest_path(roadmap: &Roadmap, query: &Query<'_>) -> Option<Vec<Configuration>> {
    let n = roadmap.len();
    let (start, goal) = (n, n + 1);
    let mut cost = vec![f64::INFINITY; n + 2];
    let mut came_from = vec![None; n + 2];
    let mut open = BinaryHeap::new();
    cost[start] = 0.0;
    open.push(Candidate {
        cost: distance(query.start, query.goal),
        node: start,
    });
    while let Some(Candidate { node, .. }) = open.pop() {
        if node == goal {
            let mut path = vec![query.goal.to_vec()];
            let mut current = node;
            while let Some(previous) = came_from[current] {
                path.push(query.position(roadmap, previous).to_vec());
                current = previous;
            }
            path.reverse();
            return Some(path);
        }
        for next in query.neighbours(roadmap, node) {
            let tentative = cost[node]
                + distance(
                    query.position(roadmap, node),
                    query.position(roadmap, next),
                );
            if tentative < cost[next] {
                cost[next] = tentative;
                came_from[next] = Some(node);
                open.push(Candidate {
                    cost: tentative + distance(query.position(roadmap, next), query.goal),
                    node: next,
                });
            }
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
pub(super) fn solve_prm(
    roadmap: &mut Roadmap,
    ctx: &mut SolveContext<'_, '_>,
    start: &[f64],
    goal: &[f64],
    degree: usize,
    k: usize,
    radius: f64,
    deadline: Instant,
) -> Result<Option<Vec<Configuration>>> {
    sync_nearest(
        ctx.nearest,
        &mut roadmap.synced,
        roadmap.milestones.iter().map(|q| q.as_slice()),
    )?;
    let mut query = Query {
        start,
        goal,
        start_edges: Vec::new(),
        goal_edges: Vec::new(),
        direct: !ctx.verifier.is_colliding(ctx.model, start, goal)?,
    };
    for (_, id) in ctx.nearest.k_nearest(start, k, radius)? {
        if !ctx.verifier.is_colliding(ctx.model, start, &roadmap.milestones[id])? {
            query.start_edges.push(id);
        }
    }
    for (_, id) in ctx.nearest.k_nearest(goal, k, radius)? {
        if !ctx.verifier.is_colliding(ctx.model, goal, &roadmap.milestones[id])? {
            query.goal_edges.push(id);
        }
    }
    loop {
        if query.is_connected(roadmap) {
            return Ok(shortest_path(roadmap, &query));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        let q = ctx.sampler.generate(ctx.model);
        if !ctx.model.is_valid(&q) || ctx.model.is_colliding(&q)? {
            continue;
        }
        let neighbours = ctx.nearest.k_nearest(&q, k, radius)?;
        let id = roadmap.add(q);
        ctx.nearest.push(&roadmap.milestones[id], id)?;
        for (_, other) in neighbours {
            if roadmap.edges[id].len() >= degree {
                break;
            }
            if roadmap.edges[other].len() >= degree {
                continue;
            }
            if !ctx
                .verifier
                .is_colliding(ctx.model, &roadmap.milestones[id], &roadmap.milestones[other])?
            {
                roadmap.add_edge(id, other);
            }
        }
        let q = &roadmap.milestones[id];
        if distance(q, start) <= radius && !ctx.verifier.is_colliding(ctx.model, start, q)? {
            query.start_edges.push(id);
        }
        if distance(q, goal) <= radius && !ctx.verifier.is_colliding(ctx.model, goal, q)? {
            query.goal_edges.push(id);
        }
    }
}
