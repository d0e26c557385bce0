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
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Instant;

use super::{sync_nearest, SolveContext};
use crate::errors::*;
use crate::funcs::*;
use crate::nearest::NearestNeighbours;
use crate::planning_model::PlanningModel;
use crate::verifier::Verifier;

struct Vertex {
    q: Configuration,
    parent: Option<usize>,
}

#[derive(Default)]
struct Tree {
    vertices: Vec<Vertex>,
}

impl Tree {
    fn len(&self) -> usize {
        self.vertices.len()
    }

    fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn add(&mut self, q: Configuration, parent: Option<usize>) -> usize {
        self.vertices.push(Vertex { q, parent });
        self.vertices.len() - 1
    }

    fn q(&self, id: usize) -> &[f64] {
        &self.vertices[id].q
    }

    fn points(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.vertices.iter().map(|v| v.q.as_slice())
    }

    /// Configurations from `id` up to the root
    fn path_to_root(&self, id: usize) -> Vec<Configuration> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(index) = current {
            path.push(self.vertices[index].q.clone());
            current = self.vertices[index].parent;
        }
        path
    }
}

/// Trees grown from the start (0) and from the goal (1, RRT-ConCon only)
#[derive(Default)]
pub(super) struct TreeSearch {
    trees: [Tree; 2],
    /// index of the goal tree; the start tree uses the index of the session
    goal_nearest: Option<Box<dyn NearestNeighbours>>,
    synced: bool,
}

impl TreeSearch {
    pub(super) fn reset(&mut self) {
        *self = TreeSearch::default();
    }

    pub(super) fn num_vertices(&self) -> usize {
        self.trees[0].len() + self.trees[1].len()
    }

    fn prepare_start_tree(
        &mut self,
        nearest: &mut dyn NearestNeighbours,
        start: &[f64],
    ) -> Result<()> {
        if self.trees[0].is_empty() {
            self.trees[0].add(start.to_vec(), None);
            self.synced = false;
        }
        sync_nearest(nearest, &mut self.synced, self.trees[0].points())
    }
}

enum Extend {
    Trapped,
    Advanced(usize),
    Reached(usize),
}

/// Grow `tree` by one step of `delta` toward `target`
fn extend(
    model: &PlanningModel<'_>,
    verifier: &dyn Verifier,
    tree: &mut Tree,
    nearest: &mut dyn NearestNeighbours,
    target: &[f64],
    delta: f64,
    epsilon: f64,
) -> Result<Extend> {
    let near = match nearest.nearest(target)? {
        Some((dist, id)) if dist <= epsilon => return Ok(Extend::Reached(id)),
        Some((_, id)) => id,
        None => return Ok(Extend::Trapped),
    };
    let q_near = tree.q(near);
    let q_new = model.step(q_near, target, delta);
    if !model.is_valid(&q_new)
        || model.is_colliding(&q_new)?
        || verifier.is_colliding(model, q_near, &q_new)?
    {
        return Ok(Extend::Trapped);
    }
    let reached = model.distance(&q_new, target) <= epsilon;
    let id = tree.add(q_new, Some(near));
    nearest.push(tree.q(id), id)?;
    Ok(if reached {
        Extend::Reached(id)
    } else {
        Extend::Advanced(id)
    })
}

/// Extend `tree` toward `target` until it is reached or blocked
fn connect(
    model: &PlanningModel<'_>,
    verifier: &dyn Verifier,
    tree: &mut Tree,
    nearest: &mut dyn NearestNeighbours,
    target: &[f64],
    delta: f64,
    epsilon: f64,
) -> Result<Extend> {
    loop {
        match extend(model, verifier, tree, nearest, target, delta, epsilon)? {
            Extend::Advanced(_) => continue,
            other => return Ok(other),
        }
    }
}

/// Path through the vertex `id` if it can be joined to `goal`
///
/// Within `epsilon` the goal is appended as is, within `delta` only if the
/// segment is free. The last configuration is always `goal` itself.
fn connect_goal(
    model: &PlanningModel<'_>,
    verifier: &dyn Verifier,
    tree: &Tree,
    id: usize,
    goal: &[f64],
    delta: f64,
    epsilon: f64,
) -> Result<Option<Vec<Configuration>>> {
    let q = tree.q(id);
    let dist = model.distance(q, goal);
    if dist > delta || (dist > epsilon && verifier.is_colliding(model, q, goal)?) {
        return Ok(None);
    }
    let mut path = tree.path_to_root(id);
    path.reverse();
    if dist == 0.0 && path.len() > 1 {
        path.pop();
    }
    path.push(goal.to_vec());
    Ok(Some(path))
}

#[allow(clippy::too_many_arguments)]
pub(super) fn solve_rrt(
    search: &mut TreeSearch,
    ctx: &mut SolveContext<'_, '_>,
    start: &[f64],
    goal: &[f64],
    delta: f64,
    epsilon: f64,
    mut goal_bias: Option<(f64, &mut StdRng)>,
    deadline: Instant,
) -> Result<Option<Vec<Configuration>>> {
    search.prepare_start_tree(ctx.nearest, start)?;
    let tree = &mut search.trees[0];
    if let Some((_, id)) = ctx.nearest.nearest(goal)? {
        if let Some(path) = connect_goal(ctx.model, ctx.verifier, tree, id, goal, delta, epsilon)? {
            return Ok(Some(path));
        }
    }
    while Instant::now() < deadline {
        let biased = match goal_bias {
            Some((probability, ref mut rng)) => rng.gen::<f64>() < probability,
            None => false,
        };
        let target = if biased {
            goal.to_vec()
        } else {
            ctx.sampler.generate(ctx.model)
        };
        let id = match extend(
            ctx.model,
            ctx.verifier,
            tree,
            ctx.nearest,
            &target,
            delta,
            epsilon,
        )? {
            Extend::Trapped => continue,
            Extend::Advanced(id) | Extend::Reached(id) => id,
        };
        if let Some(path) = connect_goal(ctx.model, ctx.verifier, tree, id, goal, delta, epsilon)? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Join the path to `id0` in the start tree with the path from `id1` in the goal tree
fn join_trees(trees: &[Tree; 2], id0: usize, id1: usize) -> Vec<Configuration> {
    let mut path = trees[0].path_to_root(id0);
    path.reverse();
    let mut rest = trees[1].path_to_root(id1);
    if distance(&path[path.len() - 1], &rest[0]) == 0.0 {
        if path.len() > 1 {
            path.pop();
        } else if rest.len() > 1 {
            rest.remove(0);
        }
    }
    path.append(&mut rest);
    path
}

pub(super) fn solve_con_con(
    search: &mut TreeSearch,
    ctx: &mut SolveContext<'_, '_>,
    start: &[f64],
    goal: &[f64],
    delta: f64,
    epsilon: f64,
    deadline: Instant,
) -> Result<Option<Vec<Configuration>>> {
    search.prepare_start_tree(ctx.nearest, start)?;
    if search.trees[1].is_empty() {
        let id = search.trees[1].add(goal.to_vec(), None);
        let mut goal_nearest = ctx.nearest.empty();
        goal_nearest.push(goal, id)?;
        search.goal_nearest = Some(goal_nearest);
    }
    let goal_nearest = match search.goal_nearest {
        Some(ref mut nearest) => nearest,
        None => return Err(Error::Other("goal tree has no index".to_owned())),
    };
    // the start tree extends first
    let mut from_goal = false;
    while Instant::now() < deadline {
        let target = ctx.sampler.generate(ctx.model);
        let [start_tree, goal_tree] = &mut search.trees;
        let start_nearest: &mut dyn NearestNeighbours = &mut *ctx.nearest;
        let goal_tree_nearest: &mut dyn NearestNeighbours = &mut **goal_nearest;
        let (tree_a, nearest_a, tree_b, nearest_b) = if from_goal {
            (goal_tree, goal_tree_nearest, start_tree, start_nearest)
        } else {
            (start_tree, start_nearest, goal_tree, goal_tree_nearest)
        };
        from_goal = !from_goal;
        let id_a = match extend(
            ctx.model,
            ctx.verifier,
            tree_a,
            nearest_a,
            &target,
            delta,
            epsilon,
        )? {
            Extend::Trapped => continue,
            Extend::Advanced(id) | Extend::Reached(id) => id,
        };
        let q_a = tree_a.q(id_a).to_vec();
        if let Extend::Reached(id_b) = connect(
            ctx.model,
            ctx.verifier,
            tree_b,
            nearest_b,
            &q_a,
            delta,
            epsilon,
        )? {
            // from_goal is already flipped
            let (id0, id1) = if from_goal { (id_a, id_b) } else { (id_b, id_a) };
            return Ok(Some(join_trees(&search.trees, id0, id1)));
        }
    }
    Ok(None)
}
