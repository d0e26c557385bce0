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
//! Sampling based planners: RRT, RRT-ConCon, goal biased RRT and PRM

use log::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::errors::*;
use crate::funcs::*;
use crate::nearest::NearestNeighbours;
use crate::planning_model::PlanningModel;
use crate::sampler::Sampler;
use crate::verifier::Verifier;

mod prm;
mod rrt;

/// Rate at which the goal biased RRT extends toward the goal
pub const GOAL_BIAS_PROBABILITY: f64 = 0.05;
/// Number of neighbours a new PRM milestone tries to connect to
pub const PRM_K_NEAREST: usize = 30;

/// Planner variant, named as in plan recipes and `PlanTrajectory`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlannerKind {
    Rrt,
    /// bidirectional RRT which connects both trees greedily
    #[default]
    RrtConCon,
    RrtGoalBias,
    Prm,
}

impl PlannerKind {
    pub fn name(self) -> &'static str {
        match self {
            PlannerKind::Rrt => "rrt",
            PlannerKind::RrtConCon => "rrtConCon",
            PlannerKind::RrtGoalBias => "rrtGoalBias",
            PlannerKind::Prm => "prm",
        }
    }
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlannerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rrt" | "RRT" => Ok(PlannerKind::Rrt),
            "rrtConnect" | "RRTConnect" | "rrtConCon" | "RRTConCon" => Ok(PlannerKind::RrtConCon),
            "rrtGoalBias" | "RRTGoalBias" => Ok(PlannerKind::RrtGoalBias),
            "prm" | "PRM" => Ok(PlannerKind::Prm),
            _ => Err(Error::InvalidParameter(format!("unknown planner kind {:?}", s))),
        }
    }
}

/// Planner algorithm with the parameters of its variant
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    Rrt {
        delta: f64,
        epsilon: f64,
    },
    RrtConCon {
        delta: f64,
        epsilon: f64,
    },
    RrtGoalBias {
        delta: f64,
        epsilon: f64,
        probability: f64,
    },
    Prm {
        /// maximum number of edges of a milestone
        degree: usize,
        k: usize,
        radius: f64,
    },
}

impl Algorithm {
    pub fn new(kind: PlannerKind, delta: f64, epsilon: f64) -> Self {
        match kind {
            PlannerKind::Rrt => Algorithm::Rrt { delta, epsilon },
            PlannerKind::RrtConCon => Algorithm::RrtConCon { delta, epsilon },
            PlannerKind::RrtGoalBias => Algorithm::RrtGoalBias {
                delta,
                epsilon,
                probability: GOAL_BIAS_PROBABILITY,
            },
            PlannerKind::Prm => Algorithm::Prm {
                degree: usize::MAX,
                k: PRM_K_NEAREST,
                radius: f64::INFINITY,
            },
        }
    }

    pub fn kind(&self) -> PlannerKind {
        match self {
            Algorithm::Rrt { .. } => PlannerKind::Rrt,
            Algorithm::RrtConCon { .. } => PlannerKind::RrtConCon,
            Algorithm::RrtGoalBias { .. } => PlannerKind::RrtGoalBias,
            Algorithm::Prm { .. } => PlannerKind::Prm,
        }
    }

    /// Step length and goal tolerance of the tree variants
    pub fn tree_parameters(&self) -> Option<(f64, f64)> {
        match *self {
            Algorithm::Rrt { delta, epsilon }
            | Algorithm::RrtConCon { delta, epsilon }
            | Algorithm::RrtGoalBias { delta, epsilon, .. } => Some((delta, epsilon)),
            Algorithm::Prm { .. } => None,
        }
    }
}

/// Components borrowed by the planner for one `solve`
pub struct SolveContext<'a, 'm> {
    pub model: &'a PlanningModel<'m>,
    pub sampler: &'a mut dyn Sampler,
    pub verifier: &'a dyn Verifier,
    /// index of the start tree, or of the roadmap
    pub nearest: &'a mut dyn NearestNeighbours,
}

enum Search {
    Trees(rrt::TreeSearch),
    Roadmap(prm::Roadmap),
}

impl Search {
    fn new(algorithm: &Algorithm) -> Self {
        match algorithm {
            Algorithm::Prm { .. } => Search::Roadmap(prm::Roadmap::default()),
            _ => Search::Trees(rrt::TreeSearch::default()),
        }
    }

    fn num_vertices(&self) -> usize {
        match self {
            Search::Trees(trees) => trees.num_vertices(),
            Search::Roadmap(roadmap) => roadmap.len(),
        }
    }
}

/// Planner which keeps its search graph between calls of `solve`
///
/// Trees are discarded when the start or the goal changes, the roadmap of
/// PRM is kept for any query.
pub struct Planner {
    algorithm: Algorithm,
    start: Option<Configuration>,
    goal: Option<Configuration>,
    duration: Duration,
    search: Search,
    path: Vec<Configuration>,
    rng: StdRng,
}

impl Planner {
    pub fn new(algorithm: Algorithm) -> Self {
        Self::with_rng(algorithm, StdRng::from_entropy())
    }

    pub fn with_seed(algorithm: Algorithm, seed: u64) -> Self {
        Self::with_rng(algorithm, StdRng::seed_from_u64(seed))
    }

    fn with_rng(algorithm: Algorithm, rng: StdRng) -> Self {
        Planner {
            search: Search::new(&algorithm),
            algorithm,
            start: None,
            goal: None,
            duration: Duration::from_secs(30),
            path: Vec::new(),
            rng,
        }
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    pub fn kind(&self) -> PlannerKind {
        self.algorithm.kind()
    }

    /// Whether this planner was built for these parameters
    ///
    /// PRM has no step length of its own, so only the kind matters for it.
    pub fn is_built_for(&self, kind: PlannerKind, delta: f64, epsilon: f64) -> bool {
        self.kind() == kind
            && self
                .algorithm
                .tree_parameters()
                .map_or(true, |params| params == (delta, epsilon))
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn start(&self) -> Option<&[f64]> {
        self.start.as_deref()
    }

    pub fn goal(&self) -> Option<&[f64]> {
        self.goal.as_deref()
    }

    pub fn set_start(&mut self, start: Configuration) {
        if self.start.as_ref() != Some(&start) {
            self.reset_trees();
            self.start = Some(start);
        }
    }

    pub fn set_goal(&mut self, goal: Configuration) {
        if self.goal.as_ref() != Some(&goal) {
            self.reset_trees();
            self.goal = Some(goal);
        }
    }

    fn reset_trees(&mut self) {
        if let Search::Trees(ref mut trees) = self.search {
            if trees.num_vertices() > 0 {
                debug!("start or goal changed, discarding search trees");
            }
            trees.reset();
        }
    }

    /// Number of vertices in the search graph
    pub fn num_vertices(&self) -> usize {
        self.search.num_vertices()
    }

    /// Check that the bound start and goal are valid and collision free
    pub fn verify(&self, model: &PlanningModel<'_>) -> Result<()> {
        let start = self
            .start
            .as_ref()
            .ok_or_else(|| Error::PlanningFailed("no start configuration".to_owned()))?;
        let goal = self
            .goal
            .as_ref()
            .ok_or_else(|| Error::PlanningFailed("no goal configuration".to_owned()))?;
        if !model.is_valid(start) || model.is_colliding(start)? {
            return Err(Error::Collision {
                part: CollisionPart::Start,
            });
        }
        if !model.is_valid(goal) || model.is_colliding(goal)? {
            return Err(Error::Collision {
                part: CollisionPart::End,
            });
        }
        Ok(())
    }

    /// Search until a path is found or `duration` has passed
    ///
    /// Returns false on timeout. The path is available from `path`.
    pub fn solve(&mut self, ctx: &mut SolveContext<'_, '_>) -> Result<bool> {
        let (start, goal) = match (self.start.as_ref(), self.goal.as_ref()) {
            (Some(start), Some(goal)) => (start, goal),
            _ => return Err(Error::PlanningFailed("start or goal is not set".to_owned())),
        };
        let deadline = Instant::now() + self.duration;
        let found = match (&self.algorithm, &mut self.search) {
            (&Algorithm::Rrt { delta, epsilon }, Search::Trees(trees)) => {
                rrt::solve_rrt(trees, ctx, start, goal, delta, epsilon, None, deadline)?
            }
            (
                &Algorithm::RrtGoalBias {
                    delta,
                    epsilon,
                    probability,
                },
                Search::Trees(trees),
            ) => rrt::solve_rrt(
                trees,
                ctx,
                start,
                goal,
                delta,
                epsilon,
                Some((probability, &mut self.rng)),
                deadline,
            )?,
            (&Algorithm::RrtConCon { delta, epsilon }, Search::Trees(trees)) => {
                rrt::solve_con_con(trees, ctx, start, goal, delta, epsilon, deadline)?
            }
            (&Algorithm::Prm { degree, k, radius }, Search::Roadmap(roadmap)) => {
                prm::solve_prm(roadmap, ctx, start, goal, degree, k, radius, deadline)?
            }
            _ => return Err(Error::Other("search graph does not match the algorithm".to_owned())),
        };
        match found {
            Some(path) => {
                debug!(
                    "{} found a path of {} vertices ({} in the graph)",
                    self.kind(),
                    path.len(),
                    self.search.num_vertices()
                );
                self.path = path;
                Ok(true)
            }
            None => {
                self.path.clear();
                Ok(false)
            }
        }
    }

    /// Path of the last successful `solve`, from start to goal
    pub fn path(&self) -> &[Configuration] {
        &self.path
    }
}

/// Rebuild `nearest` from `points` if it does not hold them
fn sync_nearest<'p, I>(nearest: &mut dyn NearestNeighbours, synced: &mut bool, points: I) -> Result<()>
where
    I: ExactSizeIterator<Item = &'p [f64]>,
{
    if *synced && nearest.len() == points.len() {
        return Ok(());
    }
    nearest.clear();
    for (id, q) in points.enumerate() {
        nearest.push(q, id)?;
    }
    *synced = true;
    Ok(())
}
