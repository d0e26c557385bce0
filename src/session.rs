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
//! Planning session: owns the scene, the robot model and every planner component

use log::*;
use std::path::Path;

use crate::config::*;
use crate::descriptor::PlanDescriptor;
use crate::errors::*;
use crate::funcs::*;
use crate::kinematics::{load_kinematic_model, KinematicModel};
use crate::nearest::{NearestNeighbours, NearestNeighboursKind};
use crate::optimizer::SimpleOptimizer;
use crate::planner::{Algorithm, Planner, PlannerKind, SolveContext};
use crate::planning_model::{ModelView, PlanningModel, PlanningModelKind};
use crate::sampler::{Sampler, UniformSampler};
use crate::scene::{create_scene, Scene};
use crate::verifier::{Verifier, VerifierKind};

/// Which model of the scene is the robot, and how the planner sees the scene
#[derive(Debug, Clone, Copy)]
struct ModelBinding {
    robot: usize,
    kind: PlanningModelKind,
}

/// Scene and robot model; the planning model is a view into them
#[derive(Default)]
struct World {
    /// Some only while the scene and the kinematics fit together
    binding: Option<ModelBinding>,
    kinematics: Option<Box<dyn KinematicModel>>,
    scene: Option<Box<dyn Scene>>,
}

impl World {
    fn planning_model(&self) -> Result<PlanningModel<'_>> {
        match (&self.binding, &self.kinematics, &self.scene) {
            (Some(binding), Some(kinematics), Some(scene)) => PlanningModel::new(
                binding.kind,
                scene.as_ref(),
                binding.robot,
                ModelView::of(kinematics.as_ref()),
            ),
            _ => Err(Error::NotInitialized(
                "kinematics and scene are not loaded",
            )),
        }
    }
}

/// Per call options of `Session::plan`
///
/// Zero or negative `delta`, `epsilon` and `timeout_ms` use the stored parameters.
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub start: Option<&'a [f64]>,
    pub goal: Option<&'a [f64]>,
    /// if false and the robot has 3 or more joints, the last joint of the goal
    /// is held at its start value
    pub use_z_axis: bool,
    pub planner_kind: Option<PlannerKind>,
    pub delta: f64,
    pub epsilon: f64,
    pub timeout_ms: i64,
}

impl Default for PlanRequest<'_> {
    fn default() -> Self {
        PlanRequest {
            start: None,
            goal: None,
            use_z_axis: true,
            planner_kind: None,
            delta: 0.0,
            epsilon: 0.0,
            timeout_ms: 0,
        }
    }
}

impl<'a> PlanRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn start(mut self, start: &'a [f64]) -> Self {
        self.start = Some(start);
        self
    }
    pub fn goal(mut self, goal: &'a [f64]) -> Self {
        self.goal = Some(goal);
        self
    }
    pub fn use_z_axis(mut self, use_z_axis: bool) -> Self {
        self.use_z_axis = use_z_axis;
        self
    }
    pub fn planner_kind(mut self, planner_kind: PlannerKind) -> Self {
        self.planner_kind = Some(planner_kind);
        self
    }
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
    pub fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Stateful root of planning
///
/// Components are created lazily and kept between calls of `plan`, so repeated
/// requests with the same parameters reuse the search graph. Fields are dropped
/// in declaration order, the planner first and the scene last.
pub struct Session {
    planner: Option<Planner>,
    optimizer: Option<SimpleOptimizer>,
    nearest: Option<Box<dyn NearestNeighbours>>,
    verifier: Option<Box<dyn Verifier>>,
    sampler: Option<Box<dyn Sampler>>,
    start: Option<Configuration>,
    goal: Option<Configuration>,
    planner_kind: Option<PlannerKind>,
    params: PlannerParams,
    nearest_kind: NearestNeighboursKind,
    verifier_kind: VerifierKind,
    config: SessionConfig,
    world: World,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Session {
            planner: None,
            optimizer: None,
            nearest: None,
            verifier: None,
            sampler: None,
            start: None,
            goal: None,
            planner_kind: None,
            params: config.params,
            nearest_kind: config.nearest,
            verifier_kind: config.verifier,
            config,
            world: World::default(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.world.planning_model().is_ok()
    }

    pub fn dof(&self) -> Result<usize> {
        Ok(self.world.planning_model()?.dof())
    }

    /// Whether the planning model uses the dynamic view of the robot
    pub fn is_dynamic(&self) -> bool {
        self.world
            .planning_model()
            .map_or(false, |model| model.view().is_dynamic())
    }

    pub fn robot_model_name(&self) -> Option<&str> {
        match (&self.world.binding, &self.world.scene) {
            (Some(binding), Some(scene)) => scene.model_name(binding.robot),
            _ => None,
        }
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    pub fn start(&self) -> Option<&[f64]> {
        self.start.as_deref()
    }

    pub fn goal(&self) -> Option<&[f64]> {
        self.goal.as_deref()
    }

    pub fn planner_kind(&self) -> Option<PlannerKind> {
        self.planner_kind
    }

    pub fn nearest_kind(&self) -> NearestNeighboursKind {
        self.nearest_kind
    }

    pub fn verifier_kind(&self) -> VerifierKind {
        self.verifier_kind
    }

    /// The persistent planner, if one has been built
    pub fn planner(&self) -> Option<&Planner> {
        self.planner.as_ref()
    }

    fn reset_components(&mut self) {
        self.planner = None;
        self.optimizer = None;
        self.nearest = None;
        self.verifier = None;
        self.sampler = None;
    }

    /// Drop the stored start and goal if they do not fit the planning model
    fn retain_fitting_configurations(&mut self) {
        let model = match self.world.planning_model() {
            Ok(model) => model,
            Err(_) => return,
        };
        if self.start.as_ref().map_or(false, |q| !model.is_valid(q)) {
            warn!("stored start does not fit the new model, dropped");
            self.start = None;
        }
        if self.goal.as_ref().map_or(false, |q| !model.is_valid(q)) {
            warn!("stored goal does not fit the new model, dropped");
            self.goal = None;
        }
    }

    fn bind(&mut self, robot: usize, kind: PlanningModelKind) -> Result<()> {
        self.world.binding = Some(ModelBinding { robot, kind });
        let dof = match self.world.planning_model() {
            Ok(model) => model.dof(),
            Err(e) => {
                self.world.binding = None;
                return Err(e);
            }
        };
        if dof == 0 {
            self.world.binding = None;
            return Err(Error::InvalidParameter(
                "robot has no movable joints".to_owned(),
            ));
        }
        self.retain_fitting_configurations();
        Ok(())
    }

    /// Load the robot model, as a dynamic model if the descriptor has mass properties
    ///
    /// If the session is initialized, the planning model is wired to the new model
    /// and all planner components are discarded.
    pub fn load_kinematics<P>(&mut self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let kinematics = load_kinematic_model(path)?;
        debug!("{:?}: {} joints", path, kinematics.dof());
        self.world.kinematics = Some(kinematics);
        self.reset_components();
        if let Some(binding) = self.world.binding.take() {
            self.bind(binding.robot, binding.kind)?;
        }
        Ok(())
    }

    /// Load the scene and bind the model at `robot` as the robot
    ///
    /// Without kinematics the scene is kept, but the session stays
    /// uninitialized and `NotInitialized` is returned.
    pub fn load_scene<P>(&mut self, path: P, robot: usize) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut scene = create_scene(&self.config.backends)?;
        scene.load(path)?;
        if robot >= scene.num_models() {
            return Err(Error::InvalidParameter(format!(
                "robot model index {} out of range 0..{}",
                robot,
                scene.num_models()
            )));
        }
        let kind = PlanningModelKind::for_scene(scene.as_ref());
        self.world.binding = None;
        self.world.scene = Some(scene);
        self.reset_components();
        if self.world.kinematics.is_none() {
            warn!("scene {:?} loaded before kinematics, load kinematics and the scene again", path);
            return Err(Error::NotInitialized("kinematics are not loaded"));
        }
        self.bind(robot, kind)?;
        debug!(
            "{:?}: robot {:?} ({} joints, {:?})",
            path,
            self.robot_model_name(),
            self.dof()?,
            kind
        );
        Ok(())
    }

    /// Load a plan recipe, then the kinematics and the scene it names
    ///
    /// The planner components are built eagerly with the parameters of the recipe.
    /// If a file fails to load, the planner parameters of the session are unchanged.
    pub fn load_plan<P>(&mut self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let descriptor = PlanDescriptor::from_file(path)?;
        self.load_kinematics(&descriptor.kinematics)?;
        self.load_scene(&descriptor.scene, descriptor.robot)?;
        if let Some(ref start) = descriptor.start {
            self.set_start(start)?;
        }
        if let Some(ref goal) = descriptor.goal {
            self.set_goal(goal)?;
        }
        self.params = descriptor.params;
        self.planner_kind = Some(descriptor.planner_kind);
        self.nearest_kind = descriptor.nearest;
        self.verifier_kind = descriptor.verifier;
        self.build_components();
        debug!(
            "plan {} with {:?}",
            descriptor.planner_kind, descriptor.params
        );
        Ok(())
    }

    fn build_components(&mut self) {
        let params = self.params;
        let seed = self.config.seed;
        self.sampler = Some(new_sampler(seed));
        self.verifier = Some(self.verifier_kind.create(params.delta));
        self.nearest = Some(self.nearest_kind.create());
        self.optimizer = Some(SimpleOptimizer::new());
        let mut planner = new_planner(self.planner_kind.unwrap_or_default(), &params, seed);
        if let Some(ref start) = self.start {
            planner.set_start(start.clone());
        }
        if let Some(ref goal) = self.goal {
            planner.set_goal(goal.clone());
        }
        self.planner = Some(planner);
    }

    fn checked_configuration(&self, q: &[f64], name: &str) -> Result<Configuration> {
        let model = self.world.planning_model()?;
        if q.len() != model.dof() {
            return Err(Error::SizeMismatch {
                expected: model.dof(),
                actual: q.len(),
            });
        }
        if !model.is_valid(q) {
            return Err(Error::InvalidParameter(format!(
                "{} {:?} is out of the joint limits",
                name, q
            )));
        }
        Ok(q.to_vec())
    }

    pub fn set_start(&mut self, start: &[f64]) -> Result<()> {
        let start = self.checked_configuration(start, "start")?;
        if let Some(ref mut planner) = self.planner {
            planner.set_start(start.clone());
        }
        self.start = Some(start);
        Ok(())
    }

    pub fn set_goal(&mut self, goal: &[f64]) -> Result<()> {
        let goal = self.checked_configuration(goal, "goal")?;
        if let Some(ref mut planner) = self.planner {
            planner.set_goal(goal.clone());
        }
        self.goal = Some(goal);
        Ok(())
    }

    /// Plan a collision free path and return it from start to goal
    pub fn plan(&mut self, request: &PlanRequest<'_>) -> Result<Vec<Configuration>> {
        let model = self.world.planning_model()?;
        let dof = model.dof();
        let resolve = |given: Option<&[f64]>, stored: &Option<Configuration>, name: &str| {
            match (given, stored) {
                (Some(q), _) if q.len() != dof => Err(Error::SizeMismatch {
                    expected: dof,
                    actual: q.len(),
                }),
                (Some(q), _) => Ok(q.to_vec()),
                (None, Some(q)) => Ok(q.clone()),
                (None, None) => Err(Error::InvalidParameter(format!(
                    "no {} configuration",
                    name
                ))),
            }
        };
        let start = resolve(request.start, &self.start, "start")?;
        let mut goal = resolve(request.goal, &self.goal, "goal")?;
        if !request.use_z_axis && dof >= 3 {
            goal[dof - 1] = start[dof - 1];
        }

        let kind = request
            .planner_kind
            .or(self.planner_kind)
            .unwrap_or_default();
        if self.planner_kind.is_none() {
            self.planner_kind = Some(kind);
        }
        let params = self
            .params
            .merged(request.delta, request.epsilon, request.timeout_ms);
        params.check()?;
        let seed = self.config.seed;

        let sampler = self.sampler.get_or_insert_with(|| new_sampler(seed));
        let verifier_kind = self.verifier_kind;
        let verifier = self
            .verifier
            .get_or_insert_with(|| verifier_kind.create(params.delta));
        verifier.set_delta(params.delta);
        let nearest_kind = self.nearest_kind;
        let nearest = self.nearest.get_or_insert_with(|| nearest_kind.create());
        let optimizer = self.optimizer.get_or_insert_with(SimpleOptimizer::new);
        let planner = match self.planner.take() {
            Some(planner) if planner.is_built_for(kind, params.delta, params.epsilon) => {
                self.planner.insert(planner)
            }
            _ => {
                debug!("building {} planner", kind);
                self.planner.insert(new_planner(kind, &params, seed))
            }
        };
        planner.set_start(start);
        planner.set_goal(goal);
        planner.set_duration(params.timeout);

        planner.verify(&model)?;
        let mut ctx = SolveContext {
            model: &model,
            sampler: sampler.as_mut(),
            verifier: verifier.as_ref(),
            nearest: nearest.as_mut(),
        };
        if !planner.solve(&mut ctx)? {
            return Err(Error::PlanningFailed(format!(
                "{} found no path within {:?}",
                kind, params.timeout
            )));
        }
        let mut path = planner.path().to_vec();
        optimizer.process(&model, verifier.as_ref(), &mut path)?;
        Ok(path)
    }

    /// Whether `q` is within the joint limits and collision free
    ///
    /// The check runs the verifier on the path `[q, q]`.
    pub fn is_valid_configuration(&mut self, q: &[f64]) -> Result<bool> {
        let model = self.world.planning_model()?;
        if q.len() != model.dof() || !model.is_valid(q) {
            return Ok(false);
        }
        let (verifier_kind, delta) = (self.verifier_kind, self.params.delta);
        let verifier = self
            .verifier
            .get_or_insert_with(|| verifier_kind.create(delta));
        verifier.is_valid_path(&model, &[q.to_vec(), q.to_vec()])
    }
}

fn new_sampler(seed: Option<u64>) -> Box<dyn Sampler> {
    match seed {
        Some(seed) => Box::new(UniformSampler::with_seed(seed)),
        None => Box::new(UniformSampler::new()),
    }
}

fn new_planner(kind: PlannerKind, params: &PlannerParams, seed: Option<u64>) -> Planner {
    let algorithm = Algorithm::new(kind, params.delta, params.epsilon);
    let mut planner = match seed {
        Some(seed) => Planner::with_seed(algorithm, seed.wrapping_add(1)),
        None => Planner::new(algorithm),
    };
    planner.set_duration(params.timeout);
    planner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar_session(scene: &str) -> Session {
        let mut session = Session::with_config(SessionConfig::new().seed(42));
        session.load_kinematics("sample/planar_arm.urdf").unwrap();
        session.load_scene(scene, 0).unwrap();
        session
    }

    #[test]
    fn test_lifecycle() {
        let mut session = Session::new();
        assert!(!session.is_initialized());
        assert_eq!(session.dof().err().unwrap().code(), ErrorCode::NotInitialized);
        assert_eq!(
            session.set_start(&[0.0, 0.0]).err().unwrap().code(),
            ErrorCode::NotInitialized
        );
        session.load_kinematics("sample/planar_arm.urdf").unwrap();
        assert!(!session.is_initialized());
        session.load_scene("sample/empty_scene.xml", 0).unwrap();
        assert!(session.is_initialized());
        assert_eq!(session.dof().unwrap(), 2);
        assert_eq!(session.robot_model_name(), Some("arm"));
        assert!(!session.is_dynamic());
    }

    #[test]
    fn test_scene_before_kinematics() {
        let mut session = Session::new();
        let err = session.load_scene("sample/empty_scene.xml", 0).err().unwrap();
        assert_eq!(err.code(), ErrorCode::NotInitialized);
        assert!(!session.is_initialized());
        session.load_kinematics("sample/planar_arm.urdf").unwrap();
        assert!(!session.is_initialized());
        session.load_scene("sample/empty_scene.xml", 0).unwrap();
        assert!(session.is_initialized());
    }

    #[test]
    fn test_load_scene_errors() {
        let mut session = Session::new();
        session.load_kinematics("sample/planar_arm.urdf").unwrap();
        let err = session.load_scene("sample/empty_scene.xml", 3).err().unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        let err = session.load_scene("sample/missing.xml", 0).err().unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed);
        let err = session.load_kinematics("sample/missing.urdf").err().unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed);
    }

    #[test]
    fn test_set_start_and_goal() {
        let mut session = planar_session("sample/empty_scene.xml");
        assert_eq!(
            session.set_start(&[0.0]).err().unwrap().code(),
            ErrorCode::InvalidParameter
        );
        assert_eq!(
            session.set_goal(&[0.0, 5.0]).err().unwrap().code(),
            ErrorCode::InvalidParameter
        );
        session.set_start(&[0.0, 0.0]).unwrap();
        session.set_goal(&[1.0, 0.5]).unwrap();
        assert_eq!(session.start(), Some(&[0.0, 0.0][..]));
        assert_eq!(session.goal(), Some(&[1.0, 0.5][..]));
    }

    #[test]
    fn test_plan_with_stored_configurations() {
        let mut session = planar_session("sample/empty_scene.xml");
        let err = session.plan(&PlanRequest::new()).err().unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        session.set_start(&[0.0, 0.0]).unwrap();
        session.set_goal(&[1.0, 0.5]).unwrap();
        let path = session
            .plan(&PlanRequest::new().planner_kind(PlannerKind::Rrt))
            .unwrap();
        assert!(path.len() >= 2);
        assert_eq!(path[0], vec![0.0, 0.0]);
        assert_eq!(path[path.len() - 1], vec![1.0, 0.5]);
        assert_eq!(session.planner_kind(), Some(PlannerKind::Rrt));
        // stored parameters are not changed by the request
        let path = session
            .plan(&PlanRequest::new().planner_kind(PlannerKind::Rrt).delta(0.05))
            .unwrap();
        assert_eq!(path[path.len() - 1], vec![1.0, 0.5]);
        assert_eq!(session.params().delta, 0.1);
    }

    #[test]
    fn test_planner_is_reused() {
        let mut session = planar_session("sample/empty_scene.xml");
        let request = PlanRequest::new()
            .start(&[0.0, 0.0])
            .goal(&[1.0, 0.5])
            .planner_kind(PlannerKind::Prm);
        session.plan(&request).unwrap();
        let vertices = session.planner().unwrap().num_vertices();
        session.plan(&request.clone().goal(&[-1.0, 0.5])).unwrap();
        // the roadmap is kept for a new goal
        assert!(session.planner().unwrap().num_vertices() >= vertices);
        session
            .plan(&request.clone().planner_kind(PlannerKind::RrtConCon))
            .unwrap();
        assert_eq!(session.planner().unwrap().kind(), PlannerKind::RrtConCon);
    }

    #[test]
    fn test_plan_blocked_goal() {
        let mut session = planar_session("sample/blocked_scene.xml");
        let err = session
            .plan(&PlanRequest::new().start(&[0.0, 0.0]).goal(&[1.0, 0.5]))
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::PlanningFailed);
    }

    #[test]
    fn test_optimized_path_segments_are_free() {
        for kind in [PlannerKind::RrtConCon, PlannerKind::Prm] {
            let mut session = planar_session("sample/blocked_scene.xml");
            let path = session
                .plan(
                    &PlanRequest::new()
                        .start(&[0.6, 0.5])
                        .goal(&[1.4, 0.5])
                        .planner_kind(kind)
                        .delta(0.05)
                        .timeout_ms(10_000),
                )
                .unwrap();
            assert!(path.len() >= 3, "{}: the direct segment is blocked", kind);
            let model = session.world.planning_model().unwrap();
            let verifier = session.verifier.as_ref().unwrap();
            assert_eq!(verifier.delta(), 0.05);
            for segment in path.windows(2) {
                assert!(
                    !verifier
                        .is_colliding(&model, &segment[0], &segment[1])
                        .unwrap(),
                    "{}: {:?}",
                    kind,
                    segment
                );
            }
        }
    }

    #[test]
    fn test_plan_ignores_unusable_overrides() {
        let mut session = planar_session("sample/blocked_scene.xml");
        let path = session
            .plan(
                &PlanRequest::new()
                    .start(&[0.6, 0.5])
                    .goal(&[1.4, 0.5])
                    .planner_kind(PlannerKind::Rrt)
                    .delta(f64::INFINITY)
                    .epsilon(f64::NAN),
            )
            .unwrap();
        // the stored delta is used, so the path cannot jump through the block
        assert!(path.len() >= 3);
        assert_eq!(session.planner().unwrap().algorithm(), &Algorithm::new(PlannerKind::Rrt, 0.1, 0.001));

        let mut session = Session::with_config(SessionConfig::new().params(PlannerParams {
            delta: 0.0,
            ..PlannerParams::default()
        }));
        session.load_kinematics("sample/planar_arm.urdf").unwrap();
        session.load_scene("sample/empty_scene.xml", 0).unwrap();
        let err = session
            .plan(&PlanRequest::new().start(&[0.0, 0.0]).goal(&[1.0, 0.5]))
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_failed_plan_keeps_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = dir.path().join("broken.plan.xml");
        let urdf = Path::new(env!("CARGO_MANIFEST_DIR")).join("sample/planar_arm.urdf");
        std::fs::write(
            &recipe,
            format!(
                "<rlplan><model><kinematics href=\"{}\"/><scene href=\"missing.xml\"/></model>\
                 <prm><delta>0.5</delta><kdtreeNearestNeighbors/><sequentialVerifier/></prm></rlplan>",
                urdf.display()
            ),
        )
        .unwrap();
        let mut session = Session::new();
        let err = session.load_plan(&recipe).err().unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed);
        assert_eq!(session.params(), &PlannerParams::default());
        assert_eq!(session.planner_kind(), None);
        assert_eq!(session.nearest_kind(), NearestNeighboursKind::Linear);
        assert_eq!(session.verifier_kind(), VerifierKind::Recursive);
    }

    #[test]
    fn test_is_valid_configuration() {
        let mut session = Session::new();
        assert!(session.is_valid_configuration(&[0.0, 0.0]).is_err());
        let mut session = planar_session("sample/blocked_scene.xml");
        assert!(session.is_valid_configuration(&[0.0, 0.0]).unwrap());
        assert!(!session.is_valid_configuration(&[1.0, 0.5]).unwrap());
        assert!(!session.is_valid_configuration(&[0.0]).unwrap());
        assert!(!session.is_valid_configuration(&[4.0, 0.0]).unwrap());
    }

    #[test]
    fn test_reload_kinematics() {
        let mut session = Session::new();
        session.load_kinematics("sample/planar_arm.urdf").unwrap();
        session.load_scene("sample/empty_scene.xml", 0).unwrap();
        session.set_start(&[0.0, 0.0]).unwrap();
        session.load_kinematics("sample/dynamic_arm.urdf").unwrap();
        assert!(session.is_initialized());
        assert!(session.is_dynamic());
        assert_eq!(session.start(), Some(&[0.0, 0.0][..]));
        session.load_kinematics("sample/arm_3dof.urdf").unwrap();
        assert_eq!(session.dof().unwrap(), 3);
        assert_eq!(session.start(), None);
    }
}
