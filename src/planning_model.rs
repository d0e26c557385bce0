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
use crate::errors::*;
use crate::funcs::*;
use crate::kinematics::{DynamicModel, KinematicModel};
use crate::scene::Scene;

/// Variant of the planning model, chosen from the capability of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningModelKind {
    Simple,
    Distance,
}

impl PlanningModelKind {
    pub fn for_scene(scene: &dyn Scene) -> Self {
        if scene.supports_distance() {
            PlanningModelKind::Distance
        } else {
            PlanningModelKind::Simple
        }
    }
}

/// The robot model the planner sees: kinematic or dynamic, never both
#[derive(Clone, Copy)]
pub enum ModelView<'a> {
    Kinematic(&'a dyn KinematicModel),
    Dynamic(&'a dyn DynamicModel),
}

impl<'a> ModelView<'a> {
    /// Prefer the dynamic capability when the model has one
    pub fn of(model: &'a dyn KinematicModel) -> Self {
        match model.as_dynamic() {
            Some(dynamic) => ModelView::Dynamic(dynamic),
            None => ModelView::Kinematic(model),
        }
    }

    pub fn chain(&self) -> &'a k::Chain<f64> {
        match *self {
            ModelView::Kinematic(model) => model.chain(),
            ModelView::Dynamic(model) => model.chain(),
        }
    }

    fn limits(&self) -> Vec<Option<JointRange>> {
        match *self {
            ModelView::Kinematic(model) => model.limits(),
            ModelView::Dynamic(model) => model.limits(),
        }
    }

    fn set_joint_positions(&self, positions: &[f64]) -> Result<()> {
        match *self {
            ModelView::Kinematic(model) => model.set_joint_positions(positions),
            ModelView::Dynamic(model) => model.set_joint_positions(positions),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ModelView::Dynamic(_))
    }
}

/// Scene and robot model joined into the interface used by the planners
///
/// Borrows every part, so it cannot outlive the session which owns them.
#[derive(Clone)]
pub struct PlanningModel<'a> {
    kind: PlanningModelKind,
    scene: &'a dyn Scene,
    robot: usize,
    view: ModelView<'a>,
    limits: Vec<Option<JointRange>>,
}

impl<'a> PlanningModel<'a> {
    pub fn new(
        kind: PlanningModelKind,
        scene: &'a dyn Scene,
        robot: usize,
        view: ModelView<'a>,
    ) -> Result<Self> {
        if robot >= scene.num_models() {
            return Err(Error::InvalidParameter(format!(
                "robot model index {} out of range 0..{}",
                robot,
                scene.num_models()
            )));
        }
        let limits = view.limits();
        Ok(PlanningModel {
            kind,
            scene,
            robot,
            view,
            limits,
        })
    }

    pub fn kind(&self) -> PlanningModelKind {
        self.kind
    }

    pub fn scene(&self) -> &'a dyn Scene {
        self.scene
    }

    pub fn robot(&self) -> usize {
        self.robot
    }

    pub fn robot_name(&self) -> Option<&'a str> {
        self.scene.model_name(self.robot)
    }

    pub fn view(&self) -> ModelView<'a> {
        self.view
    }

    pub fn dof(&self) -> usize {
        self.limits.len()
    }

    pub fn limits(&self) -> &[Option<JointRange>] {
        &self.limits
    }

    /// Size, finiteness and joint limits; does not touch the scene
    pub fn is_valid(&self, q: &[f64]) -> bool {
        q.len() == self.dof()
            && q.iter().zip(self.limits.iter()).all(|(v, range)| {
                v.is_finite() && range.as_ref().map_or(true, |range| range.contains(*v))
            })
    }

    /// Pose the robot at `q` and check it against the scene
    pub fn is_colliding(&self, q: &[f64]) -> Result<bool> {
        if q.len() != self.dof() {
            return Err(Error::SizeMismatch {
                expected: self.dof(),
                actual: q.len(),
            });
        }
        self.view.set_joint_positions(q)?;
        self.scene.is_colliding(self.robot, self.view.chain())
    }

    /// Distance from the robot at `q` to the nearest obstacle
    ///
    /// Only the distance variant answers; the simple variant returns None.
    pub fn obstacle_distance(&self, q: &[f64]) -> Result<Option<f64>> {
        match self.kind {
            PlanningModelKind::Simple => Ok(None),
            PlanningModelKind::Distance => {
                self.view.set_joint_positions(q)?;
                self.scene.distance(self.robot, self.view.chain())
            }
        }
    }

    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        distance(a, b)
    }

    pub fn interpolate(&self, a: &[f64], b: &[f64], alpha: f64) -> Configuration {
        lerp(a, b, alpha)
    }

    pub fn step(&self, from: &[f64], to: &[f64], step_length: f64) -> Configuration {
        step_toward(from, to, step_length)
    }
}
