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
//! Scenes of named models and the collision backends which load them

use log::*;
use nalgebra as na;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collision::*;
use crate::errors::*;

/// Collision backends in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneBackend {
    Ncollide,
}

/// Default backend priority
pub const BACKEND_PRIORITY: &[SceneBackend] = &[SceneBackend::Ncollide];

impl SceneBackend {
    pub fn is_available(self) -> bool {
        match self {
            SceneBackend::Ncollide => true,
        }
    }

    fn create(self) -> Box<dyn Scene> {
        match self {
            SceneBackend::Ncollide => Box::new(NcollideScene::default()),
        }
    }
}

/// Create an empty scene with the first available backend of `priority`
pub fn create_scene(priority: &[SceneBackend]) -> Result<Box<dyn Scene>> {
    let backend = priority
        .iter()
        .copied()
        .find(|backend| backend.is_available())
        .ok_or(Error::NoCollisionBackend)?;
    debug!("using collision backend {:?}", backend);
    Ok(backend.create())
}

/// Geometry and collision queries of a set of named models
pub trait Scene {
    fn backend(&self) -> SceneBackend;

    /// Replace the contents of this scene with the descriptor at `path`
    fn load(&mut self, path: &Path) -> Result<()>;

    fn num_models(&self) -> usize;

    fn model_name(&self, index: usize) -> Option<&str>;

    /// Whether `distance` is supported
    fn supports_distance(&self) -> bool {
        false
    }

    /// Check the model at `robot`, posed by `chain`, against the rest of the scene
    fn is_colliding(&self, robot: usize, chain: &k::Chain<f64>) -> Result<bool>;

    /// Smallest distance between the model at `robot` and the rest of the scene
    ///
    /// Returns None if there is nothing to measure against.
    fn distance(&self, robot: usize, chain: &k::Chain<f64>) -> Result<Option<f64>> {
        let _ = (robot, chain);
        Err(Error::Other(format!(
            "{:?} does not support distance queries",
            self.backend()
        )))
    }
}

/// Model of a scene, loaded from a URDF
pub struct SceneModel {
    pub name: String,
    pub pose: na::Isometry3<f64>,
    /// shapes following the joints, used when this model is the robot
    checker: CollisionChecker,
    /// shapes fixed at `pose`, used when this model is an obstacle
    shapes: Vec<PosedShape>,
    self_collision_pairs: Vec<(String, String)>,
}

impl SceneModel {
    pub fn num_shapes(&self) -> usize {
        self.shapes.len()
    }
    pub fn self_collision_pairs(&self) -> &[(String, String)] {
        &self.self_collision_pairs
    }
}

/// Scene of URDF models checked with `ncollide3d`
///
/// ```xml
/// <scene margin="0.01">
///   <model name="arm" href="arm.urdf">
///     <selfCollision pair="shoulder:wrist"/>
///   </model>
///   <model name="table" href="table.urdf" xyz="0.5 0 0" rpy="0 0 0"/>
/// </scene>
/// ```
#[derive(Default)]
pub struct NcollideScene {
    models: Vec<SceneModel>,
    margin: f64,
}

impl NcollideScene {
    pub fn models(&self) -> &[SceneModel] {
        &self.models
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    fn robot(&self, robot: usize) -> Result<&SceneModel> {
        self.models.get(robot).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "model index {} out of range 0..{}",
                robot,
                self.models.len()
            ))
        })
    }

    fn obstacles(&self, robot: usize) -> impl Iterator<Item = &SceneModel> {
        self.models
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != robot)
            .map(|(_, model)| model)
    }
}

impl Scene for NcollideScene {
    fn backend(&self) -> SceneBackend {
        SceneBackend::Ncollide
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
        let document = roxmltree::Document::parse(&text).map_err(|e| Error::load(path, e))?;
        let root = document.root_element();
        if root.tag_name().name() != "scene" {
            return Err(Error::load(
                path,
                format!("root element is <{}>, not <scene>", root.tag_name().name()),
            ));
        }
        let margin = match root.attribute("margin") {
            Some(margin) => margin
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::load(path, format!("margin: {}", e)))?,
            None => 0.0,
        };
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut models = Vec::new();
        for node in root
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "model")
        {
            models.push(load_model(&node, &base_dir, margin).map_err(|e| match e {
                Error::Load { .. } => e,
                e => Error::load(path, e),
            })?);
        }
        debug!("{:?}: {} models, margin={}", path, models.len(), margin);
        self.models = models;
        self.margin = margin;
        Ok(())
    }

    fn num_models(&self) -> usize {
        self.models.len()
    }

    fn model_name(&self, index: usize) -> Option<&str> {
        self.models.get(index).map(|model| model.name.as_str())
    }

    fn supports_distance(&self) -> bool {
        true
    }

    fn is_colliding(&self, robot: usize, chain: &k::Chain<f64>) -> Result<bool> {
        let robot_model = self.robot(robot)?;
        for obstacle in self.obstacles(robot) {
            for shape in &obstacle.shapes {
                let target_pose = obstacle.pose * shape.0;
                if robot_model.checker.has_any_colliding(
                    chain,
                    &robot_model.pose,
                    &*shape.1,
                    &target_pose,
                ) {
                    debug!("{} is colliding with {}", robot_model.name, obstacle.name);
                    return Ok(true);
                }
            }
        }
        robot_model
            .checker
            .has_self_collision(chain, &robot_model.self_collision_pairs)
    }

    fn distance(&self, robot: usize, chain: &k::Chain<f64>) -> Result<Option<f64>> {
        let robot_model = self.robot(robot)?;
        let mut nearest: Option<f64> = None;
        for obstacle in self.obstacles(robot) {
            for shape in &obstacle.shapes {
                let target_pose = obstacle.pose * shape.0;
                if let Some(dist) = robot_model.checker.nearest_distance(
                    chain,
                    &robot_model.pose,
                    &*shape.1,
                    &target_pose,
                ) {
                    nearest = Some(nearest.map_or(dist, |n| n.min(dist)));
                }
            }
        }
        Ok(nearest)
    }
}

fn parse_triple(text: &str) -> Result<[f64; 3]> {
    let values = text
        .split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<::std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::InvalidParameter(format!("{}: {}", text, e)))?;
    match values.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(Error::InvalidParameter(format!(
            "expected three values, got {:?}",
            text
        ))),
    }
}

fn load_model(node: &roxmltree::Node<'_, '_>, base_dir: &Path, margin: f64) -> Result<SceneModel> {
    let href = node
        .attribute("href")
        .ok_or_else(|| Error::InvalidParameter("<model> without href".to_owned()))?;
    let urdf_path: PathBuf = base_dir.join(href);
    let urdf_robot = urdf_rs::read_file(&urdf_path).map_err(|e| Error::load(&urdf_path, e))?;
    let name = node
        .attribute("name")
        .map(str::to_owned)
        .unwrap_or_else(|| urdf_robot.name.clone());
    let xyz = node.attribute("xyz").map(parse_triple).transpose()?;
    let rpy = node.attribute("rpy").map(parse_triple).transpose()?;
    let [x, y, z] = xyz.unwrap_or_default();
    let [roll, pitch, yaw] = rpy.unwrap_or_default();
    let pose = na::Isometry3::from_parts(
        na::Translation3::new(x, y, z),
        na::UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    );
    let pair_strs = node
        .children()
        .filter(|child| child.is_element() && child.tag_name().name() == "selfCollision")
        .filter_map(|child| child.attribute("pair").map(str::to_owned))
        .collect::<Vec<_>>();
    let model_dir = urdf_path.parent();
    Ok(SceneModel {
        name,
        pose,
        checker: CollisionChecker::from_urdf_robot_with_base_dir(&urdf_robot, model_dir, margin),
        shapes: obstacle_shapes_from_urdf(&urdf_robot, model_dir),
        self_collision_pairs: parse_colon_separated_pairs(&pair_strs)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::*;

    #[test]
    fn test_create_scene() {
        let scene = create_scene(BACKEND_PRIORITY).unwrap();
        assert_eq!(scene.backend(), SceneBackend::Ncollide);
        assert_eq!(scene.num_models(), 0);
        assert!(matches!(
            create_scene(&[]).err().unwrap(),
            Error::NoCollisionBackend
        ));
    }

    #[test]
    fn test_load_scene() {
        let mut scene = NcollideScene::default();
        scene.load(Path::new("sample/blocked_scene.xml")).unwrap();
        assert_eq!(scene.num_models(), 2);
        assert_eq!(scene.model_name(0), Some("arm"));
        assert_eq!(scene.model_name(1), Some("block"));
        assert_eq!(scene.models()[1].num_shapes(), 1);
        assert!(scene.supports_distance());
    }

    #[test]
    fn test_collision_against_obstacle() {
        let mut scene = NcollideScene::default();
        scene.load(Path::new("sample/blocked_scene.xml")).unwrap();
        let arm = load_kinematic_model("sample/planar_arm.urdf").unwrap();

        arm.set_joint_positions(&[0.0, 0.0]).unwrap();
        assert!(!scene.is_colliding(0, arm.chain()).unwrap());
        let free_distance = scene.distance(0, arm.chain()).unwrap().unwrap();
        assert!(free_distance > 0.5);

        // the block sits on the tip of the arm in this configuration
        arm.set_joint_positions(&[1.0, 0.5]).unwrap();
        assert!(scene.is_colliding(0, arm.chain()).unwrap());
        assert!(scene.is_colliding(5, arm.chain()).is_err());
    }

    #[test]
    fn test_load_scene_errors() {
        let mut scene = NcollideScene::default();
        let err = scene.load(Path::new("sample/missing.xml")).err().unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed);
        let err = scene.load(Path::new("sample/planar_arm.urdf")).err().unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed);
    }

    #[test]
    fn test_parse_triple() {
        assert_eq!(parse_triple("1 2.5 -3").unwrap(), [1.0, 2.5, -3.0]);
        assert!(parse_triple("1 2").is_err());
        assert!(parse_triple("a b c").is_err());
    }
}
