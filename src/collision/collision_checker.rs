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
use super::urdf::urdf_geometry_to_shape_handle;
use crate::errors::*;
use log::*;
use nalgebra as na;
use ncollide3d::{
    query,
    shape::{Shape, ShapeHandle},
};
use std::{collections::HashMap, path::Path};

/// Shape placed relative to a parent frame
pub type PosedShape = (na::Isometry3<f64>, ShapeHandle<f64>);
type NameShapeMap = HashMap<String, Vec<PosedShape>>;

#[derive(Clone)]
/// Collision checker for a robot
///
/// Shapes are keyed by the name of the joint which moves the link.
pub struct CollisionChecker {
    name_collision_model_map: NameShapeMap,
    /// margin length for collision check
    pub prediction: f64,
}

impl CollisionChecker {
    /// Create CollisionChecker from HashMap
    pub fn new(name_collision_model_map: NameShapeMap, prediction: f64) -> Self {
        CollisionChecker {
            name_collision_model_map,
            prediction,
        }
    }

    /// Create CollisionChecker from urdf_rs::Robot
    ///
    /// base_dir: directory of the URDF, reported for skipped mesh geometry
    pub fn from_urdf_robot_with_base_dir(
        urdf_robot: &urdf_rs::Robot,
        base_dir: Option<&Path>,
        prediction: f64,
    ) -> Self {
        let mut name_collision_model_map = HashMap::new();
        let link_joint_map = k::urdf::link_to_joint_map(urdf_robot);
        for l in &urdf_robot.links {
            let col_pose_vec = l
                .collision
                .iter()
                .filter_map(|collision| {
                    urdf_geometry_to_shape_handle(&collision.geometry, base_dir)
                        .map(|col| (k::urdf::isometry_from(&collision.origin), col))
                })
                .collect::<Vec<_>>();
            debug!("name={}, ln={}", l.name, col_pose_vec.len());
            if !col_pose_vec.is_empty() {
                if let Some(joint_name) = link_joint_map.get(&l.name) {
                    name_collision_model_map.insert(joint_name.to_owned(), col_pose_vec);
                }
            }
        }
        CollisionChecker::new(name_collision_model_map, prediction)
    }

    /// Number of joints which carry collision shapes
    pub fn num_collision_links(&self) -> usize {
        self.name_collision_model_map.len()
    }

    /// Check if there are any colliding links
    pub fn has_any_colliding(
        &self,
        robot: &k::Chain<f64>,
        base: &na::Isometry3<f64>,
        target_shape: &dyn Shape<f64>,
        target_pose: &na::Isometry3<f64>,
    ) -> bool {
        !self
            .colliding_link_names_with_first_return_flag(
                robot,
                base,
                target_shape,
                target_pose,
                true,
            )
            .is_empty()
    }

    /// Returns the names which is colliding with the target shape/pose
    pub fn colliding_link_names(
        &self,
        robot: &k::Chain<f64>,
        base: &na::Isometry3<f64>,
        target_shape: &dyn Shape<f64>,
        target_pose: &na::Isometry3<f64>,
    ) -> Vec<String> {
        self.colliding_link_names_with_first_return_flag(
            robot,
            base,
            target_shape,
            target_pose,
            false,
        )
    }

    /// Check collision and return the names of the link(joint) names
    ///
    /// robot: robot model
    /// base: pose of the robot root in the world
    /// target_shape: Check collision with this shape and the robot
    /// target_pose: Check collision with this shape in this pose and the robot
    /// first_return: if true the function returns immediately when it found a collision.
    /// This flag is to make it fast.
    pub fn colliding_link_names_with_first_return_flag(
        &self,
        robot: &k::Chain<f64>,
        base: &na::Isometry3<f64>,
        target_shape: &dyn Shape<f64>,
        target_pose: &na::Isometry3<f64>,
        first_return: bool,
    ) -> Vec<String> {
        let mut names = Vec::new();
        robot.update_transforms();
        for joint in robot.iter() {
            let trans = match joint.world_transform() {
                Some(trans) => base * trans,
                None => continue,
            };
            let joint_name = joint.joint().name.clone();
            if let Some(obj_vec) = self.name_collision_model_map.get(&joint_name) {
                for obj in obj_vec {
                    // proximity and prediction does not work for meshes.
                    let dist =
                        query::distance(&(trans * obj.0), &*obj.1, target_pose, target_shape);
                    if dist <= self.prediction {
                        debug!("name: {}, dist={}", joint_name, dist);
                        names.push(joint_name);
                        if first_return {
                            return names;
                        } else {
                            break;
                        }
                    }
                }
            }
        }
        names
    }

    /// Smallest distance between any link of the robot and the target shape
    ///
    /// Returns None if the robot has no collision shapes.
    pub fn nearest_distance(
        &self,
        robot: &k::Chain<f64>,
        base: &na::Isometry3<f64>,
        target_shape: &dyn Shape<f64>,
        target_pose: &na::Isometry3<f64>,
    ) -> Option<f64> {
        robot.update_transforms();
        let mut nearest: Option<f64> = None;
        for joint in robot.iter() {
            let trans = match joint.world_transform() {
                Some(trans) => base * trans,
                None => continue,
            };
            let joint_name = joint.joint().name.clone();
            if let Some(obj_vec) = self.name_collision_model_map.get(&joint_name) {
                for obj in obj_vec {
                    let dist =
                        query::distance(&(trans * obj.0), &*obj.1, target_pose, target_shape);
                    nearest = Some(nearest.map_or(dist, |n| n.min(dist)));
                }
            }
        }
        nearest
    }

    /// Check if there are any self colliding links
    pub fn has_self_collision(
        &self,
        collision_check_robot: &k::Chain<f64>,
        self_collision_pairs: &[(String, String)],
    ) -> Result<bool> {
        Ok(!self
            .self_colliding_link_names_with_first_return_flag(
                collision_check_robot,
                self_collision_pairs,
                true,
            )?
            .is_empty())
    }

    /// Check self collision and return the names of the link(joint) names
    ///
    /// robot: robot model
    /// self_collision_pairs: pairs of the names of the link(joint)
    /// first_return: if true the function returns immediately when it found a collision.
    /// This flag is to make it fast.
    pub fn self_colliding_link_names_with_first_return_flag(
        &self,
        collision_check_robot: &k::Chain<f64>,
        self_collision_pairs: &[(String, String)],
        first_return: bool,
    ) -> Result<Vec<(String, String)>> {
        let mut names = Vec::new();
        collision_check_robot.update_transforms();
        for (j1, j2) in self_collision_pairs {
            let (obj_vec1, obj_vec2) = match (
                self.name_collision_model_map.get(j1),
                self.name_collision_model_map.get(j2),
            ) {
                (Some(obj_vec1), Some(obj_vec2)) => (obj_vec1, obj_vec2),
                _ => continue,
            };
            let node1 = collision_check_robot
                .find(j1)
                .ok_or_else(|| format!("self_colliding: {} not found", j1))?;
            let node2 = collision_check_robot
                .find(j2)
                .ok_or_else(|| format!("self_colliding: {} not found", j2))?;
            let (trans1, trans2) = match (node1.world_transform(), node2.world_transform()) {
                (Some(trans1), Some(trans2)) => (trans1, trans2),
                _ => return Err(format!("self_colliding: no transform for {}:{}", j1, j2).into()),
            };
            'pair: for obj1 in obj_vec1 {
                for obj2 in obj_vec2 {
                    // proximity and predict does not work correctly for mesh
                    let dist = query::distance(
                        &(trans1 * obj1.0),
                        &*obj1.1,
                        &(trans2 * obj2.0),
                        &*obj2.1,
                    );
                    debug!("name: {}, name: {} dist={}", j1, j2, dist);
                    if dist <= self.prediction {
                        names.push((j1.to_owned(), j2.to_owned()));
                        if first_return {
                            return Ok(names);
                        }
                        break 'pair;
                    }
                }
            }
        }
        Ok(names)
    }
}

/// Static shapes built from the `<collision>` elements of every link
///
/// The `<link>` elements are used as obstacles, placed by the origin of their
/// `<collision>` elements. You can skip `<inertia>`.
pub fn obstacle_shapes_from_urdf(
    urdf_obstacle: &urdf_rs::Robot,
    base_dir: Option<&Path>,
) -> Vec<PosedShape> {
    urdf_obstacle
        .links
        .iter()
        .flat_map(|l| l.collision.iter())
        .filter_map(|collision| {
            urdf_geometry_to_shape_handle(&collision.geometry, base_dir)
                .map(|col| (k::urdf::isometry_from(&collision.origin), col))
        })
        .collect()
}

pub fn parse_colon_separated_pairs(pair_strs: &[String]) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for pair_str in pair_strs {
        let mut sp = pair_str.split(':');
        match (sp.next(), sp.next()) {
            (Some(p1), Some(p2)) if !p1.is_empty() && !p2.is_empty() => {
                pairs.push((p1.to_owned(), p2.to_owned()));
            }
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "failed to parse {}",
                    pair_str
                )))
            }
        }
    }
    Ok(pairs)
}
