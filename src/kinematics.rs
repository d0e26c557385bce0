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
//! Kinematic and dynamic robot models loaded from URDF

use log::*;
use nalgebra as na;
use std::path::Path;

use crate::errors::*;
use crate::funcs::*;

/// Joint topology, forward kinematics and joint limits of a robot
pub trait KinematicModel {
    /// The kinematic chain, which also computes forward kinematics
    fn chain(&self) -> &k::Chain<f64>;

    fn dof(&self) -> usize {
        self.chain().dof()
    }

    /// Limits of the movable joints, None for unlimited (continuous) joints
    fn limits(&self) -> Vec<Option<JointRange>> {
        self.chain()
            .iter_joints()
            .map(|joint| {
                joint
                    .limits
                    .as_ref()
                    .map(|range| JointRange::new(range.min, range.max))
            })
            .collect()
    }

    fn set_joint_positions(&self, positions: &[f64]) -> Result<()> {
        Ok(self.chain().set_joint_positions(positions)?)
    }

    /// The dynamics capability, if this model has one
    fn as_dynamic(&self) -> Option<&dyn DynamicModel> {
        None
    }
}

/// Mass properties of the link moved by a joint
#[derive(Debug, Clone, PartialEq)]
pub struct LinkInertia {
    pub joint_name: String,
    pub mass: f64,
    /// center of mass in the link frame
    pub center_of_mass: na::Vector3<f64>,
}

/// Kinematic model which also carries the mass properties of every moving link
pub trait DynamicModel: KinematicModel {
    fn inertias(&self) -> &[LinkInertia];

    fn gravity(&self) -> na::Vector3<f64>;

    fn total_mass(&self) -> f64 {
        self.inertias().iter().map(|inertia| inertia.mass).sum()
    }

    /// Center of mass of the moving links at the current joint positions
    fn center_of_mass(&self) -> Result<na::Point3<f64>> {
        let chain = self.chain();
        chain.update_transforms();
        let mut weighted = na::Vector3::zeros();
        for inertia in self.inertias() {
            let node = chain
                .find(&inertia.joint_name)
                .ok_or_else(|| format!("joint {} not found", inertia.joint_name))?;
            let trans = node
                .world_transform()
                .ok_or_else(|| format!("no transform for {}", inertia.joint_name))?;
            let com = trans * na::Point3::from(inertia.center_of_mass);
            weighted += com.coords * inertia.mass;
        }
        let total = self.total_mass();
        if total <= 0.0 {
            return Err(Error::Other("total mass is zero".to_owned()));
        }
        Ok(na::Point3::from(weighted / total))
    }
}

/// Kinematic model built from a URDF
pub struct UrdfKinematics {
    chain: k::Chain<f64>,
}

impl UrdfKinematics {
    pub fn from_urdf_robot(urdf_robot: &urdf_rs::Robot) -> Self {
        UrdfKinematics {
            chain: k::Chain::from(urdf_robot),
        }
    }

    pub fn from_urdf_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self::from_urdf_robot(&urdf_rs::read_file(path)?))
    }
}

impl KinematicModel for UrdfKinematics {
    fn chain(&self) -> &k::Chain<f64> {
        &self.chain
    }
}

/// Dynamic model built from a URDF whose moving links all declare their inertia
pub struct UrdfDynamics {
    chain: k::Chain<f64>,
    inertias: Vec<LinkInertia>,
    gravity: na::Vector3<f64>,
}

impl UrdfDynamics {
    /// Returns None if any link moved by a joint has no positive mass
    pub fn from_urdf_robot(urdf_robot: &urdf_rs::Robot) -> Option<Self> {
        let mut inertias = Vec::new();
        for joint in &urdf_robot.joints {
            if let urdf_rs::JointType::Fixed = joint.joint_type {
                continue;
            }
            let link = urdf_robot
                .links
                .iter()
                .find(|link| link.name == joint.child.link)?;
            let mass = link.inertial.mass.value;
            if mass <= 0.0 {
                debug!("link {} has no mass, not a dynamic model", link.name);
                return None;
            }
            let xyz = &link.inertial.origin.xyz;
            inertias.push(LinkInertia {
                joint_name: joint.name.clone(),
                mass,
                center_of_mass: na::Vector3::new(xyz[0], xyz[1], xyz[2]),
            });
        }
        if inertias.is_empty() {
            return None;
        }
        Some(UrdfDynamics {
            chain: k::Chain::from(urdf_robot),
            inertias,
            gravity: na::Vector3::new(0.0, 0.0, -9.80665),
        })
    }

    pub fn from_urdf_file<P>(path: P) -> Result<Option<Self>>
    where
        P: AsRef<Path>,
    {
        Ok(Self::from_urdf_robot(&urdf_rs::read_file(path)?))
    }
}

impl KinematicModel for UrdfDynamics {
    fn chain(&self) -> &k::Chain<f64> {
        &self.chain
    }
    fn as_dynamic(&self) -> Option<&dyn DynamicModel> {
        Some(self)
    }
}

impl DynamicModel for UrdfDynamics {
    fn inertias(&self) -> &[LinkInertia] {
        &self.inertias
    }
    fn gravity(&self) -> na::Vector3<f64> {
        self.gravity
    }
}

/// Load a robot model, preferring the dynamic model when the descriptor has one
///
/// The file is first read as a dynamic model. If it parses but is not a dynamic
/// model, it is read again as a plain kinematic model.
pub fn load_kinematic_model<P>(path: P) -> Result<Box<dyn KinematicModel>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match UrdfDynamics::from_urdf_file(path) {
        Ok(Some(dynamics)) => {
            debug!("{:?} loaded as a dynamic model", path);
            return Ok(Box::new(dynamics));
        }
        Ok(None) => {}
        Err(e) => debug!("{:?} is not a dynamic model: {}", path, e),
    }
    let kinematics =
        UrdfKinematics::from_urdf_file(path).map_err(|e| Error::load(path, e.to_string()))?;
    debug!("{:?} loaded as a kinematic model", path);
    Ok(Box::new(kinematics))
}
