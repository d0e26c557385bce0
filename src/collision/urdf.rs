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
use log::*;
use nalgebra as na;
use ncollide3d::shape::{Ball, Compound, ConvexHull, Cuboid, Cylinder, ShapeHandle};
use ncollide3d::transformation::ToTriMesh;
use std::f64::consts::FRAC_PI_2;
use std::path::Path;

/// number of sides of the prism standing in for a cylinder
const CYLINDER_SUBDIVISIONS: u32 = 32;

/// Convert URDF geometry into a collision shape
///
/// Meshes are not supported and return None.
pub(crate) fn urdf_geometry_to_shape_handle(
    collision_geometry: &urdf_rs::Geometry,
    base_dir: Option<&Path>,
) -> Option<ShapeHandle<f64>> {
    match *collision_geometry {
        urdf_rs::Geometry::Box { ref size } => {
            let cube = Cuboid::new(na::Vector3::new(size[0] * 0.5, size[1] * 0.5, size[2] * 0.5));
            Some(ShapeHandle::new(cube))
        }
        urdf_rs::Geometry::Cylinder { radius, length } => {
            // ncollide cylinders are aligned to y, URDF cylinders to z
            let y_cylinder = Cylinder::new(length * 0.5, radius).to_trimesh(CYLINDER_SUBDIVISIONS);
            let hull = match ConvexHull::try_from_points(&y_cylinder.coords) {
                Some(hull) => hull,
                None => {
                    warn!("degenerate cylinder r={} l={}, skipped", radius, length);
                    return None;
                }
            };
            Some(ShapeHandle::new(Compound::new(vec![(
                na::Isometry3::from_parts(
                    na::Translation3::new(0.0, 0.0, 0.0),
                    na::UnitQuaternion::from_euler_angles(FRAC_PI_2, 0.0, 0.0),
                ),
                ShapeHandle::new(hull),
            )])))
        }
        urdf_rs::Geometry::Sphere { radius } => Some(ShapeHandle::new(Ball::new(radius))),
        urdf_rs::Geometry::Mesh { ref filename, .. } => {
            warn!(
                "mesh {} (base_dir={:?}) is not supported for collision, skipped",
                filename, base_dir
            );
            None
        }
        _ => {
            warn!("unsupported collision geometry {:?}", collision_geometry);
            None
        }
    }
}
