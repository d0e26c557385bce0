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
//! # Planning session with a C ABI
//!
//! Load a robot (URDF) and a scene of obstacles, then ask for collision free
//! paths in joint space with RRT, RRT-ConCon, goal biased RRT or PRM. `ncollide3d`
//! checks the collisions and `k` computes the forward kinematics.
//!
//! The same session is exported to C as `CreatePlanner`, `PlanTrajectory` and
//! friends, see the `ffi` module and `include/gear_capi.h`.
//!
//! # Example
//!
//! ```
//! use gear_capi::{PlanRequest, PlannerKind, Session, SessionConfig};
//!
//! let mut session = Session::with_config(SessionConfig::new().seed(1));
//! session.load_kinematics("sample/planar_arm.urdf").unwrap();
//! // the first model of the scene is the robot
//! session.load_scene("sample/blocked_scene.xml", 0).unwrap();
//! assert_eq!(session.dof().unwrap(), 2);
//!
//! let request = PlanRequest::new()
//!     .start(&[0.6, 0.5])
//!     .goal(&[1.4, 0.5])
//!     .planner_kind(PlannerKind::RrtConCon);
//! let path = session.plan(&request).unwrap();
//! assert_eq!(path[0], vec![0.6, 0.5]);
//! assert_eq!(path[path.len() - 1], vec![1.4, 0.5]);
//! ```

mod errors;
pub use errors::*;

mod funcs;
pub use funcs::*;

mod collision;
pub use collision::*;

mod kinematics;
pub use kinematics::*;

mod scene;
pub use scene::*;

mod planning_model;
pub use planning_model::*;

mod sampler;
pub use sampler::*;

mod verifier;
pub use verifier::*;

mod nearest;
pub use nearest::*;

mod optimizer;
pub use optimizer::*;

mod planner;
pub use planner::*;

mod config;
pub use config::*;

mod descriptor;
pub use descriptor::*;

mod session;
pub use session::*;

pub mod ffi;
