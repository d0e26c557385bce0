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
//! Plan recipes: which robot and scene to load and how to plan for it
//!
//! ```xml
//! <rlplan>
//!   <model>
//!     <kinematics href="arm.urdf"/>
//!     <scene href="scene.xml"/>
//!     <model>0</model>
//!   </model>
//!   <rrtConCon>
//!     <delta unit="deg">5</delta>
//!     <epsilon>0.001</epsilon>
//!     <duration>2</duration>
//!     <start><q>0</q><q unit="deg">30</q></start>
//!     <goal><q>1.0</q><q>0.5</q></goal>
//!     <kdtreeNearestNeighbors/>
//!   </rrtConCon>
//! </rlplan>
//! ```

use log::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::PlannerParams;
use crate::errors::*;
use crate::funcs::*;
use crate::nearest::NearestNeighboursKind;
use crate::planner::PlannerKind;
use crate::verifier::VerifierKind;

mod document;
pub use document::*;

const PLANNER_ELEMENTS: &[&str] = &["rrtConCon", "rrt", "rrtGoalBias", "prm"];

/// Contents of a plan recipe, with every path absolute or relative to the working directory
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDescriptor {
    pub kinematics: PathBuf,
    pub scene: PathBuf,
    pub robot: usize,
    pub planner_kind: PlannerKind,
    pub params: PlannerParams,
    pub start: Option<Configuration>,
    pub goal: Option<Configuration>,
    pub nearest: NearestNeighboursKind,
    pub verifier: VerifierKind,
}

impl PlanDescriptor {
    pub fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let document = load_document(path)?;
        Self::from_document(&document).map_err(|e| match e {
            Error::Load { reason, .. } => Error::load(path, reason),
            e => Error::load(path, e),
        })
    }

    /// Interpret a document whose root is `<rlplan>` or `<rl><plan>`
    pub fn from_document(root: &Element) -> Result<Self> {
        let plan = match root.name() {
            "rlplan" => root,
            "rl" => root
                .child("plan")
                .ok_or_else(|| Error::load(root.base_dir(), "<rl> without <plan>"))?,
            name => {
                return Err(Error::load(
                    root.base_dir(),
                    format!("<{}> is not a plan descriptor", name),
                ))
            }
        };
        let defaults = PlannerParams::descriptor_default();
        let duration = scalar(plan, "duration", defaults.timeout.as_secs_f64());
        let timeout = if duration.is_finite() && duration >= 0.0 {
            Duration::from_millis((duration * 1000.0) as u64)
        } else {
            warn!("negative duration {}, using {:?}", duration, defaults.timeout);
            defaults.timeout
        };
        Ok(PlanDescriptor {
            kinematics: model_path(plan, "kinematics")?,
            scene: model_path(plan, "scene")?,
            robot: robot_index(plan)?,
            planner_kind: plan
                .elements()
                .find(|element| PLANNER_ELEMENTS.contains(&element.name()))
                .map(|element| element.name().parse())
                .transpose()?
                .unwrap_or_default(),
            params: PlannerParams {
                delta: positive_scalar(plan, "delta", defaults.delta),
                epsilon: positive_scalar(plan, "epsilon", defaults.epsilon),
                timeout,
            },
            start: configuration(plan, "start")?,
            goal: configuration(plan, "goal")?,
            nearest: first_of(
                plan,
                &[
                    ("linearNearestNeighbors", NearestNeighboursKind::Linear),
                    ("kdtreeNearestNeighbors", NearestNeighboursKind::Kdtree),
                ],
            )
            .unwrap_or_default(),
            verifier: first_of(
                plan,
                &[
                    ("recursiveVerifier", VerifierKind::Recursive),
                    ("sequentialVerifier", VerifierKind::Sequential),
                ],
            )
            .unwrap_or_default(),
        })
    }
}

fn model_path(plan: &Element, name: &str) -> Result<PathBuf> {
    let element = plan
        .find(&["model", name])
        .ok_or_else(|| Error::load(plan.base_dir(), format!("no <model><{}> element", name)))?;
    let href = match element.attribute("href") {
        Some(href) => href.trim().to_owned(),
        None => element.text().trim().to_owned(),
    };
    if href.is_empty() {
        return Err(Error::load(
            element.base_dir(),
            format!("<{}> has no href", name),
        ));
    }
    Ok(element.resolve(&href))
}

fn robot_index(plan: &Element) -> Result<usize> {
    match plan.find(&["model", "model"]) {
        Some(element) => {
            let text = element.text();
            text.trim().parse::<usize>().map_err(|e| {
                Error::load(
                    element.base_dir(),
                    format!("robot model index {:?}: {}", text.trim(), e),
                )
            })
        }
        None => Ok(0),
    }
}

fn is_degree(element: &Element) -> bool {
    element.attribute("unit") == Some("deg")
}

/// Value of the first `name` element, converted to radians if its unit is `deg`
fn scalar(plan: &Element, name: &str, default: f64) -> f64 {
    let element = match plan.find(&[name]) {
        Some(element) => element,
        None => return default,
    };
    match element.text().trim().parse::<f64>() {
        Ok(value) if is_degree(element) => value.to_radians(),
        Ok(value) => value,
        Err(e) => {
            warn!("<{}>: {}, using {}", name, e, default);
            default
        }
    }
}

/// Like `scalar`, but values which are not finite and positive fall back to `default`
fn positive_scalar(plan: &Element, name: &str, default: f64) -> f64 {
    let value = scalar(plan, name, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("<{}> must be positive, {} given, using {}", name, value, default);
        default
    }
}

fn configuration(plan: &Element, name: &str) -> Result<Option<Configuration>> {
    let values = plan.find_all(&[name, "q"]);
    if values.is_empty() {
        return Ok(None);
    }
    values
        .into_iter()
        .map(|q| {
            let text = q.text();
            let value = text.trim().parse::<f64>().map_err(|e| {
                Error::load(q.base_dir(), format!("<{}><q> {:?}: {}", name, text.trim(), e))
            })?;
            Ok(if is_degree(q) {
                value.to_radians()
            } else {
                value
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn first_of<T: Copy>(plan: &Element, candidates: &[(&str, T)]) -> Option<T> {
    plan.descendants().into_iter().find_map(|element| {
        candidates
            .iter()
            .find(|(name, _)| *name == element.name())
            .map(|(_, value)| *value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PlanDescriptor> {
        PlanDescriptor::from_document(&parse_document(text, Path::new("recipes"))?)
    }

    #[test]
    fn test_defaults() {
        let descriptor = parse(
            "<rlplan><model><kinematics href=\"arm.urdf\"/><scene>scene.xml</scene></model></rlplan>",
        )
        .unwrap();
        assert_eq!(descriptor.kinematics, Path::new("recipes/arm.urdf"));
        assert_eq!(descriptor.scene, Path::new("recipes/scene.xml"));
        assert_eq!(descriptor.robot, 0);
        assert_eq!(descriptor.planner_kind, PlannerKind::RrtConCon);
        assert_eq!(descriptor.params, PlannerParams::descriptor_default());
        assert_eq!(descriptor.start, None);
        assert_eq!(descriptor.goal, None);
        assert_eq!(descriptor.nearest, NearestNeighboursKind::Linear);
        assert_eq!(descriptor.verifier, VerifierKind::Recursive);
    }

    #[test]
    fn test_parameters() {
        let descriptor = parse(
            "<rl><plan>\
               <model><kinematics href=\"arm.urdf\"/><scene href=\"scene.xml\"/><model>1</model></model>\
               <prm>\
                 <delta unit=\"deg\">5</delta><epsilon>0.01</epsilon><duration>2.5</duration>\
                 <kdtreeNearestNeighbors/><sequentialVerifier/>\
               </prm>\
               <start><q>0.5</q><q unit=\"deg\">180</q></start>\
               <goal><q>1</q><q>2</q></goal>\
             </plan></rl>",
        )
        .unwrap();
        assert_eq!(descriptor.robot, 1);
        assert_eq!(descriptor.planner_kind, PlannerKind::Prm);
        assert!((descriptor.params.delta - 5.0f64.to_radians()).abs() < 1e-12);
        assert_eq!(descriptor.params.epsilon, 0.01);
        assert_eq!(descriptor.params.timeout_ms(), 2500);
        assert_eq!(descriptor.nearest, NearestNeighboursKind::Kdtree);
        assert_eq!(descriptor.verifier, VerifierKind::Sequential);
        let start = descriptor.start.unwrap();
        assert_eq!(start[0], 0.5);
        assert!((start[1] - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(descriptor.goal, Some(vec![1.0, 2.0]));
    }

    #[test]
    fn test_unparsable_values() {
        let descriptor = parse(
            "<rlplan><model><kinematics href=\"a.urdf\"/><scene href=\"s.xml\"/></model>\
             <rrt><delta>fast</delta></rrt></rlplan>",
        )
        .unwrap();
        assert_eq!(descriptor.planner_kind, PlannerKind::Rrt);
        assert_eq!(descriptor.params.delta, 1.0);
        let err = parse(
            "<rlplan><model><kinematics href=\"a.urdf\"/><scene href=\"s.xml\"/></model>\
             <start><q>zero</q></start></rlplan>",
        )
        .err()
        .unwrap();
        assert_eq!(err.code(), ErrorCode::LoadFailed);
    }

    #[test]
    fn test_non_positive_values() {
        for value in ["0", "-0.5", "nan", "inf"] {
            let descriptor = parse(&format!(
                "<rlplan><model><kinematics href=\"a.urdf\"/><scene href=\"s.xml\"/></model>\
                 <prm><delta>{0}</delta><epsilon>{0}</epsilon><duration>{0}</duration></prm></rlplan>",
                value
            ))
            .unwrap();
            let defaults = PlannerParams::descriptor_default();
            assert_eq!(descriptor.params.delta, defaults.delta, "{}", value);
            assert_eq!(descriptor.params.epsilon, defaults.epsilon, "{}", value);
            if value != "0" {
                assert_eq!(descriptor.params.timeout, defaults.timeout, "{}", value);
            }
        }
    }

    #[test]
    fn test_planner_kind_from_root_children() {
        let descriptor = parse(
            "<rlplan><model><kinematics href=\"a.urdf\"/><scene href=\"s.xml\"/></model>\
             <notes><rrt/></notes><prm/><rrtGoalBias/></rlplan>",
        )
        .unwrap();
        assert_eq!(descriptor.planner_kind, PlannerKind::Prm);
    }

    #[test]
    fn test_missing_elements() {
        for text in [
            "<rlplan><model><kinematics href=\"a.urdf\"/></model></rlplan>",
            "<rlplan><model><scene href=\"s.xml\"/></model></rlplan>",
            "<rl><model/></rl>",
            "<scene/>",
        ] {
            assert_eq!(parse(text).err().unwrap().code(), ErrorCode::LoadFailed, "{}", text);
        }
    }
}
