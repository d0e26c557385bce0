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
//! Straight line segment checks in configuration space

use std::collections::VecDeque;

use crate::errors::*;
use crate::funcs::*;
use crate::planning_model::PlanningModel;

/// Variants of `Verifier`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifierKind {
    #[default]
    Recursive,
    Sequential,
}

impl VerifierKind {
    pub fn create(self, delta: f64) -> Box<dyn Verifier> {
        match self {
            VerifierKind::Recursive => Box::new(RecursiveVerifier::new(delta)),
            VerifierKind::Sequential => Box::new(SequentialVerifier::new(delta)),
        }
    }
}

/// Decides whether the segment between two configurations is collision free
pub trait Verifier {
    fn kind(&self) -> VerifierKind;

    /// resolution of the check
    fn delta(&self) -> f64;

    fn set_delta(&mut self, delta: f64);

    /// Check the interior of the segment `u` - `v` at resolution `delta`
    ///
    /// The end points themselves are not checked.
    fn is_colliding(&self, model: &PlanningModel<'_>, u: &[f64], v: &[f64]) -> Result<bool>;

    /// Check every configuration of `path` and every segment between them
    ///
    /// `[q, q]` checks the single configuration `q`.
    fn is_valid_path(&self, model: &PlanningModel<'_>, path: &[Configuration]) -> Result<bool> {
        for q in path {
            if !model.is_valid(q) || model.is_colliding(q)? {
                return Ok(false);
            }
        }
        for segment in path.windows(2) {
            if self.is_colliding(model, &segment[0], &segment[1])? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn check_resolution(delta: f64) -> Result<()> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "verifier resolution must be positive, got {}",
            delta
        )))
    }
}

/// Bisects the segment until the pieces are shorter than `delta`
///
/// Coarse midpoints are checked first, so a collision is usually found early.
pub struct RecursiveVerifier {
    delta: f64,
}

impl RecursiveVerifier {
    pub fn new(delta: f64) -> Self {
        RecursiveVerifier { delta }
    }
}

impl Verifier for RecursiveVerifier {
    fn kind(&self) -> VerifierKind {
        VerifierKind::Recursive
    }
    fn delta(&self) -> f64 {
        self.delta
    }
    fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }
    fn is_colliding(&self, model: &PlanningModel<'_>, u: &[f64], v: &[f64]) -> Result<bool> {
        check_resolution(self.delta)?;
        let length = model.distance(u, v);
        let mut intervals = VecDeque::new();
        intervals.push_back((0.0, 1.0));
        while let Some((a, b)) = intervals.pop_front() {
            if (b - a) * length <= self.delta {
                continue;
            }
            let middle = 0.5 * (a + b);
            if model.is_colliding(&model.interpolate(u, v, middle))? {
                return Ok(true);
            }
            intervals.push_back((a, middle));
            intervals.push_back((middle, b));
        }
        Ok(false)
    }
}

/// Walks from `u` to `v` in steps of `delta`
pub struct SequentialVerifier {
    delta: f64,
}

impl SequentialVerifier {
    pub fn new(delta: f64) -> Self {
        SequentialVerifier { delta }
    }
}

impl Verifier for SequentialVerifier {
    fn kind(&self) -> VerifierKind {
        VerifierKind::Sequential
    }
    fn delta(&self) -> f64 {
        self.delta
    }
    fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }
    fn is_colliding(&self, model: &PlanningModel<'_>, u: &[f64], v: &[f64]) -> Result<bool> {
        check_resolution(self.delta)?;
        // the first point is u itself
        for q in interpolate(u, v, self.delta).iter().skip(1) {
            if model.is_colliding(q)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning_model::tests::load_fixture;
    use crate::planning_model::*;

    #[test]
    fn test_verifiers() {
        let (scene, kinematics) = load_fixture("sample/blocked_scene.xml", "sample/planar_arm.urdf");
        let model = PlanningModel::new(
            PlanningModelKind::Distance,
            &scene,
            0,
            ModelView::of(kinematics.as_ref()),
        )
        .unwrap();
        let free = vec![0.0, 0.0];
        let blocked = vec![1.0, 0.5];
        // sweeps the tip through the block
        let before = vec![0.6, 0.5];
        let after = vec![1.4, 0.5];
        for kind in [VerifierKind::Recursive, VerifierKind::Sequential] {
            let mut verifier = kind.create(0.05);
            assert_eq!(verifier.kind(), kind);
            assert!(!verifier.is_colliding(&model, &free, &[0.0, -0.5]).unwrap());
            assert!(verifier.is_colliding(&model, &before, &after).unwrap());
            assert!(verifier
                .is_valid_path(&model, &[free.clone(), free.clone()])
                .unwrap());
            assert!(!verifier
                .is_valid_path(&model, &[blocked.clone(), blocked.clone()])
                .unwrap());
            assert!(!verifier
                .is_valid_path(&model, &[before.clone(), after.clone()])
                .unwrap());
            verifier.set_delta(0.5);
            assert_eq!(verifier.delta(), 0.5);
            for delta in [0.0, -0.1, f64::NAN, f64::INFINITY] {
                verifier.set_delta(delta);
                let err = verifier.is_colliding(&model, &before, &after).err().unwrap();
                assert_eq!(err.code(), ErrorCode::InvalidParameter);
            }
        }
    }
}
