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
use rand::Rng;
use std::f64::consts::PI;

/// Joint positions, one value per degree of freedom
pub type Configuration = Vec<f64>;

/// Closed position range of a joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRange {
    pub min: f64,
    pub max: f64,
}

impl JointRange {
    pub fn new(min: f64, max: f64) -> Self {
        JointRange { min, max }
    }
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }
}

/// Generate random joint angles from the optional limits
///
/// If the limit is None, -PI <-> PI is used.
pub fn generate_random_joint_angles_from_limits<R>(
    rng: &mut R,
    limits: &[Option<JointRange>],
) -> Configuration
where
    R: Rng + ?Sized,
{
    limits
        .iter()
        .map(|range| match *range {
            Some(ref range) => (range.max - range.min) * rng.gen::<f64>() + range.min,
            None => (rng.gen::<f64>() - 0.5) * 2.0 * PI,
        })
        .collect()
}

/// Euclidean distance in joint space
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert!(a.len() == b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Point at `alpha` (0.0 = `a`, 1.0 = `b`) on the segment between two configurations
pub fn lerp(a: &[f64], b: &[f64], alpha: f64) -> Configuration {
    debug_assert!(a.len() == b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x + (y - x) * alpha).collect()
}

/// Move from `from` toward `to` by at most `step_length`
///
/// Returns `to` itself if it is closer than `step_length`.
pub fn step_toward(from: &[f64], to: &[f64], step_length: f64) -> Configuration {
    let dist = distance(from, to);
    if dist <= step_length {
        to.to_vec()
    } else {
        lerp(from, to, step_length / dist)
    }
}

/// Interpolate two vectors with the length
///
/// The returned points start at `vec1` and exclude `vec2`.
pub fn interpolate(vec1: &[f64], vec2: &[f64], unit_length: f64) -> Vec<Configuration> {
    assert_eq!(vec1.len(), vec2.len());
    debug_assert!(unit_length.is_finite() && unit_length > 0.0);
    let dist = distance(vec1, vec2);
    let num = (dist / unit_length).ceil() as usize;
    (0..num)
        .map(|i| lerp(vec1, vec2, i as f64 / num as f64))
        .collect()
}
