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
use std::time::Duration;

use crate::errors::*;
use crate::nearest::NearestNeighboursKind;
use crate::scene::{SceneBackend, BACKEND_PRIORITY};
use crate::verifier::VerifierKind;

/// Step length, goal tolerance and time budget of a planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerParams {
    /// resolution of segment checks and step length of the tree planners [rad]
    pub delta: f64,
    /// goal tolerance of the tree planners [rad]
    pub epsilon: f64,
    pub timeout: Duration,
}

impl Default for PlannerParams {
    fn default() -> Self {
        PlannerParams {
            delta: 0.1,
            epsilon: 0.001,
            timeout: Duration::from_millis(30_000),
        }
    }
}

impl PlannerParams {
    /// Values used for the elements a plan recipe leaves out
    pub fn descriptor_default() -> Self {
        PlannerParams {
            delta: 1.0,
            epsilon: 0.001,
            timeout: Duration::from_millis(120_000),
        }
    }

    /// Copy of `self` with the positive overrides applied
    ///
    /// Zero, negative and non finite values keep the stored value.
    pub fn merged(&self, delta: f64, epsilon: f64, timeout_ms: i64) -> Self {
        PlannerParams {
            delta: if is_positive(delta) { delta } else { self.delta },
            epsilon: if is_positive(epsilon) { epsilon } else { self.epsilon },
            timeout: if timeout_ms > 0 {
                Duration::from_millis(timeout_ms as u64)
            } else {
                self.timeout
            },
        }
    }

    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }

    /// Fails unless `delta` and `epsilon` are finite and positive
    pub fn check(&self) -> Result<()> {
        if !is_positive(self.delta) {
            return Err(Error::InvalidParameter(format!("delta {}", self.delta)));
        }
        if !is_positive(self.epsilon) {
            return Err(Error::InvalidParameter(format!("epsilon {}", self.epsilon)));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Construction options of a `Session`
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// seed of the sampler and the planner, random if None
    pub seed: Option<u64>,
    pub params: PlannerParams,
    pub nearest: NearestNeighboursKind,
    pub verifier: VerifierKind,
    pub backends: Vec<SceneBackend>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            seed: None,
            params: PlannerParams::default(),
            nearest: NearestNeighboursKind::default(),
            verifier: VerifierKind::default(),
            backends: BACKEND_PRIORITY.to_vec(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn params(mut self, params: PlannerParams) -> Self {
        self.params = params;
        self
    }
    pub fn nearest(mut self, nearest: NearestNeighboursKind) -> Self {
        self.nearest = nearest;
        self
    }
    pub fn verifier(mut self, verifier: VerifierKind) -> Self {
        self.verifier = verifier;
        self
    }
    pub fn backends(mut self, backends: Vec<SceneBackend>) -> Self {
        self.backends = backends;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged() {
        let params = PlannerParams::default();
        assert_eq!(params.merged(0.0, -1.0, 0), params);
        let merged = params.merged(0.2, 0.01, 500);
        assert_eq!(merged.delta, 0.2);
        assert_eq!(merged.epsilon, 0.01);
        assert_eq!(merged.timeout_ms(), 500);
        assert_eq!(params.timeout_ms(), 30_000);
        assert_eq!(PlannerParams::descriptor_default().timeout_ms(), 120_000);
        assert_eq!(params.merged(f64::INFINITY, f64::NAN, 0), params);
    }

    #[test]
    fn test_check() {
        assert!(PlannerParams::default().check().is_ok());
        assert!(PlannerParams::descriptor_default().check().is_ok());
        for delta in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let params = PlannerParams {
                delta,
                ..PlannerParams::default()
            };
            assert_eq!(params.check().err().unwrap().code(), ErrorCode::InvalidParameter);
        }
        let params = PlannerParams {
            epsilon: 0.0,
            ..PlannerParams::default()
        };
        assert!(params.check().is_err());
    }

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new()
            .seed(1)
            .nearest(NearestNeighboursKind::Kdtree)
            .verifier(VerifierKind::Sequential);
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.nearest, NearestNeighboursKind::Kdtree);
        assert_eq!(config.verifier, VerifierKind::Sequential);
        assert_eq!(config.backends, BACKEND_PRIORITY.to_vec());
    }
}
