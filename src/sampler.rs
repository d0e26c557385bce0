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
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::funcs::*;
use crate::planning_model::PlanningModel;

/// Draws configurations from the joint space of a planning model
pub trait Sampler {
    fn generate(&mut self, model: &PlanningModel<'_>) -> Configuration;
}

/// Samples uniformly inside the joint limits
///
/// Joints without limits are sampled in -PI <-> PI.
pub struct UniformSampler {
    rng: StdRng,
}

impl UniformSampler {
    pub fn new() -> Self {
        UniformSampler {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        UniformSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for UniformSampler {
    fn generate(&mut self, model: &PlanningModel<'_>) -> Configuration {
        generate_random_joint_angles_from_limits(&mut self.rng, model.limits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning_model::tests::load_fixture;
    use crate::planning_model::*;

    #[test]
    fn test_uniform_sampler() {
        let (scene, kinematics) = load_fixture("sample/empty_scene.xml", "sample/planar_arm.urdf");
        let model = PlanningModel::new(
            PlanningModelKind::Simple,
            &scene,
            0,
            ModelView::of(kinematics.as_ref()),
        )
        .unwrap();
        let mut sampler = UniformSampler::with_seed(1);
        for _ in 0..100 {
            assert!(model.is_valid(&sampler.generate(&model)));
        }
        let mut a = UniformSampler::with_seed(7);
        let mut b = UniformSampler::with_seed(7);
        assert_eq!(a.generate(&model), b.generate(&model));
    }
}
