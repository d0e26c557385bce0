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

use crate::errors::*;
use crate::funcs::*;
use crate::planning_model::PlanningModel;
use crate::verifier::Verifier;

/// Shortens a path by removing vertices which can be skipped
///
/// `path[i + 1]` is removed while the verifier accepts the segment
/// `path[i]` - `path[i + 2]`. End points are never moved.
#[derive(Debug, Default, Clone)]
pub struct SimpleOptimizer {}

impl SimpleOptimizer {
    pub fn new() -> Self {
        SimpleOptimizer {}
    }

    pub fn process(
        &self,
        model: &PlanningModel<'_>,
        verifier: &dyn Verifier,
        path: &mut Vec<Configuration>,
    ) -> Result<()> {
        let original_len = path.len();
        let mut i = 0;
        while i + 2 < path.len() {
            if verifier.is_colliding(model, &path[i], &path[i + 2])? {
                i += 1;
            } else {
                path.remove(i + 1);
            }
        }
        debug!("optimized path: {} -> {} vertices", original_len, path.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning_model::tests::load_fixture;
    use crate::planning_model::*;
    use crate::verifier::VerifierKind;

    #[test]
    fn test_simple_optimizer() {
        let (scene, kinematics) = load_fixture("sample/blocked_scene.xml", "sample/planar_arm.urdf");
        let model = PlanningModel::new(
            PlanningModelKind::Distance,
            &scene,
            0,
            ModelView::of(kinematics.as_ref()),
        )
        .unwrap();
        let verifier = VerifierKind::Recursive.create(0.05);
        let optimizer = SimpleOptimizer::new();

        // free space: everything between the end points goes away
        let mut path = vec![vec![0.0, 0.0], vec![0.0, -0.2], vec![0.1, -0.4], vec![0.0, -0.5]];
        optimizer.process(&model, verifier.as_ref(), &mut path).unwrap();
        assert_eq!(path, vec![vec![0.0, 0.0], vec![0.0, -0.5]]);

        // the direct segment sweeps through the block, the detour has to stay
        let mut path = vec![vec![0.6, 0.5], vec![1.0, -1.5], vec![1.4, 0.5]];
        optimizer.process(&model, verifier.as_ref(), &mut path).unwrap();
        assert_eq!(path.len(), 3);
    }
}
