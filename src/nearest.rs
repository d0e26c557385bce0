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
//! Nearest neighbour indices over configurations

use kdtree::distance::squared_euclidean;
use kdtree::KdTree;

use crate::errors::*;
use crate::funcs::*;

/// Variants of `NearestNeighbours`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NearestNeighboursKind {
    #[default]
    Linear,
    Kdtree,
}

impl NearestNeighboursKind {
    pub fn create(self) -> Box<dyn NearestNeighbours> {
        match self {
            NearestNeighboursKind::Linear => Box::new(LinearNearestNeighbours::default()),
            NearestNeighboursKind::Kdtree => Box::new(KdtreeNearestNeighbours::default()),
        }
    }
}

/// Index of configurations, each tagged with the id of a vertex of the caller's graph
///
/// Distances are euclidean in joint space.
pub trait NearestNeighbours {
    fn kind(&self) -> NearestNeighboursKind;

    fn clear(&mut self);

    fn push(&mut self, q: &[f64], id: usize) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` entries within `radius` of `q`, nearest first, as `(distance, id)`
    fn k_nearest(&self, q: &[f64], k: usize, radius: f64) -> Result<Vec<(f64, usize)>>;

    fn nearest(&self, q: &[f64]) -> Result<Option<(f64, usize)>> {
        Ok(self.k_nearest(q, 1, f64::INFINITY)?.into_iter().next())
    }

    /// New empty index of the same variant
    fn empty(&self) -> Box<dyn NearestNeighbours> {
        self.kind().create()
    }
}

/// Brute force search, exact for any number of entries
#[derive(Default)]
pub struct LinearNearestNeighbours {
    entries: Vec<(Configuration, usize)>,
}

impl NearestNeighbours for LinearNearestNeighbours {
    fn kind(&self) -> NearestNeighboursKind {
        NearestNeighboursKind::Linear
    }
    fn clear(&mut self) {
        self.entries.clear();
    }
    fn push(&mut self, q: &[f64], id: usize) -> Result<()> {
        self.entries.push((q.to_vec(), id));
        Ok(())
    }
    fn len(&self) -> usize {
        self.entries.len()
    }
    fn k_nearest(&self, q: &[f64], k: usize, radius: f64) -> Result<Vec<(f64, usize)>> {
        let mut found = self
            .entries
            .iter()
            .map(|(v, id)| (distance(q, v), *id))
            .filter(|(dist, _)| *dist <= radius)
            .collect::<Vec<_>>();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.truncate(k);
        Ok(found)
    }
}

/// k-d tree search, created lazily with the dimension of the first entry
#[derive(Default)]
pub struct KdtreeNearestNeighbours {
    tree: Option<KdTree<f64, usize, Configuration>>,
}

impl NearestNeighbours for KdtreeNearestNeighbours {
    fn kind(&self) -> NearestNeighboursKind {
        NearestNeighboursKind::Kdtree
    }
    fn clear(&mut self) {
        self.tree = None;
    }
    fn push(&mut self, q: &[f64], id: usize) -> Result<()> {
        let tree = self.tree.get_or_insert_with(|| KdTree::new(q.len()));
        tree.add(q.to_vec(), id)
            .map_err(|e| Error::InvalidParameter(format!("kdtree: {:?}", e)))
    }
    fn len(&self) -> usize {
        self.tree.as_ref().map_or(0, |tree| tree.size())
    }
    fn k_nearest(&self, q: &[f64], k: usize, radius: f64) -> Result<Vec<(f64, usize)>> {
        let tree = match self.tree {
            Some(ref tree) => tree,
            None => return Ok(Vec::new()),
        };
        let k = k.min(tree.size());
        if k == 0 {
            return Ok(Vec::new());
        }
        let found = tree
            .nearest(q, k, &squared_euclidean)
            .map_err(|e| Error::InvalidParameter(format!("kdtree: {:?}", e)))?;
        Ok(found
            .into_iter()
            .map(|(squared, id)| (squared.sqrt(), *id))
            .filter(|(dist, _)| *dist <= radius)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(nn: &mut dyn NearestNeighbours) {
        for (i, x) in [0.0, 1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            nn.push(&[*x, 0.0], i).unwrap();
        }
    }

    #[test]
    fn test_nearest_neighbours() {
        for kind in [NearestNeighboursKind::Linear, NearestNeighboursKind::Kdtree] {
            let mut nn = kind.create();
            assert!(nn.is_empty());
            assert_eq!(nn.nearest(&[0.0, 0.0]).unwrap(), None);
            fill(nn.as_mut());
            assert_eq!(nn.len(), 5);
            let (dist, id) = nn.nearest(&[2.9, 0.1]).unwrap().unwrap();
            assert_eq!(id, 3);
            assert!((dist - (0.02f64).sqrt()).abs() < 1e-9);

            let ids = nn
                .k_nearest(&[0.0, 0.0], 3, f64::INFINITY)
                .unwrap()
                .into_iter()
                .map(|(_, id)| id)
                .collect::<Vec<_>>();
            assert_eq!(ids, vec![0, 1, 2]);
            assert_eq!(nn.k_nearest(&[0.0, 0.0], 10, 1.5).unwrap().len(), 2);

            let empty = nn.empty();
            assert_eq!(empty.kind(), kind);
            assert!(empty.is_empty());
            nn.clear();
            assert!(nn.is_empty());
        }
    }
}
