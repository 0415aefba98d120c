//! Immutable, versioned curve snapshots.
//!
//! A [`CurveSet`] is what the renderer and the analysis worker both look at.
//! It is never mutated: streaming updates, visibility toggles and trimming all
//! build a new set with a fresh version, so a result computed against one
//! snapshot can always be recognised as stale once the set moves on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::data::curve::{CurveData, DataPoint};

/// Monotonic identifier of a curve-set snapshot.
pub type CurveSetVersion = u64;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> CurveSetVersion {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Shared, read-only collection of curves tagged with a version.
#[derive(Debug, Clone)]
pub struct CurveSet {
    curves: Arc<[CurveData]>,
    version: CurveSetVersion,
}

impl Default for CurveSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<CurveData>> for CurveSet {
    fn from(curves: Vec<CurveData>) -> Self {
        Self::new(curves)
    }
}

impl CurveSet {
    pub fn new(curves: Vec<CurveData>) -> Self {
        Self {
            curves: curves.into(),
            version: next_version(),
        }
    }

    pub fn version(&self) -> CurveSetVersion {
        self.version
    }

    pub fn curves(&self) -> &[CurveData] {
        &self.curves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurveData> {
        self.curves.iter()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CurveData> {
        self.curves.iter().find(|c| c.id == id)
    }

    pub fn visible(&self) -> impl Iterator<Item = &CurveData> + '_ {
        self.curves.iter().filter(|c| c.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn total_points(&self) -> usize {
        self.curves.iter().map(CurveData::len).sum()
    }

    pub fn visible_points(&self) -> usize {
        self.visible().map(CurveData::len).sum()
    }

    /// Rough heap footprint of the point buffers and labels, in bytes.
    pub fn estimated_bytes(&self) -> usize {
        self.curves
            .iter()
            .map(|c| {
                c.data.capacity() * std::mem::size_of::<DataPoint>()
                    + c.id.capacity()
                    + c.name.capacity()
                    + std::mem::size_of::<CurveData>()
            })
            .sum()
    }

    /// Build a new snapshot by transforming a copy of every curve.
    pub fn map_curves<F>(&self, mut f: F) -> CurveSet
    where
        F: FnMut(&mut CurveData),
    {
        let curves = self
            .curves
            .iter()
            .map(|c| {
                let mut c = c.clone();
                f(&mut c);
                c
            })
            .collect::<Vec<_>>();
        CurveSet::new(curves)
    }

    /// New snapshot with the visibility of curve `id` set. Unknown ids leave
    /// the curves untouched but still yield a new version.
    pub fn with_visibility(&self, id: &str, visible: bool) -> CurveSet {
        self.map_curves(|c| {
            if c.id == id {
                c.visible = visible;
            }
        })
    }

    pub fn toggle_visibility(&self, id: &str) -> CurveSet {
        self.map_curves(|c| {
            if c.id == id {
                c.visible = !c.visible;
            }
        })
    }

    pub fn with_all_visible(&self, visible: bool) -> CurveSet {
        self.map_curves(|c| c.visible = visible)
    }

    /// New snapshot in which every curve keeps at most its last `max_points`
    /// samples.
    pub fn retain_last(&self, max_points: usize) -> CurveSet {
        self.map_curves(|c| c.retain_last(max_points))
    }

    pub fn to_vec(&self) -> Vec<CurveData> {
        self.curves.to_vec()
    }
}

impl<'a> IntoIterator for &'a CurveSet {
    type Item = &'a CurveData;
    type IntoIter = std::slice::Iter<'a, CurveData>;

    fn into_iter(self) -> Self::IntoIter {
        self.curves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn set() -> CurveSet {
        CurveSet::new(vec![
            CurveData::new("a", "A", Rgba::WHITE)
                .with_points((0..4).map(|i| DataPoint::new(i, 0.0)).collect()),
            CurveData::new("b", "B", Rgba::WHITE)
                .with_points((0..6).map(|i| DataPoint::new(i, 0.0)).collect()),
        ])
    }

    #[test]
    fn every_transformation_bumps_the_version() {
        let s = set();
        let hidden = s.with_visibility("a", false);
        assert!(hidden.version() > s.version());
        let trimmed = hidden.retain_last(2);
        assert!(trimmed.version() > hidden.version());
        assert_eq!(s.visible_count(), 2, "original snapshot is untouched");
    }

    #[test]
    fn point_counts_follow_visibility() {
        let s = set().with_visibility("b", false);
        assert_eq!(s.total_points(), 10);
        assert_eq!(s.visible_points(), 4);
        let s = s.toggle_visibility("b");
        assert_eq!(s.visible_points(), 10);
    }
}
