//! Ordered, contiguous groupings of sample indices.
//!
//! A [`Partition`] is what both binning modes produce before any reduction is
//! applied. The reducers in [`crate::reduce`] consume it, so the location and
//! value axes of a series are always reduced over exactly the same groups.
use std::ops::Range;
use std::slice;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of index groups over a series of length [`Partition::span`].
///
/// Groups are half-open ranges. A well-formed partition covers its span exactly
/// once, in order, without gaps; see [`Partition::is_exhaustive`]. A partition
/// built with [`TrailingPolicy::Drop`](crate::boxcar::TrailingPolicy::Drop) may
/// deliberately stop short of its span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Partition {
    groups: Vec<Range<usize>>,
    span: usize,
}

impl Partition {
    pub fn new(span: usize) -> Self {
        Self {
            groups: Vec::new(),
            span,
        }
    }

    pub fn with_capacity(span: usize, capacity: usize) -> Self {
        Self {
            groups: Vec::with_capacity(capacity),
            span,
        }
    }

    /// Append the next group. Groups must be non-empty and follow on directly from
    /// the previous one.
    pub(crate) fn push(&mut self, group: Range<usize>) {
        debug_assert!(group.start < group.end, "empty group {group:?}");
        debug_assert!(group.end <= self.span);
        debug_assert_eq!(
            group.start,
            self.covered(),
            "group {group:?} does not continue the partition"
        );
        self.groups.push(group);
    }

    /// The length of the series this partition was built over
    pub fn span(&self) -> usize {
        self.span
    }

    /// The number of indices covered by groups
    pub fn covered(&self) -> usize {
        self.groups.last().map(|g| g.end).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Range<usize>> {
        self.groups.get(index)
    }

    pub fn last(&self) -> Option<&Range<usize>> {
        self.groups.last()
    }

    pub fn iter(&self) -> slice::Iter<'_, Range<usize>> {
        self.groups.iter()
    }

    pub fn as_slice(&self) -> &[Range<usize>] {
        &self.groups
    }

    /// The number of indices in each group
    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.len()).collect()
    }

    /// Check that the groups are non-empty, ordered, pairwise disjoint and
    /// contiguous from zero.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 0;
        for g in self.groups.iter() {
            if g.start != expected || g.end <= g.start {
                return false;
            }
            expected = g.end;
        }
        expected <= self.span
    }

    /// Check that the groups are contiguous and together cover `[0, span)` exactly
    /// once.
    pub fn is_exhaustive(&self) -> bool {
        self.is_contiguous() && self.covered() == self.span
    }

    /// Expand into explicit index lists, one `Vec` per group
    pub fn to_index_lists(&self) -> Vec<Vec<usize>> {
        self.groups.iter().map(|g| g.clone().collect()).collect()
    }
}

impl<'a> IntoIterator for &'a Partition {
    type Item = &'a Range<usize>;

    type IntoIter = slice::Iter<'a, Range<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl AsRef<[Range<usize>]> for Partition {
    fn as_ref(&self) -> &[Range<usize>] {
        &self.groups
    }
}
