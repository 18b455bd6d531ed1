use std::collections::BTreeSet;

use serde::Serialize;

use crate::object::ObjectId;

/// Resolved meaning of a legend symbol.
///
/// `ExactSet` (an "aggregate", written with `and`) stands for all of its
/// objects together. `AnyOf` (a "property", written with `or`) matches any one
/// of them. A plain object name resolves to a single-member `ExactSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LegendKind {
    ExactSet(BTreeSet<ObjectId>),
    AnyOf(BTreeSet<ObjectId>),
}

impl LegendKind {
    pub fn objects(&self) -> &BTreeSet<ObjectId> {
        match self {
            Self::ExactSet(ids) | Self::AnyOf(ids) => ids,
        }
    }

    /// True for an `AnyOf` with more than one member.
    pub fn is_property(&self) -> bool {
        matches!(self, Self::AnyOf(ids) if ids.len() > 1)
    }

    /// True for an `ExactSet` with more than one member.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::ExactSet(ids) if ids.len() > 1)
    }

    /// The single object this entry stands for, if it has exactly one.
    pub fn single(&self) -> Option<ObjectId> {
        let ids = self.objects();
        if ids.len() == 1 {
            ids.iter().next().copied()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Lower-cased symbol (a single character or a word).
    pub symbol: String,
    pub kind: LegendKind,
    pub line: usize,
}
