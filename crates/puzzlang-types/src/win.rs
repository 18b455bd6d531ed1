use std::collections::BTreeSet;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::object::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WinQuantifier {
    No,
    #[strum(serialize = "some", serialize = "any")]
    Some,
    All,
}

/// `no X`, `some X`, `all X on Y`, `no X on Y` or `some X on Y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinCondition {
    pub quantifier: WinQuantifier,
    pub subject: BTreeSet<ObjectId>,
    pub target: Option<BTreeSet<ObjectId>>,
    pub line: usize,
}
