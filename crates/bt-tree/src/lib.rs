//! Behaviour tree driver and reference nodes built on `bt-core`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod nodes;
pub mod tree;

pub use nodes::{Action, Condition, Inverter, Selector, Sequence, Wait};
pub use tree::BehaviourTree;
