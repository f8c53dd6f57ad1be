mod chain;
mod error;
mod explorer;
mod features;
pub mod instrumentation;
mod object;
mod predicates;
mod reflect;
mod types;
mod value;
mod visitor;

pub use chain::{Chain, Edge};
pub use error::{Error, Result};
pub use explorer::{
    ExploreStats, Explorer, ExplorerCreateInfo, WorkList, explore,
    explore_object,
};
pub use features::Features;
pub use instrumentation::{Instrumentation, InstrumentationSlot, LayoutSizer};
pub use object::{ArrayObject, Instance};
pub use predicates::{
    And, AtMostOnce, ChainPredicate, Not, NotEnumOrType, chain_to_value,
};
pub use reflect::{AccessError, Reflect};
pub use types::*;
pub use value::{ObjectRef, Value};
pub use visitor::{Filtered, FnVisitor, ObjectVisitor, Traversal, from_fn};
