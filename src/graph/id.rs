//! Identity types for the dataflow graph.
//!
//! Both ids are `u32` arena indices. Slots are tombstoned on removal and
//! never reused, so an id never aliases a node or edge created later.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

arena_id!(
    /// Index into the graph's node arena. Also the node's creation rank,
    /// which breaks ties in the execution order.
    NodeId
);

arena_id!(
    /// Index into the graph's edge arena.
    EdgeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_format_with_type_name() {
        assert_eq!(format!("{}", NodeId(3)), "NodeId(3)");
        assert_eq!(format!("{:?}", EdgeId(5)), "EdgeId(5)");
        assert_eq!(NodeId(42).index(), 42);
    }

    #[test]
    fn test_node_ids_order_by_creation() {
        assert!(NodeId(1) < NodeId(2));
    }
}
