//! Contains data structures.

mod bitvec;
pub use self::bitvec::BitVec;
