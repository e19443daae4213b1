//! Set kernels applied by the executor.
//!
//! - Membership: element-wise `IN` / `NOT IN`
//! - Distinct: first-occurrence deduplication
//! - Union: bag concatenation
//! - Cast: checked element conversion

mod cast;
mod distinct;
mod membership;
mod union;

pub use cast::{cast_set, cast_value};
pub use distinct::distinct;
pub use membership::membership;
pub use union::union_all;
