pub mod filter;
pub mod sgd;
pub mod staged;
pub mod traits;

pub use filter::SparsityFilter;
pub use sgd::{ModelState, SgdRegressor};
pub use staged::{Stage, StagedRegressor};
pub use traits::{Regressor, SparseTransform, StagedModel};
