mod algorithm;
mod hyperparams;
mod iter;

pub use algorithm::*;
pub use hyperparams::*;
pub use iter::*;
