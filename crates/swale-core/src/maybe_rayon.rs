//! Row-parallel iteration with or without rayon.
//!
//! With the `threading` feature this re-exports rayon's prelude. Without it,
//! `into_par_iter()` resolves to plain `into_iter()` so the same call chains
//! (`flat_map`, `map`, `collect`) run sequentially.
#[cfg(feature = "threading")]
pub use rayon::prelude::*;

#[cfg(not(feature = "threading"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "threading"))]
pub use sequential::*;
