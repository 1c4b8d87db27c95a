pub mod repository;

pub use repository::{Git2Vcs, Vcs};

#[cfg(test)]
pub use repository::MockVcs;
