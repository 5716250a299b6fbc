pub mod repo;

pub use repo::{Predicate, Repo};
