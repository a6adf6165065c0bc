pub mod context;
pub mod engine;
pub mod result;

pub use context::SearchScope;
pub use engine::Resolver;
pub use result::{Attempt, Resolved, ResolutionOutcome, ResolverError};
