//! Task solvers for the Shopbot store agent.
//!
//! Two strategies share the same tools and store:
//!
//! - [`LlmSolver`] runs the **tool loop**: the model receives the
//!   optimization protocol and the seven store tools, calls them one at a
//!   time and stops once it has checked out. Early stops are answered with an
//!   autonomy reminder; a hard iteration cap bounds the run.
//! - [`SearchSolver`] asks the model once what the customer wants and then
//!   tries every pack combination with every coupon on the live basket,
//!   checking out the cheapest.

pub mod loop_runner;
pub mod prompt;
pub mod search;
pub mod solver;

#[cfg(test)]
mod test_helpers;

pub use loop_runner::{AgentLoop, AgentRun};
pub use search::SearchSolver;
pub use solver::LlmSolver;
