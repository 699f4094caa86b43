//! # Shopbot Core
//!
//! Domain types, traits, and error definitions for the Shopbot store agent.
//! Every other crate implements against what is defined here: LLM providers,
//! the basket service, the benchmark harness, tools and task solvers.

pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod task;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ErrorKind, ProviderError, Result, ServiceError, ToolError};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use store::{Basket, BasketItem, CouponApplied, Order, Product, ProductPage, StoreApi};
pub use task::{Benchmark, SolveReport, TaskInfo, TaskRange, TaskSolver};
pub use tool::{Tool, ToolCall, ToolOutcome, ToolRegistry, ToolResult};
