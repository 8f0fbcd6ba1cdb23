//! Application layer for Strata.
//!
//! Use cases that coordinate the domain model, the model provider and
//! persistence: the AI Gateway, the Session Store, input collection, export,
//! and the workbench that ties them together.

pub mod export;
pub mod gateway;
pub mod intake;
pub mod session_store;
pub mod workbench;

pub use gateway::{AiGateway, Formulation, GatewayError, GatewaySettings, PreconditionError};
pub use intake::{IntakeNotice, Upload};
pub use session_store::SessionStore;
pub use workbench::{ActionKind, Autosave, IntakeOutcome, StrategyWorkbench, WorkbenchError};
