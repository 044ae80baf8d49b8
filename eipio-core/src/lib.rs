//! Cyclic I/O core: connection lifecycle supervision, signal value mapping
//! and explicit messaging over a pluggable protocol stack.

pub mod builder;
pub mod codec;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod messaging;
pub mod signals;
pub mod text;

pub use error::{CoreError, CoreResult};
pub use identity::{EipIdentityReader, IdentityReader};
pub use lifecycle::ConnectionSupervisor;
pub use messaging::{EipExplicitMessaging, ExplicitMessaging};
pub use signals::{MappingFormat, SignalService};
