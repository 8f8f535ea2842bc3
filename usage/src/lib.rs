//! Account services backing the query UI: session bootstrap, quota
//! snapshots and the query-event log.
//!
//! Every operation takes the store as an optional handle and never returns
//! an error to its caller. Failures are logged and folded into an
//! [`Outcome`].

pub mod bootstrap;
pub mod category;
pub mod outcome;
pub mod recorder;
pub mod snapshot;
pub mod window;

pub use bootstrap::{BootstrapReport, ensure_user_bootstrap};
pub use category::map_service_to_consulta_tipo;
pub use outcome::Outcome;
pub use recorder::{RegisterConsulta, register_consulta};
pub use snapshot::{UsageSnapshot, get_usage_snapshot};
pub use window::QuotaClock;
