mod clock;
mod encode;
mod error;
mod id;
mod query;
mod tracer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use encode::encode_value;
pub use error::TraceError;
pub use id::IdGenerator;
pub use query::TraceReader;
pub use tracer::{StepDraft, Tracer};
