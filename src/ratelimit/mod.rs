//! Admission control: quota, fixed-window accounting and the shared gate.

mod gate;
mod in_flight;
mod quota;
mod window;

pub use gate::{Admission, GateSnapshot, RateGate};
pub use in_flight::InFlightLimit;
pub use quota::{Quota, TimeUnit};
pub use window::{Decision, WindowState};
