pub mod connectivity_state;

pub use connectivity_state::{ConnectivityEvent, ConnectivityState};
