pub mod network;
pub mod snapshot;
pub mod spec;

pub use network::Network;
pub use snapshot::{LayerSnapshot, NetworkSnapshot};
pub use spec::{LayerSpec, NetworkSpec};
