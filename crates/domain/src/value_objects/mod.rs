//! Value Objects - Immutable, identity-less domain primitives

mod circuit_state;
mod fault_type;
mod instance_id;
mod resource_status;
mod retry_state;
mod system_status;

pub use circuit_state::CircuitState;
pub use fault_type::FaultType;
pub use instance_id::InstanceId;
pub use resource_status::ResourceStatus;
pub use retry_state::RetryState;
pub use system_status::SystemStatus;
