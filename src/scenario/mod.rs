//! Scenario driver.
//!
//! Loads the topology and settings, installs the chosen routing behaviour,
//! binds one endpoint per node, replays the scripted communications and
//! records every delivery into the results document.

mod context;
mod driver;
mod error;
mod recorder;
mod registry;
mod schedule;
mod settings;
mod state;

pub use context::{ResultSink, RunContext, RxTotals};
pub use driver::{
    DEFAULT_TOTAL_TIME, RunSummary, Scenario, ScenarioOptions, ScenarioPaths, run_scenario,
    run_with_sink,
};
pub use error::{ConfigError, RegistryError, ScenarioError, SettingsError, StateError};
pub use recorder::{ReceiveRecorder, payload_text};
pub use registry::AddressRegistry;
pub use schedule::{CommunicationScheduler, MESSAGE_PORT};
pub use settings::{
    DEFAULT_BASE_ADDRESS, DEFAULT_SUBNET_MASK, SettingKey, SettingsModel, load_settings,
    parse_settings,
};
pub use state::{
    BROADCAST, CommunicationEvent, Destination, NodeState, TopologyState, load_state, parse_state,
};
