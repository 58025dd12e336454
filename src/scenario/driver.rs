//! Run lifecycle: load, set up the network, schedule the script, run to the
//! deadline and close the results document whatever happens.

use std::fs::File;
use std::io::BufWriter;
use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use super::context::{ResultSink, RunContext, RxTotals};
use super::error::ScenarioError;
use super::schedule::{CommunicationScheduler, MESSAGE_PORT};
use super::settings::{SettingsModel, load_settings};
use super::state::{TopologyState, load_state};
use crate::net::{Ipv4AddressAllocator, NetWorld, Network, SharedChannel};
use crate::routing;
use crate::sim::{Event, SimTime, Simulator, World};

/// Fixed length of a run in virtual time.
pub const DEFAULT_TOTAL_TIME: SimTime = SimTime(10_000_000_000);

#[derive(Debug, Clone)]
pub struct ScenarioPaths {
    pub positions: PathBuf,
    pub settings: PathBuf,
    pub results: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    /// Hard deadline; nothing scheduled later than this runs.
    pub total_time: SimTime,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            total_time: DEFAULT_TOTAL_TIME,
        }
    }
}

/// Topology plus settings: everything a run needs besides the output.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub state: TopologyState,
    pub settings: SettingsModel,
}

impl Scenario {
    pub fn load(positions: &Path, settings: &Path) -> Result<Self, ScenarioError> {
        let state = load_state(positions)?;
        let settings = load_settings(settings)?;
        Ok(Self { state, settings })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub nodes: usize,
    pub communications: usize,
    pub protocol: String,
    pub settings: SettingsModel,
    pub sent_packets: u64,
    pub unroutable_packets: u64,
    pub packets_received: u64,
    pub bytes_total: u64,
    pub unattributed_packets: u64,
    pub records_written: u64,
    pub finished_at_s: f64,
}

/// Run the scenario described by the files in `paths`.
///
/// The results file is created and opened first; it is closed on every path
/// out of this function, including load and setup failures.
pub fn run_scenario(
    paths: &ScenarioPaths,
    opts: &ScenarioOptions,
) -> Result<RunSummary, ScenarioError> {
    let file = File::create(&paths.results).map_err(|source| ScenarioError::ResultsFile {
        path: paths.results.clone(),
        source,
    })?;
    let mut ctx = RunContext::new(Box::new(BufWriter::new(file)));
    ctx.results.open()?;

    match Scenario::load(&paths.positions, &paths.settings) {
        Ok(scenario) => execute(&scenario, ctx, opts),
        Err(err) => {
            error!(error = %err, "scenario could not be loaded; not simulating");
            ctx.finish_results();
            Err(err)
        }
    }
}

/// Run an already loaded scenario, writing results to `sink`.
pub fn run_with_sink(
    scenario: &Scenario,
    sink: ResultSink,
    opts: &ScenarioOptions,
) -> Result<RunSummary, ScenarioError> {
    let mut ctx = RunContext::new(sink);
    ctx.results.open()?;
    execute(scenario, ctx, opts)
}

fn execute(
    scenario: &Scenario,
    mut ctx: RunContext,
    opts: &ScenarioOptions,
) -> Result<RunSummary, ScenarioError> {
    let mut sim = Simulator::default();
    let net = match setup(scenario, &mut ctx, &mut sim) {
        Ok(net) => net,
        Err(err) => {
            error!(stage = err.stage(), error = %err, "setup failed; not simulating");
            ctx.finish_results();
            return Err(err);
        }
    };

    let mut world = NetWorld::new(net, ctx);
    sim.stop_at(opts.total_time);
    sim.schedule_destroy(CloseResults);
    sim.run(&mut world);
    let finished_at = sim.now();
    sim.destroy(&mut world);

    let NetWorld { net, mut ctx } = world;
    if let Some(err) = ctx.take_write_error() {
        return Err(err.into());
    }
    let RxTotals {
        bytes_total,
        packets_received,
        unattributed,
    } = ctx.totals;
    let summary = RunSummary {
        nodes: net.node_count(),
        communications: scenario.state.communications.len(),
        protocol: scenario.settings.routing_protocol.to_string(),
        settings: scenario.settings.clone(),
        sent_packets: net.stats.sent_pkts,
        unroutable_packets: net.stats.unroutable_pkts,
        packets_received,
        bytes_total,
        unattributed_packets: unattributed,
        records_written: ctx.results.records_written(),
        finished_at_s: finished_at.as_secs_f64(),
    };
    info!(
        packets_received,
        bytes_total,
        finished_at = %finished_at,
        "scenario finished"
    );
    Ok(summary)
}

/// Build the network, bind one endpoint per node and schedule the script.
/// The routing protocol is resolved before anything is created.
fn setup(
    scenario: &Scenario,
    ctx: &mut RunContext,
    sim: &mut Simulator,
) -> Result<Network, ScenarioError> {
    let settings = &scenario.settings;
    let state = &scenario.state;

    let plan = routing::select(&settings.routing_protocol)?;
    let delay = settings.delay()?;
    let data_rate = settings.data_rate()?;
    let mut allocator =
        Ipv4AddressAllocator::new(settings.base_address()?, settings.subnet_mask()?)?;

    info!(%data_rate, %delay, "setting up shared channel");
    let mut net = Network::new(SharedChannel::new(data_rate, delay));
    let nodes = net.create_nodes(state.node_count);
    for (&node, listed) in nodes.iter().zip(&state.nodes) {
        net.set_position(node, listed.position)?;
    }

    info!(
        protocol = %settings.routing_protocol,
        dsr = plan.is_dsr(),
        "delegating protocol to all nodes"
    );
    plan.install(&mut net, &nodes)?;

    info!("assigning addresses");
    let interfaces = net.assign_addresses(&nodes, &mut allocator)?;

    info!("creating endpoints");
    for (&node, iface) in nodes.iter().zip(&interfaces) {
        let ep = net.create_endpoint(node)?;
        net.bind(ep, SocketAddrV4::new(iface.local, MESSAGE_PORT))?;
        net.set_allow_broadcast(ep, true)?;
        net.set_recv_notify(ep, true)?;
        ctx.registry.bind(node, iface.local, ep)?;
    }

    CommunicationScheduler::new(&ctx.registry).schedule_all(&state.communications, &mut net, sim)?;
    Ok(net)
}

/// Shutdown hook that closes the results document.
struct CloseResults;

impl Event for CloseResults {
    fn execute(self: Box<Self>, _sim: &mut Simulator, world: &mut dyn World) {
        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        w.ctx.finish_results();
    }
}
