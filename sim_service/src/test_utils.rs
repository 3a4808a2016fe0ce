//! Test utilities for protocol tests
//!
//! Helpers that wire a [`SimulatedService`] to a [`TrapClient`] the way most
//! tests want it: shared region at the configured base, counting allocator,
//! region attached to the client.

use crate::{CountingAllocator, EventSignal, InMemoryRegion, SimulatedService};
use std::sync::Arc;
use trap_api::{AsyncHandle, ProtocolConfig, TrapClient};

/// Size of the simulated completion region.
pub const REGION_LEN: usize = 64 * 1024;

/// A client talking to a simulated service, plus handles to inspect both.
pub struct Harness {
    pub service: Arc<SimulatedService>,
    pub allocator: Arc<CountingAllocator>,
    pub client: TrapClient<Arc<SimulatedService>>,
}

impl Harness {
    /// Builds a harness around an already configured service.
    pub fn with_service(service: SimulatedService) -> Self {
        let service = Arc::new(service);
        let allocator = Arc::new(CountingAllocator::new());
        let config = ProtocolConfig::default().with_shared_region_base(service.region().base());
        let client = TrapClient::new(Arc::clone(&service))
            .with_allocator(allocator.clone())
            .with_region(service.region().clone())
            .with_config(config);
        Self {
            service,
            allocator,
            client,
        }
    }

    pub fn new() -> Self {
        Self::with_service(SimulatedService::new(new_region()))
    }

    /// A fresh signal and a handle for the completion at `offset`.
    pub fn handle_at(&self, offset: u64) -> (Arc<EventSignal>, AsyncHandle) {
        let signal = Arc::new(EventSignal::new());
        let handle = self.client.async_handle(signal.clone(), offset);
        (signal, handle)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A region at the default shared base.
pub fn new_region() -> Arc<InMemoryRegion> {
    Arc::new(InMemoryRegion::new(
        ProtocolConfig::DEFAULT.shared_region_base,
        REGION_LEN,
    ))
}
