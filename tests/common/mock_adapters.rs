/*!
 * Helpers for wiring mock adapters into cascades
 */

use std::sync::Arc;

use vasha::cascade::CascadeSpec;
use vasha::providers::{Capability, MockAdapter, ProviderAdapter};

/// Build a cascade spec from mock adapters, in the given order
pub fn spec(capability: Capability, adapters: Vec<Arc<MockAdapter>>) -> CascadeSpec {
    let adapters = adapters
        .into_iter()
        .map(|a| a as Arc<dyn ProviderAdapter>)
        .collect();
    CascadeSpec::new(capability, adapters)
}

/// Spec over a single mock adapter
pub fn single(capability: Capability, adapter: MockAdapter) -> CascadeSpec {
    spec(capability, vec![Arc::new(adapter)])
}

/// Empty spec for a stage the test never reaches
pub fn unused(capability: Capability) -> CascadeSpec {
    CascadeSpec::new(capability, Vec::new())
}
