/*! Integration tests for Fieldgraph.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - reference: Tests for single references (binding, text form, resolving)
 * - reference_list: Tests for reference lists and auto-sizing
 * - entity: Tests for entity-level operations (fields, copying, back-edges)
 * - persist: Tests for whole-model records and file round trips
 * - properties: Property tests of the back-edge invariants
 * - scenarios: End-to-end lifecycle scenarios
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fieldgraph=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod entity;
mod helpers;
mod reference;
mod reference_list;
mod scenarios;
