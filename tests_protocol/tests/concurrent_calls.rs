//! Concurrent Call Tests
//!
//! Async calls in flight at the same time, each with its own completion
//! offset, must never see each other's payloads.

use call_types::OperationId;
use sim_service::{CompletionMode, SimulatedService};
use tests_protocol::{sample_request, sample_response, Harness};
use trap_api::CompletionSignal;

const SLOT_STRIDE: u64 = 0x200;

/// Each thread writes a payload only it could have produced, then reads its own slot.
#[test]
fn test_disjoint_offsets_read_own_payload() {
    let harness = Harness::with_service(
        SimulatedService::new(sim_service::test_utils::new_region())
            .with_mode(CompletionMode::Deferred),
    );

    std::thread::scope(|scope| {
        for index in 0..16u64 {
            let harness = &harness;
            scope.spawn(move || {
                let (signal, handle) = harness.handle_at(index * SLOT_STRIDE);
                let pending = harness
                    .client
                    .submit_async(sample_request(OperationId::GetProcessThreads), handle.clone())
                    .unwrap();

                let payload: Vec<u8> = (0..(64 + index as usize))
                    .map(|byte| (byte as u8) ^ (index as u8).wrapping_mul(37))
                    .collect();
                harness
                    .service
                    .region()
                    .write_completion(&handle, &payload)
                    .unwrap();
                signal.signal();

                assert_eq!(pending.wait_payload().unwrap(), payload);
            });
        }
    });

    assert_eq!(harness.service.pending_count(), 16);
    assert_eq!(harness.allocator.outstanding(), 0);
}

/// Distinct operations completing concurrently decode their own answers.
#[test]
fn test_concurrent_completions_decode_independently() {
    let harness = Harness::new();
    let operations: Vec<OperationId> = OperationId::ALL
        .into_iter()
        .filter(|operation| *operation != OperationId::CancelAsyncCall)
        .collect();
    for (seed, operation) in operations.iter().enumerate() {
        harness
            .service
            .respond(sample_response(*operation, seed as u32 + 1));
    }

    std::thread::scope(|scope| {
        for (seed, operation) in operations.iter().enumerate() {
            let harness = &harness;
            let operation = *operation;
            scope.spawn(move || {
                let (_signal, handle) = harness.handle_at(seed as u64 * SLOT_STRIDE);
                let pending = harness
                    .client
                    .submit_async(sample_request(operation), handle)
                    .unwrap();
                assert_eq!(
                    pending.wait().unwrap(),
                    sample_response(operation, seed as u32 + 1)
                );
            });
        }
    });

    let offsets: Vec<u64> = harness
        .service
        .submissions()
        .iter()
        .filter_map(|submission| submission.offset)
        .collect();
    assert_eq!(offsets.len(), operations.len());
}

/// Synchronous calls from many threads share one client without leaking envelopes.
#[test]
fn test_parallel_sync_calls() {
    let harness = Harness::new();
    harness
        .service
        .respond(sample_response(OperationId::OpenThread, 77));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let harness = &harness;
            scope.spawn(move || {
                for _ in 0..50 {
                    let response = harness
                        .client
                        .call(sample_request(OperationId::OpenThread))
                        .unwrap();
                    assert_eq!(response, sample_response(OperationId::OpenThread, 77));
                }
            });
        }
    });

    assert_eq!(harness.service.submissions().len(), 400);
    assert_eq!(harness.allocator.acquired(), 400);
    assert_eq!(harness.allocator.outstanding(), 0);
}
