use std::collections::HashMap;
use std::sync::Barrier;
use std::thread;

use crossbeam_channel as chan;
use pretty_assertions::assert_eq;

use super::*;

const CHURN_THREADS: usize = 4;
const DISPATCH_THREADS: usize = 4;
const ITERATIONS: u32 = 256;

/// Check that extensions added during a dispatch come from one consistent
/// view of the registry: the permanent hook first, then at most one
/// extension per churned hook, ordered as each thread registered them.
fn assert_consistent(extensions: &[Extension]) {
    let (first, rest) = extensions.split_first().expect("permanent hook always runs");
    assert_eq!(first.name.as_str(), "permanent/hook");

    let mut last: HashMap<&str, u32> = HashMap::new();
    for ext in rest {
        let seq = u32::from_be_bytes(ext.data.as_slice().try_into().unwrap());
        if let Some(prev) = last.insert(ext.name.as_str(), seq) {
            assert!(prev < seq, "{} ran out of order: {prev} >= {seq}", ext.name);
        }
    }
}

#[test]
fn test_concurrent_register_unregister_dispatch() {
    let hooks = Hooks::new();
    let barrier = Arc::new(Barrier::new(CHURN_THREADS + DISPATCH_THREADS));
    let (done, finished) = chan::bounded::<()>(0);

    hooks.register_response_hook(|_, _, actions| {
        actions.update_request_with_extensions([Extension::new("permanent/hook", vec![])]);
    });
    hooks.register_request_hook(|_, _, actions| {
        actions.use_persistence_option(option("permanent")).unwrap();
    });

    let churn = (0..CHURN_THREADS)
        .map(|t| {
            let hooks = hooks.clone();
            let barrier = barrier.clone();
            let done = done.clone();

            thread::Builder::new()
                .name(format!("churn#{t}"))
                .spawn(move || {
                    let _done = done;
                    let name = ExtensionName::new(format!("churn/{t}"));
                    let mut live = Vec::new();

                    barrier.wait();
                    for seq in 0..ITERATIONS {
                        let name = name.clone();
                        live.push(hooks.register_response_hook(move |_, _, actions| {
                            actions.update_request_with_extensions([Extension::new(
                                name.clone(),
                                seq.to_be_bytes(),
                            )]);
                        }));
                        live.push(hooks.register_request_hook(move |_, _, actions| {
                            actions
                                .use_persistence_option(option(&format!("store-{seq}")))
                                .unwrap();
                        }));
                        if fastrand::bool() {
                            let ix = fastrand::usize(..live.len());
                            let unregister = live.swap_remove(ix);

                            assert!(unregister.unregister());
                            assert!(!unregister.unregister());
                        }
                    }
                    for unregister in live {
                        unregister.unregister();
                    }
                })
                .unwrap()
        })
        .collect::<Vec<_>>();
    drop(done);

    let dispatchers = (0..DISPATCH_THREADS)
        .map(|t| {
            let hooks = hooks.clone();
            let barrier = barrier.clone();
            let finished = finished.clone();

            thread::Builder::new()
                .name(format!("dispatch#{t}"))
                .spawn(move || {
                    let peer: PeerId = arbitrary::gen(1);
                    let mut dispatches = 0usize;

                    barrier.wait();
                    loop {
                        let result = hooks.process_response_hooks(&peer, &response([]));
                        assert!(result.err.is_none());
                        assert_consistent(&result.extensions);

                        let result = hooks.process_request_hooks(&peer, &request([]));
                        assert!(result.persistence_option.is_some());

                        dispatches += 1;

                        // Stop once every churning thread is done.
                        if let Err(chan::TryRecvError::Disconnected) = finished.try_recv() {
                            break dispatches;
                        }
                    }
                })
                .unwrap()
        })
        .collect::<Vec<_>>();

    for t in churn {
        t.join().unwrap();
    }
    let dispatches: usize = dispatchers.into_iter().map(|t| t.join().unwrap()).sum();
    assert!(dispatches >= DISPATCH_THREADS);

    // Only the permanent hooks remain.
    let result = hooks.process_response_hooks(&arbitrary::gen(1), &response([]));
    assert_eq!(
        result.extensions,
        vec![Extension::new("permanent/hook", vec![])]
    );
    let result = hooks.process_request_hooks(&arbitrary::gen(1), &request([]));
    assert_eq!(result.persistence_option, Some(option("permanent")));
}
