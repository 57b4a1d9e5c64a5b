/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use integration_test_utils::{
    init_logging, payload, wait_for, RecordingListenerFactory, RecordingProducerFactory,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use stream_router::{
    FlowContext, ListenerConfig, Message, ParentLinkEvent, RemoteAddress, StreamRouter,
};

const WAIT: Duration = Duration::from_secs(5);

type Seen = Arc<Mutex<Vec<(usize, Message, String, Option<String>)>>>;

fn attached_router() -> (StreamRouter, Arc<RecordingListenerFactory>) {
    init_logging();
    let listeners = RecordingListenerFactory::new();
    let router = StreamRouter::new("nodeB", listeners.clone(), RecordingProducerFactory::new());
    router
        .configure_listeners(
            &ListenerConfig::default(),
            &[ParentLinkEvent::add("p1", "h", 1)],
            "nodeB",
        )
        .expect("add applies");
    (router, listeners)
}

fn register_recording_consumers(router: &StreamRouter, count: usize, faulty: usize) -> Seen {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    for index in 0..count {
        let log = seen.clone();
        router.register_consumer(Arc::new(
            move |message: &Message, origin: &str| -> anyhow::Result<()> {
                let flow = FlowContext::current().map(|ctx| ctx.flow_name().to_string());
                log.lock().push((index, message.clone(), origin.to_string(), flow));
                match index {
                    i if i == faulty && i % 2 == 0 => anyhow::bail!("consumer {i} rejected input"),
                    i if i == faulty => panic!("consumer {i} crashed"),
                    _ => Ok(()),
                }
            },
        ));
    }
    seen
}

#[test]
fn every_consumer_runs_once_even_when_one_fails() {
    for faulty in 0..4 {
        let (router, listeners) = attached_router();
        let seen = register_recording_consumers(&router, 4, faulty);
        let listener = listeners
            .listener("p1", &RemoteAddress::new("h", 1))
            .expect("listener constructed");

        listener.push("ingest", payload(1));
        listener.push("ingest", payload(2));
        router.start_listening().expect("poll thread starts");

        assert!(wait_for(WAIT, || seen.lock().len() == 8));
        router.stop(false);

        let seen = seen.lock();
        for message in [payload(1), payload(2)] {
            let mut invoked: Vec<usize> = seen
                .iter()
                .filter(|(_, m, _, _)| *m == message)
                .map(|(index, _, _, _)| *index)
                .collect();
            invoked.sort();
            assert_eq!(invoked, vec![0, 1, 2, 3], "faulty consumer {faulty}");
        }
    }
}

#[test]
fn consumers_see_origin_parent_and_flow_in_registration_order() {
    let (router, listeners) = attached_router();
    let seen = register_recording_consumers(&router, 2, usize::MAX);
    let listener = listeners
        .listener("p1", &RemoteAddress::new("h", 1))
        .expect("listener constructed");

    listener.push("metrics", payload(7));
    router.start_listening().expect("poll thread starts");
    assert!(wait_for(WAIT, || seen.lock().len() == 2));
    router.stop(false);

    let seen = seen.lock();
    assert_eq!(
        *seen,
        vec![
            (0, payload(7), "p1".to_string(), Some("metrics".to_string())),
            (1, payload(7), "p1".to_string(), Some("metrics".to_string())),
        ]
    );
    assert!(FlowContext::current().is_none());
}

#[test]
fn duplicate_consumer_registration_is_invoked_twice() {
    let (router, listeners) = attached_router();
    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let consumer: stream_router::ConsumerCallback =
        Arc::new(move |_: &Message, _: &str| -> anyhow::Result<()> {
            *counter.lock() += 1;
            Ok(())
        });
    router.register_consumer(consumer.clone());
    router.register_consumer(consumer);
    assert_eq!(router.consumer_count(), 2);

    listeners
        .listener("p1", &RemoteAddress::new("h", 1))
        .expect("listener constructed")
        .push("f", payload(0));
    router.start_listening().expect("poll thread starts");

    assert!(wait_for(WAIT, || *calls.lock() == 2));
    router.stop(false);
}

#[test]
fn failing_fetch_does_not_starve_other_listeners() {
    let (router, listeners) = attached_router();
    router
        .configure_listeners(
            &ListenerConfig::default(),
            &[ParentLinkEvent::add("p2", "h", 2)],
            "nodeB",
        )
        .expect("add applies");
    let seen = register_recording_consumers(&router, 1, usize::MAX);

    listeners
        .listener("p1", &RemoteAddress::new("h", 1))
        .expect("p1 listener")
        .set_fail_fetch(true);
    listeners
        .listener("p2", &RemoteAddress::new("h", 2))
        .expect("p2 listener")
        .push("f", payload(3));

    router.start_listening().expect("poll thread starts");
    assert!(wait_for(WAIT, || seen.lock().len() == 1));
    router.stop(false);

    assert_eq!(seen.lock()[0].2, "p2");
}

#[test]
fn dispatcher_handle_reports_failures_without_raising() {
    let (router, _) = attached_router();
    register_recording_consumers(&router, 3, 1);

    let report = router
        .dispatcher()
        .dispatch(FlowContext::new("manual"), &payload(9), "p1");

    assert_eq!(report.delivered, 2);
    assert_eq!(report.invoked(), 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.contains("consumer 1 crashed"));
    assert_eq!(report.failures[0].origin, "p1");
}
