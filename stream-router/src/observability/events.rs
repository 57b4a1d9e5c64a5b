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

//! Stable event names.

pub const ROUTER_CREATED: &str = "router_created";
pub const ROUTER_FLOWS_CONFIGURED: &str = "router_flows_configured";
pub const ROUTER_PRODUCER_CONFIGURED: &str = "router_producer_configured";
pub const ROUTER_PRODUCER_REPLACED: &str = "router_producer_replaced";
pub const ROUTER_CONSUMER_REGISTERED: &str = "router_consumer_registered";
pub const ROUTER_STOP: &str = "router_stop";
pub const ROUTER_STOP_FROM_POLL_THREAD: &str = "router_stop_from_poll_thread";
pub const ROUTER_RESET_LISTENERS: &str = "router_reset_listeners";

pub const TOPOLOGY_LISTENER_ADDED: &str = "topology_listener_added";
pub const TOPOLOGY_LISTENER_ALREADY_PRESENT: &str = "topology_listener_already_present";
pub const TOPOLOGY_LISTENER_REMOVED: &str = "topology_listener_removed";
pub const TOPOLOGY_LISTENER_NOT_PRESENT: &str = "topology_listener_not_present";
pub const TOPOLOGY_LISTENER_CREATE_FAILED: &str = "topology_listener_create_failed";

pub const POLL_LOOP_START: &str = "poll_loop_start";
pub const POLL_LOOP_EXIT: &str = "poll_loop_exit";
pub const POLL_FETCH_FAILED: &str = "poll_fetch_failed";
pub const POLL_THREAD_PANICKED: &str = "poll_thread_panicked";

pub const DISPATCH_CONSUMER_FAILED: &str = "dispatch_consumer_failed";
pub const DISPATCH_CONSUMER_PANICKED: &str = "dispatch_consumer_panicked";

pub const INGRESS_RECEIVE: &str = "ingress_receive";
pub const INGRESS_DRAIN_ON_CLOSE: &str = "ingress_drain_on_close";
pub const INGRESS_CLOSED: &str = "ingress_closed";

pub const FLOW_RESOLVED: &str = "flow_resolved";
pub const FLOW_RESOLUTION_FAILED: &str = "flow_resolution_failed";

pub const SEND_NO_DOWNSTREAM_TARGETS: &str = "send_no_downstream_targets";

pub const EGRESS_PRODUCER_DORMANT: &str = "egress_producer_dormant";
pub const EGRESS_WORKER_START: &str = "egress_worker_start";
pub const EGRESS_WORKER_STOP: &str = "egress_worker_stop";
pub const EGRESS_SEND_ATTEMPT: &str = "egress_send_attempt";
pub const EGRESS_SEND_OK: &str = "egress_send_ok";
pub const EGRESS_SEND_FAILED: &str = "egress_send_failed";
pub const EGRESS_DROP_UNDECLARED_TARGET: &str = "egress_drop_undeclared_target";
pub const EGRESS_DROP_QUEUE_FULL: &str = "egress_drop_queue_full";
pub const EGRESS_DRAIN_TIMEOUT: &str = "egress_drain_timeout";
pub const EGRESS_STATISTICS_SINK_PANICKED: &str = "egress_statistics_sink_panicked";
