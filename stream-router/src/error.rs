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

//! Error kinds surfaced by the router and its collaborators.

use crate::api::message::RemoteAddress;
use crate::data_plane::dispatcher::ConsumerId;
use thiserror::Error;

/// Errors returned synchronously to whoever called into the [`crate::StreamRouter`].
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("streaming is not configured: no producer has been set up on this node")]
    StreamingNotConfigured,

    #[error("no flow given, no inherited flow context and no default flow configured")]
    MissingDefaultFlow,

    #[error("flow {0:?} is not present in the flow table")]
    UnknownFlow(String),

    #[error("unable to attach listener for parent {parent:?} at {address}: {source}")]
    Topology {
        parent: String,
        address: RemoteAddress,
        source: ListenerError,
    },

    #[error(transparent)]
    Producer(#[from] ProducerError),

    #[error("router has been stopped and cannot be reused")]
    Stopped,

    #[error("unable to launch poll thread: {0}")]
    PollThread(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure raised while constructing or draining a listener.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    #[error("{address} is already subscribed by node {node:?}")]
    AlreadySubscribed { address: RemoteAddress, node: String },

    #[error("subscription to {0} has been torn down")]
    SubscriptionClosed(RemoteAddress),

    #[error("listener transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProducerError {
    #[error("producer is closed")]
    Closed,

    #[error("producer has downstream targets but was never started")]
    NotStarted,

    #[error("unable to start forwarder for target {target:?}: {reason}")]
    Start { target: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("no subscriber for target {target:?} on {address}")]
    NoSubscriber {
        address: RemoteAddress,
        target: String,
    },

    #[error("inbound queue of target {0:?} is full")]
    QueueFull(String),

    #[error("subscriber for target {0:?} has gone away")]
    Disconnected(String),

    #[error("transport failure: {0}")]
    Other(String),
}

/// A consumer callback failed or panicked during dispatch.
///
/// Never returned to a caller; dispatch logs it and reports it in
/// [`crate::DispatchReport::failures`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("consumer {consumer} failed on message from {origin:?}: {reason}")]
pub struct ConsumerCallbackError {
    pub consumer: ConsumerId,
    pub origin: String,
    pub reason: String,
}
