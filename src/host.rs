// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol loop serving the bus controller.
//!
//! [`VdcHost`] consumes [`BusEvent`]s from the transport and, between
//! events and on a fixed [`WORK_INTERVAL`], drives the announcement state
//! machine and pushes fresh readings. The periodic work only ever
//! *tries* to take the bridge lock. If the poller holds it, the work is
//! skipped and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::appliance::ApplianceClient;
use crate::bridge::{PropertyBridge, PropertyEntry, ResultCode};
use crate::bus::{BusEvent, BusTransport};
use crate::context::{BridgeContext, Target};
use crate::scene::SceneEngine;

/// Period of the announce / push work when no event arrives.
pub const WORK_INTERVAL: Duration = Duration::from_secs(2);

/// Generic request command that is accepted.
const TURN_ON_ACTION: &str = "ActTurnOn";

/// What one pass of [`VdcHost::work`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStep {
    /// The lock was taken, nothing done.
    Busy,
    /// No bus session, the device is marked as not announced.
    NoSession,
    /// The device was announced.
    Announced,
    /// The device was reported present.
    PresenceSignaled,
    /// The device was reported gone.
    Vanished,
    /// Fresh readings were pushed.
    Pushed,
    /// Nothing to do.
    Idle,
}

/// Event loop of the bridge.
pub struct VdcHost<T: BusTransport> {
    ctx: Arc<BridgeContext>,
    transport: Arc<T>,
    bridge: PropertyBridge,
    scenes: SceneEngine,
    events: mpsc::Receiver<BusEvent>,
}

impl<T: BusTransport> VdcHost<T> {
    /// Creates the loop. `client` is used for scene invocations.
    #[must_use]
    pub fn new(
        ctx: Arc<BridgeContext>,
        transport: Arc<T>,
        client: ApplianceClient,
        events: mpsc::Receiver<BusEvent>,
    ) -> Self {
        Self {
            ctx,
            transport,
            bridge: PropertyBridge::new(),
            scenes: SceneEngine::new(client),
            events,
        }
    }

    /// Runs until `shutdown` turns `true`, its sender is dropped, or the
    /// event channel closes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(WORK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(service = %self.ctx.identity().service_name(), "Starting vDC host");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Bus event channel closed");
                        break;
                    };
                    self.handle_event(event).await;
                    self.work();
                }
                _ = ticker.tick() => {
                    self.work();
                }
            }
        }

        tracing::info!("vDC host stopped");
    }

    /// Runs one pass of the announce / presence / push state machine.
    ///
    /// At most one step is taken per pass.
    pub fn work(&self) -> WorkStep {
        let Some(mut state) = self.ctx.try_lock() else {
            tracing::trace!("Bridge busy, deferring work");
            return WorkStep::Busy;
        };

        if !self.transport.has_session() {
            state.presence.announced = false;
            return WorkStep::NoSession;
        }

        let identity = self.ctx.identity();
        let device = identity.device();

        if !state.presence.announced {
            return match self.transport.announce_device(identity.vdc(), device) {
                Ok(()) => {
                    tracing::info!(%device, name = state.profile.name(), "Device announced");
                    state.presence.announced = true;
                    state.presence.present_signaled = false;
                    WorkStep::Announced
                }
                Err(e) => {
                    tracing::warn!(%device, error = %e, "Could not announce device");
                    WorkStep::Idle
                }
            };
        }

        let presence = state.presence;
        if presence.present && !presence.present_signaled {
            if let Err(e) = self.transport.identify_device(device) {
                tracing::warn!(%device, error = %e, "Could not report device present");
                return WorkStep::Idle;
            }
            state.presence.present_signaled = true;
            return WorkStep::PresenceSignaled;
        }
        if !presence.present && presence.present_signaled {
            if let Err(e) = self.transport.device_vanished(device) {
                tracing::warn!(%device, error = %e, "Could not report device gone");
                return WorkStep::Idle;
            }
            state.presence.present_signaled = false;
            return WorkStep::Vanished;
        }

        if state.dirty {
            let payload = self.bridge.push_payload(&mut state, Utc::now());
            return match self.transport.push_property(device, payload) {
                Ok(()) => {
                    tracing::debug!(%device, "Pushed sensor states");
                    state.dirty = false;
                    WorkStep::Pushed
                }
                Err(e) => {
                    tracing::warn!(%device, error = %e, "Could not push sensor states");
                    WorkStep::Idle
                }
            };
        }

        WorkStep::Idle
    }

    /// Handles one event from the transport.
    pub async fn handle_event(&self, event: BusEvent) {
        let identity = self.ctx.identity();
        match event {
            BusEvent::NewSession => {
                tracing::info!("Bus session started");
                self.ctx.lock().presence.announced = false;
                if let Err(e) = self.transport.announce_container(identity.vdc()) {
                    tracing::error!(error = %e, "Could not announce container");
                }
            }
            BusEvent::EndSession => {
                tracing::info!("Bus session ended");
                self.ctx.lock().presence.announced = false;
            }
            BusEvent::Ping { dsuid } => match identity.resolve(&dsuid) {
                Some(own) => {
                    tracing::trace!(%own, "ping");
                    if let Err(e) = self.transport.send_pong(own) {
                        tracing::warn!(%own, error = %e, "Could not send pong");
                    }
                }
                None => tracing::warn!(dsuid, "Ping for unknown dSUID"),
            },
            BusEvent::GetProperty { dsuid, query, reply } => {
                let answer = self.bridge.get(&self.ctx, &dsuid, &query, Utc::now());
                if reply.send(answer).is_err() {
                    tracing::debug!(dsuid, "get property: requester went away");
                }
            }
            BusEvent::SetProperty {
                dsuid,
                entries,
                reply,
            } => {
                let answer = self.bridge.set(&self.ctx, &dsuid, &entries);
                if reply.send(answer).is_err() {
                    tracing::debug!(dsuid, "set property: requester went away");
                }
            }
            BusEvent::CallScene {
                dsuids,
                scene,
                force,
            } => {
                if !self.addresses_device(&dsuids) {
                    tracing::warn!(?dsuids, scene, "Scene call for unknown dSUIDs");
                    return;
                }
                if let Err(e) = self.scenes.invoke(&self.ctx, scene, force).await {
                    tracing::error!(scene, error = %e, "Scene call failed");
                }
            }
            BusEvent::SaveScene { dsuids, scene } => {
                if self.addresses_device(&dsuids) {
                    self.scenes.save(&self.ctx, scene);
                } else {
                    tracing::warn!(?dsuids, scene, "Scene save for unknown dSUIDs");
                }
            }
            BusEvent::Identify { dsuid } => {
                tracing::info!(dsuid, "Identify requested, the appliance cannot signal");
            }
            BusEvent::Remove { dsuid, reply } => {
                tracing::info!(dsuid, "Device removal requested");
                if reply.send(true).is_err() {
                    tracing::debug!(dsuid, "remove: requester went away");
                }
            }
            BusEvent::GenericRequest {
                dsuid,
                method,
                params,
                reply,
            } => {
                let code = if identity.target(&dsuid) == Some(Target::Device) {
                    generic_request(&method, &params)
                } else {
                    tracing::warn!(dsuid, method, "Generic request for unknown dSUID");
                    ResultCode::NotFound
                };
                if reply.send(code).is_err() {
                    tracing::debug!(dsuid, "generic request: requester went away");
                }
            }
        }
    }

    fn addresses_device(&self, dsuids: &[String]) -> bool {
        let identity = self.ctx.identity();
        dsuids
            .iter()
            .any(|d| identity.target(d) == Some(Target::Device))
    }
}

impl<T: BusTransport> std::fmt::Debug for VdcHost<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VdcHost")
            .field("identity", self.ctx.identity())
            .finish_non_exhaustive()
    }
}

/// Evaluates a generic request addressed to the device.
///
/// Only the `id` parameter is looked at. `ActTurnOn` is acknowledged, the
/// appliance has no power button on its API.
fn generic_request(method: &str, params: &[PropertyEntry]) -> ResultCode {
    for param in params {
        let Some(name) = param.name.as_deref() else {
            tracing::warn!(method, "generic request: wildcard parameters are not handled");
            return ResultCode::NotImplemented;
        };
        if name != "id" {
            continue;
        }
        return match param.value.as_str() {
            Some(TURN_ON_ACTION) => {
                tracing::info!(method, id = TURN_ON_ACTION, "generic request");
                ResultCode::Ok
            }
            Some(id) => {
                tracing::warn!(method, id, "generic request: unknown action");
                ResultCode::NotImplemented
            }
            None => ResultCode::InvalidValueType,
        };
    }
    tracing::warn!(method, "generic request without id");
    ResultCode::MissingData
}
