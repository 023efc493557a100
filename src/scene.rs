// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene invocation and saving.
//!
//! The appliance has no API to set a mode directly, only front panel
//! buttons. A scene is therefore translated into button presses, and only
//! the presses needed to move from the current state to the target are
//! sent. Sleep and automatic mode are toggles, the fan has an up and a
//! down button.
//!
//! | target fan | current fan | presses              |
//! |------------|-------------|----------------------|
//! | 1          | any         | fan down, fan down   |
//! | 2          | 1           | fan up               |
//! | 2          | 3           | fan down             |
//! | 2          | 2 / unknown | none                 |
//! | 3          | any         | fan up, fan up       |

use crate::appliance::ApplianceClient;
use crate::context::BridgeContext;
use crate::profile::{SaveOutcome, SceneSpec};
use crate::state::ApplianceState;
use crate::types::{Button, FanSpeed};

/// Computes the button presses that move `current` to `spec`.
///
/// Sleep mode comes first, then automatic mode, then the fan. A toggle is
/// skipped when the current mode is unknown: a mode the appliance never
/// reported is not assumed to be off.
///
/// # Examples
///
/// ```
/// use venta_vdc::scene::plan;
/// use venta_vdc::profile::SceneSpec;
/// use venta_vdc::state::ApplianceState;
/// use venta_vdc::telemetry::DeviceReport;
/// use venta_vdc::types::{Button, FanSpeed};
///
/// let mut current = ApplianceState::new();
/// current.merge(&DeviceReport { fan: Some(1), sleep_mode: Some(true), ..Default::default() });
///
/// let spec = SceneSpec { fan: Some(FanSpeed::MEDIUM), sleep_mode: Some(false), auto_mode: None };
/// assert_eq!(plan(&spec, &current), vec![Button::ToggleSleep, Button::FanUp]);
/// ```
#[must_use]
pub fn plan(spec: &SceneSpec, current: &ApplianceState) -> Vec<Button> {
    let mut buttons = Vec::new();

    toggle(
        &mut buttons,
        "sleep",
        spec.sleep_mode,
        current.sleep_mode(),
        Button::ToggleSleep,
    );
    toggle(
        &mut buttons,
        "automatic",
        spec.auto_mode,
        current.auto_mode(),
        Button::ToggleAuto,
    );

    match spec.fan {
        Some(FanSpeed::LOW) => buttons.extend([Button::FanDown, Button::FanDown]),
        Some(FanSpeed::HIGH) => buttons.extend([Button::FanUp, Button::FanUp]),
        Some(_) => match current.fan() {
            Some(1) => buttons.push(Button::FanUp),
            Some(3) => buttons.push(Button::FanDown),
            _ => {}
        },
        None => {}
    }

    buttons
}

fn toggle(
    buttons: &mut Vec<Button>,
    mode: &str,
    target: Option<bool>,
    current: Option<bool>,
    button: Button,
) {
    match (target, current) {
        (Some(target), Some(current)) if target != current => buttons.push(button),
        (Some(target), None) => {
            tracing::warn!(mode, target, "Current mode unknown, not toggling");
        }
        _ => {}
    }
}

/// What [`SceneEngine::invoke`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// The scene number is not configured, nothing happened.
    NotConfigured,
    /// The scene was applied with these presses.
    Applied(Vec<Button>),
}

/// Applies and records scenes.
#[derive(Debug, Clone)]
pub struct SceneEngine {
    client: ApplianceClient,
}

impl SceneEngine {
    /// Creates an engine sending commands through `client`.
    #[must_use]
    pub fn new(client: ApplianceClient) -> Self {
        Self { client }
    }

    /// Invokes a scene.
    ///
    /// Unconfigured scene numbers are ignored. Otherwise the appliance is
    /// read once, and only the presses returned by [`plan`] are sent. If
    /// that read fails, the last known state is used instead.
    /// `force` is accepted for protocol compatibility and has no effect.
    ///
    /// # Errors
    ///
    /// Returns `Error::CommandFailed` for the first press that fails.
    /// Presses after a failed one are not sent.
    pub async fn invoke(
        &self,
        ctx: &BridgeContext,
        scene: i32,
        force: bool,
    ) -> crate::Result<InvokeOutcome> {
        let spec = ctx.lock().profile.scenes().get(scene).copied();
        let Some(spec) = spec else {
            tracing::info!(scene, "Called scene is not configured");
            return Ok(InvokeOutcome::NotConfigured);
        };
        tracing::info!(scene, force, ?spec, "Calling scene");

        let current = match self.client.fetch_state(ctx).await {
            Ok(refresh) => {
                if refresh.changed {
                    ctx.lock().dirty = true;
                }
                refresh.state
            }
            Err(e) => {
                tracing::warn!(scene, error = %e, "Could not refresh appliance, using last known state");
                ctx.lock().appliance
            }
        };

        let buttons = plan(&spec, &current);
        for button in &buttons {
            self.client.send_button(*button).await?;
        }
        tracing::debug!(scene, presses = buttons.len(), "Scene applied");
        Ok(InvokeOutcome::Applied(buttons))
    }

    /// Records a scene number sent by the bus and persists the table.
    ///
    /// An existing scene keeps its settings. When the table is full the
    /// call is dropped and nothing is written.
    pub fn save(&self, ctx: &BridgeContext, scene: i32) -> SaveOutcome {
        let outcome = ctx.lock().profile.scenes_mut().save(scene);
        match outcome {
            SaveOutcome::Full => {
                tracing::warn!(scene, "Scene table is full, ignoring save");
            }
            SaveOutcome::Added | SaveOutcome::Updated => {
                tracing::info!(scene, ?outcome, "Scene saved");
                if let Err(e) = ctx.persist() {
                    tracing::error!(error = %e, "Could not write configuration");
                }
            }
        }
        outcome
    }
}
