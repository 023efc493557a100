// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tokio::sync::{mpsc, watch};

use venta_vdc::appliance::ApplianceClient;
use venta_vdc::bus::{BusEvent, TracingTransport};
use venta_vdc::config::{ConfigStore, LoadedConfig, Settings};
use venta_vdc::context::{BridgeContext, BridgeState, Identity};
use venta_vdc::error::ConfigError;
use venta_vdc::host::VdcHost;
use venta_vdc::protocol::HttpConfig;
use venta_vdc::sync::StateSynchronizer;
use venta_vdc::types::DsUid;

/// Capacity of the bus event queue.
const EVENT_QUEUE: usize = 32;

/// Bridge a Venta humidifier into a digitalSTROM vDC host.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file, created as a template if missing.
    #[arg(long = "cfgfile", value_name = "PATH", default_value = "venta.toml")]
    cfgfile: PathBuf,

    /// Syslog style verbosity (0-10), overrides `debug` from the file.
    #[arg(long = "debuglevel", value_name = "N")]
    debuglevel: Option<u8>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let store = ConfigStore::new(cli.cfgfile.clone());
    let loaded = store.load(Utc::now());

    let file_level = loaded.as_ref().ok().and_then(|c| c.settings.debug_level);
    let level = cli
        .debuglevel
        .or(file_level)
        .unwrap_or(Settings::DEFAULT_DEBUG_LEVEL);
    tracing_subscriber::fmt()
        .with_max_level(log_level(level))
        .init();

    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            report_config_error(&store, &e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(path = %store.path().display(), "Loaded configuration");

    match run(store, loaded).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Bridge failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(store: ConfigStore, loaded: LoadedConfig) -> venta_vdc::Result<()> {
    let LoadedConfig {
        profile,
        settings,
        vdc_dsuid,
        lib_dsuid,
    } = loaded;

    let generated = vdc_dsuid.is_none() || lib_dsuid.is_none();
    let identity = Identity::new(
        vdc_dsuid.unwrap_or_else(DsUid::random),
        lib_dsuid.unwrap_or_else(DsUid::random),
        DsUid::for_device(profile.id()),
        local_hostname(),
    );
    tracing::info!(
        vdc = %identity.vdc(),
        device = %identity.device(),
        appliance = profile.address(),
        "Starting {}",
        identity.service_name()
    );

    let client = ApplianceClient::new(HttpConfig::new(profile.address()))?;
    let ctx = Arc::new(
        BridgeContext::new(BridgeState::new(profile, settings), identity).with_store(store),
    );
    if generated {
        ctx.persist()?;
        tracing::info!("Stored generated dSUIDs");
    }

    let transport = Arc::new(TracingTransport::new());
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // The loopback transport starts with an open session.
    if events_tx.send(BusEvent::NewSession).await.is_err() {
        tracing::warn!("Bus event queue closed before start");
    }

    let poller = StateSynchronizer::new(client.clone(), Arc::clone(&ctx), Arc::clone(&transport));
    let poller = tokio::spawn(poller.run(shutdown_rx.clone()));
    let host = VdcHost::new(Arc::clone(&ctx), transport, client, events_rx);
    let host = tokio::spawn(host.run(shutdown_rx));

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    shutdown_tx.send_replace(true);

    if let Err(e) = host.await {
        tracing::error!(error = %e, "vDC host task failed");
    }
    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Poller task failed");
    }
    drop(events_tx);
    Ok(())
}

fn report_config_error(store: &ConfigStore, error: &ConfigError) {
    let path = store.path().display();
    if matches!(error, ConfigError::NotFound(_)) {
        match store.write_template() {
            Ok(()) => tracing::error!(
                %path,
                "Configuration file not found, wrote a template. Edit it and restart"
            ),
            Err(e) => tracing::error!(%path, error = %e, "Could not write configuration template"),
        }
    } else {
        tracing::error!(%path, error = %error, "Invalid configuration");
    }
}

/// Maps a syslog style verbosity to a tracing level.
fn log_level(level: u8) -> tracing::Level {
    match level {
        0..=3 => tracing::Level::ERROR,
        4 => tracing::Level::WARN,
        5 | 6 => tracing::Level::INFO,
        7 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
