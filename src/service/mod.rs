//! Glue between the host Bluetooth driver and the emulation.
//!
//! The host driver delivers three kinds of events: core Bluetooth status,
//! HID connection changes and HID report data. [Service::run] starts one
//! blocking waiter per kind. Each waiter sleeps until an event arrives and
//! then drains everything pending before waiting again.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;
use tokio::{
    sync::mpsc::{self, error::TryRecvError},
    task::JoinHandle,
};

use crate::{
    bluetooth::{
        is_gamepad_class, BluetoothHost, CoreEvent, DeviceAddress, HidConnectionEvent,
        HidConnectionState, HidReport, HidReportEvent, ReportDirection,
    },
    config::{Config, LoadError},
    controller::registry::{ControllerRegistry, RegistryError},
    ipc::{
        layout::PACKET_TYPE_DATA,
        ring_buffer::{RingBuffer, RingBufferError},
    },
};


/// Possible errors starting the service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] LoadError),
    #[error("unable to create report buffer: {0}")]
    Buffer(#[from] RingBufferError),
}

/// Where translated reports go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Push reports into the ring buffer read by the IPC consumer
    #[default]
    Normal,
    /// Log reports instead of delivering them
    Diagnostic,
}

/// Receiving ends of the host driver's event channels
#[derive(Debug)]
pub struct ServiceChannels {
    pub core: mpsc::Receiver<CoreEvent>,
    pub connection: mpsc::Receiver<HidConnectionEvent>,
    pub reports: mpsc::Receiver<HidReportEvent>,
}

#[derive(Debug)]
pub struct Service {
    registry: ControllerRegistry,
    buffer: RingBuffer,
    latest: Mutex<HashMap<DeviceAddress, HidReport>>,
}

impl Service {
    /// Create the service. Fails if the configuration cannot be used.
    pub fn new(config: Config, host: Arc<dyn BluetoothHost>) -> Result<Self, ServiceError> {
        config.validate()?;
        let buffer = RingBuffer::new(config.buffer_size)?;
        log::debug!("Created report buffer of {} bytes", buffer.capacity());
        Ok(Self {
            registry: ControllerRegistry::new(config, host),
            buffer,
            latest: Mutex::new(HashMap::new()),
        })
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Ring buffer read by the IPC consumer
    pub fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }

    /// Returns the last translated input report for the given controller, for
    /// consumers that poll instead of reading the ring buffer
    pub fn latest_report(&self, address: &DeviceAddress) -> Option<HidReport> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.get(address).copied()
    }

    /// Start the event waiters. They exit once the host driver closes their
    /// channel.
    pub fn run(
        self: Arc<Self>,
        channels: ServiceChannels,
        mode: DispatchMode,
    ) -> Vec<JoinHandle<()>> {
        log::info!("Starting event waiters in {mode:?} mode");
        let ServiceChannels {
            core,
            connection,
            reports,
        } = channels;

        let service = self.clone();
        let core = spawn_waiter("core", core, move |event| service.handle_core_event(&event));
        let service = self.clone();
        let connection = spawn_waiter("connection", connection, move |event| {
            service.handle_connection_event(&event)
        });
        let service = self;
        let reports = spawn_waiter("report", reports, move |event| {
            service.handle_report_event(&event, mode)
        });

        vec![core, connection, reports]
    }

    /// Core events are only logged
    pub fn handle_core_event(&self, event: &CoreEvent) {
        match event {
            CoreEvent::DiscoveryStateChanged { active } => {
                log::debug!("Discovery active: {active}");
            }
            CoreEvent::DeviceFound {
                address,
                class_of_device,
            } => {
                let gamepad = is_gamepad_class(*class_of_device);
                log::debug!("Found device {address} ({class_of_device:#08x}), gamepad: {gamepad}");
            }
            CoreEvent::PairingRequest { address } => {
                log::info!("Pairing requested by {address}");
            }
        }
    }

    pub fn handle_connection_event(&self, event: &HidConnectionEvent) {
        let address = event.address;
        match event.state {
            HidConnectionState::Connected {
                hardware_id,
                class_of_device,
            } => match self.registry.attach(address, hardware_id, class_of_device) {
                Ok(family) => log::debug!("{address} ({hardware_id}) handled as {family:?}"),
                Err(e) => log::info!("Not handling {address}: {e}"),
            },
            HidConnectionState::Disconnected => {
                // Held across the detach so a report in flight cannot bring
                // the entry back
                let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = self.registry.detach(&address) {
                    log::debug!("Ignoring disconnect: {e}");
                }
                latest.remove(&address);
            }
        }
    }

    /// Translate a report and deliver the result according to the mode
    pub fn handle_report_event(&self, event: &HidReportEvent, mode: DispatchMode) {
        let address = event.address;
        let result = match event.direction {
            ReportDirection::Input => self
                .registry
                .handle_input_report(&address, &event.report)
                .map(|report| {
                    let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
                    if self.registry.contains(&address) {
                        latest.insert(address, report);
                    }
                    Some(report)
                }),
            ReportDirection::Output => self.registry.handle_output_report(&address, &event.report),
        };

        match result {
            Ok(Some(report)) => self.dispatch(&address, &report, mode),
            Ok(None) => (),
            // Reports can still arrive while a controller disconnects
            Err(RegistryError::NotFound(address)) => {
                log::debug!("Dropping report for unknown controller {address}");
            }
            Err(e) => log::debug!("Dropping report: {e}"),
        }
    }

    fn dispatch(&self, address: &DeviceAddress, report: &HidReport, mode: DispatchMode) {
        match mode {
            DispatchMode::Normal => {
                if let Err(e) = self.buffer.write(PACKET_TYPE_DATA, report.as_bytes()) {
                    log::debug!("Dropping report for {address}: {e}");
                }
            }
            DispatchMode::Diagnostic => log::info!("{address}: {report:?}"),
        }
    }
}

/// Spawn a blocking task that feeds every event of the given channel to the
/// given handler
fn spawn_waiter<T, F>(
    name: &'static str,
    mut rx: mpsc::Receiver<T>,
    handler: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(T) + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        log::debug!("Started {name} waiter");
        'wait: while let Some(event) = rx.blocking_recv() {
            handler(event);

            // Drain everything else that is pending
            loop {
                match rx.try_recv() {
                    Ok(event) => handler(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'wait,
                }
            }
        }
        log::debug!("Stopped {name} waiter");
    })
}
