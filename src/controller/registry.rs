use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;

use crate::{
    bluetooth::{BluetoothHost, DeviceAddress, DeviceWriter, HardwareId, HidReport},
    config::Config,
    drivers::DeviceFamily,
};

use super::handler::ControllerHandler;

/// Possible errors looking up or attaching a controller
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no controller attached at {0}")]
    NotFound(DeviceAddress),
    #[error("no decoder for device {hardware_id} at {address}")]
    Unsupported {
        address: DeviceAddress,
        hardware_id: HardwareId,
    },
}

/// Owns the handler of every attached controller, keyed by address.
///
/// The map is behind one coarse lock since attach and detach are rare. Each
/// handler has a lock of its own so reports for different controllers do
/// not contend.
pub struct ControllerRegistry {
    config: Config,
    host: Arc<dyn BluetoothHost>,
    handlers: Mutex<HashMap<DeviceAddress, Arc<Mutex<ControllerHandler>>>>,
}

impl ControllerRegistry {
    pub fn new(config: Config, host: Arc<dyn BluetoothHost>) -> Self {
        Self {
            config,
            host,
            handlers: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identify a newly connected device and create its handler
    pub fn attach(
        &self,
        address: DeviceAddress,
        hardware_id: HardwareId,
        class_of_device: u32,
    ) -> Result<DeviceFamily, RegistryError> {
        let Some(family) = DeviceFamily::identify(&self.config, &hardware_id, class_of_device)
        else {
            return Err(RegistryError::Unsupported {
                address,
                hardware_id,
            });
        };
        self.attach_family(address, family);
        Ok(family)
    }

    /// Create a handler of the given family. A controller that is still
    /// attached at the same address is replaced.
    pub fn attach_family(&self, address: DeviceAddress, family: DeviceFamily) {
        let writer = DeviceWriter::new(address, self.host.clone());
        let profile = self.config.profile_for(&address);
        let mut handler = ControllerHandler::new(family, writer, profile);
        handler.initialize();

        let handler = Arc::new(Mutex::new(handler));
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        if handlers.insert(address, handler).is_some() {
            log::warn!("Replaced controller that was still attached at {address}");
        }
        log::info!("Attached {family:?} controller at {address}");
    }

    /// Destroy the handler of a disconnected controller
    pub fn detach(&self, address: &DeviceAddress) -> Result<(), RegistryError> {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        match handlers.remove(address) {
            Some(_) => {
                log::info!("Detached controller at {address}");
                Ok(())
            }
            None => Err(RegistryError::NotFound(*address)),
        }
    }

    /// Returns the handler attached at the given address
    pub fn get(&self, address: &DeviceAddress) -> Option<Arc<Mutex<ControllerHandler>>> {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.get(address).cloned()
    }

    pub fn contains(&self, address: &DeviceAddress) -> bool {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.contains_key(address)
    }

    /// Addresses of every attached controller
    pub fn addresses(&self) -> Vec<DeviceAddress> {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut addresses: Vec<DeviceAddress> = handlers.keys().copied().collect();
        addresses.sort();
        addresses
    }

    pub fn len(&self) -> usize {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Translate an input report from the controller at the given address
    pub fn handle_input_report(
        &self,
        address: &DeviceAddress,
        report: &HidReport,
    ) -> Result<HidReport, RegistryError> {
        let handler = self.get(address).ok_or(RegistryError::NotFound(*address))?;
        let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(handler.handle_input_report(report))
    }

    /// Process an output report the console wrote to the controller at the
    /// given address
    pub fn handle_output_report(
        &self,
        address: &DeviceAddress,
        report: &HidReport,
    ) -> Result<Option<HidReport>, RegistryError> {
        let handler = self.get(address).ok_or(RegistryError::NotFound(*address))?;
        let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(handler.handle_output_report(report))
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("addresses", &self.addresses())
            .finish()
    }
}
