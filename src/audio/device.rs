//! Audio device enumeration and lookup
//!
//! Enumerates output devices from all available cpal hosts so an
//! embedding application can offer device selection, and resolves a
//! configured [`DeviceId`] back to a concrete device.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Host, HostId};

use super::config::DeviceId;
use super::error::{AudioError, AudioResult};

/// Human-readable name for a host ID
fn host_name(host_id: HostId) -> String {
    let name = format!("{:?}", host_id);
    match name.as_str() {
        "Alsa" => "ALSA".to_string(),
        "Wasapi" => "WASAPI".to_string(),
        "Jack" => "JACK".to_string(),
        _ => name,
    }
}

fn get_host_by_name(name: &str) -> Option<Host> {
    for host_id in cpal::available_hosts() {
        if host_name(host_id) == name {
            return cpal::host_from_id(host_id).ok();
        }
    }
    None
}

/// An available audio output device
#[derive(Debug, Clone)]
pub struct OutputDevice {
    /// Identifier for configuration (includes host info)
    pub id: DeviceId,
    /// Human-readable device name
    pub name: String,
    /// Host backend name (e.g., "ALSA", "WASAPI")
    pub host: String,
    /// Whether this is the system default device for its host
    pub is_default: bool,
}

impl std::fmt::Display for OutputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.host, self.name)
    }
}

/// List all available output devices across all hosts
pub fn get_output_devices() -> AudioResult<Vec<OutputDevice>> {
    let mut all_devices: Vec<OutputDevice> = Vec::new();

    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("Could not initialize host {:?}: {}", host_id, e);
                continue;
            }
        };

        let host_name_str = host_name(host_id);
        let default_device_name = host
            .default_output_device()
            .and_then(|d: cpal::Device| d.name().ok());

        let devices_iter = match host.output_devices() {
            Ok(d) => d,
            Err(e) => {
                log::debug!("Could not enumerate devices for {:?}: {}", host_id, e);
                continue;
            }
        };

        for device in devices_iter {
            let name = match device.name() {
                Ok(n) => n,
                Err(_) => continue,
            };
            // Skip devices with no usable output configuration
            match device.supported_output_configs() {
                Ok(mut configs) => {
                    if configs.next().is_none() {
                        continue;
                    }
                }
                Err(_) => continue,
            }

            let is_default = default_device_name.as_ref() == Some(&name);
            all_devices.push(OutputDevice {
                id: DeviceId::with_host(&name, &host_name_str),
                name,
                host: host_name_str.clone(),
                is_default,
            });
        }
    }

    if all_devices.is_empty() {
        return Err(AudioError::NoDevices);
    }

    // Defaults first, then by host and name
    all_devices.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| a.host.cmp(&b.host))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(all_devices)
}

/// Find a device by its configured ID
///
/// Uses the host named in the ID when given, otherwise searches all hosts.
pub fn find_device_by_id(id: &DeviceId) -> AudioResult<cpal::Device> {
    if let Some(ref host) = id.host {
        if let Some(host) = get_host_by_name(host) {
            return host
                .output_devices()
                .map_err(|e| AudioError::ConfigError(e.to_string()))?
                .find(|d: &cpal::Device| d.name().ok().as_ref() == Some(&id.name))
                .ok_or_else(|| AudioError::DeviceNotFound(id.name.clone()));
        }
    }

    for host_id in cpal::available_hosts() {
        if let Ok(host) = cpal::host_from_id(host_id) {
            if let Ok(mut devices) = host.output_devices() {
                if let Some(device) =
                    devices.find(|d: &cpal::Device| d.name().ok().as_ref() == Some(&id.name))
                {
                    return Ok(device);
                }
            }
        }
    }

    Err(AudioError::DeviceNotFound(id.name.clone()))
}

/// Get the default output device from the default host
pub fn get_default_device() -> AudioResult<cpal::Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or_else(|| AudioError::NoDefaultDevice("No default output device".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_enumeration() {
        // May legitimately find nothing on headless CI
        match get_output_devices() {
            Ok(devices) => {
                for device in &devices {
                    println!("  - {} (default: {})", device, device.is_default);
                }
            }
            Err(AudioError::NoDevices) => {}
            Err(e) => println!("Error enumerating devices: {}", e),
        }
    }
}
