//! Device handles and typed command builders.
//!
//! A [`ClientDevice`] is a local handle bound 1:1 to a server-assigned
//! device index, holding an immutable snapshot of the device's declared
//! capabilities. The registry replaces the whole handle when the server
//! re-announces a device; capabilities never mutate in place.
//!
//! Multi-actuator commands accept three equivalent input shapes — a
//! scalar for actuator 0, an ordered sequence for positional indices, or
//! an explicit index→value mapping — all normalizing to the same
//! subcommand list on the wire.

// ============================================================================
// Imports
// ============================================================================

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::protocol::{
    DeviceInfo, LinearSubcommand, Message, MessageAttributes, RotateSubcommand, SpeedSubcommand,
};

use super::session::Session;

// ============================================================================
// Input Shapes
// ============================================================================

/// Inputs accepted by [`ClientDevice::send_vibrate_cmd`].
///
/// A scalar speed addresses actuator 0; a sequence maps positions to
/// actuator indices; a map names actuator indices explicitly.
pub trait IntoSpeedSubcommands {
    /// Normalizes into per-actuator subcommands.
    fn into_subcommands(self) -> Vec<SpeedSubcommand>;
}

impl IntoSpeedSubcommands for f64 {
    fn into_subcommands(self) -> Vec<SpeedSubcommand> {
        vec![SpeedSubcommand::new(0, self)]
    }
}

impl IntoSpeedSubcommands for Vec<f64> {
    fn into_subcommands(self) -> Vec<SpeedSubcommand> {
        self.into_iter()
            .enumerate()
            .map(|(index, speed)| SpeedSubcommand::new(index as u32, speed))
            .collect()
    }
}

impl IntoSpeedSubcommands for &[f64] {
    fn into_subcommands(self) -> Vec<SpeedSubcommand> {
        self.to_vec().into_subcommands()
    }
}

impl IntoSpeedSubcommands for BTreeMap<u32, f64> {
    fn into_subcommands(self) -> Vec<SpeedSubcommand> {
        self.into_iter()
            .map(|(index, speed)| SpeedSubcommand::new(index, speed))
            .collect()
    }
}

impl<S: BuildHasher> IntoSpeedSubcommands for HashMap<u32, f64, S> {
    fn into_subcommands(self) -> Vec<SpeedSubcommand> {
        // Emit in index order for a deterministic wire shape.
        self.into_iter().collect::<BTreeMap<_, _>>().into_subcommands()
    }
}

/// Inputs accepted by [`ClientDevice::send_rotate_cmd`].
///
/// Values are `(speed, clockwise)` pairs.
pub trait IntoRotateSubcommands {
    /// Normalizes into per-actuator subcommands.
    fn into_subcommands(self) -> Vec<RotateSubcommand>;
}

impl IntoRotateSubcommands for (f64, bool) {
    fn into_subcommands(self) -> Vec<RotateSubcommand> {
        vec![RotateSubcommand::new(0, self.0, self.1)]
    }
}

impl IntoRotateSubcommands for Vec<(f64, bool)> {
    fn into_subcommands(self) -> Vec<RotateSubcommand> {
        self.into_iter()
            .enumerate()
            .map(|(index, (speed, clockwise))| {
                RotateSubcommand::new(index as u32, speed, clockwise)
            })
            .collect()
    }
}

impl IntoRotateSubcommands for &[(f64, bool)] {
    fn into_subcommands(self) -> Vec<RotateSubcommand> {
        self.to_vec().into_subcommands()
    }
}

impl IntoRotateSubcommands for BTreeMap<u32, (f64, bool)> {
    fn into_subcommands(self) -> Vec<RotateSubcommand> {
        self.into_iter()
            .map(|(index, (speed, clockwise))| RotateSubcommand::new(index, speed, clockwise))
            .collect()
    }
}

impl<S: BuildHasher> IntoRotateSubcommands for HashMap<u32, (f64, bool), S> {
    fn into_subcommands(self) -> Vec<RotateSubcommand> {
        self.into_iter().collect::<BTreeMap<_, _>>().into_subcommands()
    }
}

/// Inputs accepted by [`ClientDevice::send_linear_cmd`].
///
/// Values are `(duration_ms, position)` pairs.
pub trait IntoLinearSubcommands {
    /// Normalizes into per-actuator subcommands.
    fn into_subcommands(self) -> Vec<LinearSubcommand>;
}

impl IntoLinearSubcommands for (u32, f64) {
    fn into_subcommands(self) -> Vec<LinearSubcommand> {
        vec![LinearSubcommand::new(0, self.0, self.1)]
    }
}

impl IntoLinearSubcommands for Vec<(u32, f64)> {
    fn into_subcommands(self) -> Vec<LinearSubcommand> {
        self.into_iter()
            .enumerate()
            .map(|(index, (duration, position))| {
                LinearSubcommand::new(index as u32, duration, position)
            })
            .collect()
    }
}

impl IntoLinearSubcommands for &[(u32, f64)] {
    fn into_subcommands(self) -> Vec<LinearSubcommand> {
        self.to_vec().into_subcommands()
    }
}

impl IntoLinearSubcommands for BTreeMap<u32, (u32, f64)> {
    fn into_subcommands(self) -> Vec<LinearSubcommand> {
        self.into_iter()
            .map(|(index, (duration, position))| {
                LinearSubcommand::new(index, duration, position)
            })
            .collect()
    }
}

impl<S: BuildHasher> IntoLinearSubcommands for HashMap<u32, (u32, f64), S> {
    fn into_subcommands(self) -> Vec<LinearSubcommand> {
        self.into_iter().collect::<BTreeMap<_, _>>().into_subcommands()
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a device handle.
pub(crate) struct DeviceInner {
    /// Name of the device.
    name: String,
    /// Server-assigned device index.
    index: u32,
    /// Capability snapshot, immutable after construction.
    allowed_messages: FxHashMap<String, MessageAttributes>,
    /// Non-owning reference to the session used to send commands.
    session: Weak<Session>,
}

// ============================================================================
// ClientDevice
// ============================================================================

/// A handle to one device connected to the server.
///
/// Handles are cheap to clone and remain valid snapshots after the device
/// disappears; commands on a stale handle fail with a connection or
/// server-side device error.
#[derive(Clone)]
pub struct ClientDevice {
    /// Shared inner state.
    inner: Arc<DeviceInner>,
}

impl fmt::Debug for ClientDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientDevice")
            .field("name", &self.inner.name)
            .field("index", &self.inner.index)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ClientDevice - Constructor
// ============================================================================

impl ClientDevice {
    /// Creates a handle from an enumeration record.
    pub(crate) fn new(info: DeviceInfo, session: Weak<Session>) -> Self {
        Self {
            inner: Arc::new(DeviceInner {
                name: info.device_name,
                index: info.device_index,
                allowed_messages: info.device_messages,
                session,
            }),
        }
    }
}

// ============================================================================
// ClientDevice - Accessors
// ============================================================================

impl ClientDevice {
    /// Returns the device name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the server-assigned device index.
    #[inline]
    #[must_use]
    pub fn index(&self) -> u32 {
        self.inner.index
    }

    /// Returns the capability snapshot: supported message names mapped to
    /// their attributes.
    #[inline]
    #[must_use]
    pub fn allowed_messages(&self) -> &FxHashMap<String, MessageAttributes> {
        &self.inner.allowed_messages
    }

    /// Returns `true` if the device supports a message type.
    #[inline]
    #[must_use]
    pub fn allows(&self, message_name: &str) -> bool {
        self.inner.allowed_messages.contains_key(message_name)
    }

    /// Returns the actuator count declared for a message type.
    #[must_use]
    pub fn feature_count(&self, message_name: &str) -> Option<u32> {
        self.inner
            .allowed_messages
            .get(message_name)
            .and_then(|attrs| attrs.feature_count)
    }
}

// ============================================================================
// ClientDevice - Commands
// ============================================================================

impl ClientDevice {
    /// Vibrates the device. `0.0` (or [`Self::send_stop_device_cmd`])
    /// stops the hardware.
    ///
    /// Speeds range over `[0.0, 1.0]`. Accepts a single speed for actuator
    /// 0, a sequence mapped positionally, or an index→speed map.
    ///
    /// # Errors
    ///
    /// [`Error::Device`] without sending anything if the device does not
    /// support `VibrateCmd`.
    pub async fn send_vibrate_cmd(&self, speeds: impl IntoSpeedSubcommands) -> Result<()> {
        self.require_capability("VibrateCmd")?;
        let message = Message::VibrateCmd {
            device_index: self.inner.index,
            speeds: speeds.into_subcommands(),
            id: 0,
        };
        self.session()?.send_expect_ok(message).await
    }

    /// Rotates the device. Values are `(speed, clockwise)` pairs with
    /// speed in `[0.0, 1.0]`; `true` rotates clockwise.
    ///
    /// # Errors
    ///
    /// [`Error::Device`] without sending anything if the device does not
    /// support `RotateCmd`.
    pub async fn send_rotate_cmd(&self, rotations: impl IntoRotateSubcommands) -> Result<()> {
        self.require_capability("RotateCmd")?;
        let message = Message::RotateCmd {
            device_index: self.inner.index,
            rotations: rotations.into_subcommands(),
            id: 0,
        };
        self.session()?.send_expect_ok(message).await
    }

    /// Moves the device's linear actuators. Values are `(duration_ms,
    /// position)` pairs with position in `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// [`Error::Device`] without sending anything if the device does not
    /// support `LinearCmd`.
    pub async fn send_linear_cmd(&self, vectors: impl IntoLinearSubcommands) -> Result<()> {
        self.require_capability("LinearCmd")?;
        let message = Message::LinearCmd {
            device_index: self.inner.index,
            vectors: vectors.into_subcommands(),
            id: 0,
        };
        self.session()?.send_expect_ok(message).await
    }

    /// Stops whatever the device is doing.
    pub async fn send_stop_device_cmd(&self) -> Result<()> {
        let message = Message::StopDeviceCmd {
            device_index: self.inner.index,
            id: 0,
        };
        self.session()?.send_expect_ok(message).await
    }
}

// ============================================================================
// ClientDevice - Internal
// ============================================================================

impl ClientDevice {
    /// Fails with a device error when a capability is missing.
    fn require_capability(&self, message_name: &str) -> Result<()> {
        if self.allows(message_name) {
            Ok(())
        } else {
            Err(Error::device(format!(
                "{message_name} not supported by device {}",
                self.inner.name
            )))
        }
    }

    /// Upgrades the session back-reference.
    fn session(&self) -> Result<Arc<Session>> {
        self.inner
            .session
            .upgrade()
            .ok_or_else(|| Error::connector("device is not attached to a connected client"))
    }
}

// ============================================================================
// Tests
// ============================================================================
