//! Steering by tilting the device.
//!
//! Raw accelerometer readings are smoothed with an exponential moving average
//! and then thresholded into one of the four headings. The sensor is only
//! touched after the player asks for it once; if it cannot be opened tilt
//! stays off and the other inputs carry on unaffected.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::snake::Heading;

const IIO_DEVICES: &str = "/sys/bus/iio/devices";

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("no accelerometer found under {}", .0.display())]
    NotFound(PathBuf),
    #[error("permission to read {} was denied", .0.display())]
    Denied(PathBuf),
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unexpected value {value:?} in {}", .path.display())]
    Malformed { path: PathBuf, value: String },
}

/// Gravity-inclusive acceleration in m/s².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

pub trait Accelerometer {
    fn read(&mut self) -> Result<Sample, SensorError>;
}

/// Low-pass filter plus dead zone turning samples into headings.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltFilter {
    smoothing: f64,
    threshold: f64,
    x: f64,
    y: f64,
}

impl TiltFilter {
    pub fn new(smoothing: f64, threshold: f64) -> Self {
        TiltFilter { smoothing, threshold, x: 0.0, y: 0.0 }
    }

    pub fn feed(&mut self, sample: Sample) -> Option<Heading> {
        let s = self.smoothing;
        self.x = self.x * (1.0 - s) + sample.x * s;
        self.y = self.y * (1.0 - s) + sample.y * s;

        let t = self.threshold;
        // vertical tilt wins over horizontal when both pass the threshold
        if self.y < -t {
            Some(Heading::Down)
        } else if self.y > t {
            Some(Heading::Up)
        } else if self.x > t {
            Some(Heading::Right)
        } else if self.x < -t {
            Some(Heading::Left)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    NotRequested,
    Granted,
    Denied,
}

/// What the player sees about tilt steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiltStatus {
    Off,
    On,
    /// Granted, but the sensor has since failed
    Lost,
    Unavailable,
}

/// The tilt input source together with its one-time permission gate.
pub struct TiltInput {
    filter: TiltFilter,
    sensor: Option<Box<dyn Accelerometer>>,
    permission: Permission,
}

impl TiltInput {
    pub fn new(filter: TiltFilter) -> Self {
        TiltInput { filter, sensor: None, permission: Permission::NotRequested }
    }

    #[cfg(test)]
    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn is_active(&self) -> bool {
        self.sensor.is_some()
    }

    pub fn status(&self) -> TiltStatus {
        match (self.permission, self.is_active()) {
            (Permission::NotRequested, _) => TiltStatus::Off,
            (Permission::Granted, true) => TiltStatus::On,
            (Permission::Granted, false) => TiltStatus::Lost,
            (Permission::Denied, _) => TiltStatus::Unavailable,
        }
    }

    /// Asks for the sensor once. `open` is only called while no request has
    /// been granted yet; a denied request may be retried.
    pub fn request<F>(&mut self, open: F) -> Permission
    where
        F: FnOnce() -> Result<Box<dyn Accelerometer>, SensorError>,
    {
        if self.permission == Permission::Granted {
            return self.permission;
        }

        match open() {
            Ok(sensor) => {
                info!("Tilt steering enabled");
                self.sensor = Some(sensor);
                self.permission = Permission::Granted;
            }
            Err(err) => {
                warn!(%err, "Tilt steering unavailable");
                self.permission = Permission::Denied;
            }
        }

        self.permission
    }

    /// Reads one sample and returns the heading it implies, if any. A sensor
    /// that starts failing is dropped for the rest of the run.
    pub fn poll(&mut self) -> Option<Heading> {
        let sensor = self.sensor.as_mut()?;

        match sensor.read() {
            Ok(sample) => self.filter.feed(sample),
            Err(err) => {
                warn!(%err, "Accelerometer stopped responding, tilt disabled");
                self.sensor = None;
                None
            }
        }
    }
}

/// Linux industrial-I/O accelerometer exposed through sysfs.
#[derive(Debug)]
pub struct IioAccelerometer {
    x_raw: PathBuf,
    y_raw: PathBuf,
    scale: f64,
}

impl IioAccelerometer {
    /// Opens `device`, or the first IIO device that reports an acceleration
    /// channel when no device is given.
    pub fn open(device: Option<&Path>) -> Result<Self, SensorError> {
        let dir = match device {
            Some(dir) => dir.to_path_buf(),
            None => find_device(Path::new(IIO_DEVICES))?,
        };

        let x_raw = dir.join("in_accel_x_raw");
        let y_raw = dir.join("in_accel_y_raw");
        if !x_raw.exists() || !y_raw.exists() {
            return Err(SensorError::NotFound(dir));
        }

        let scale_path = dir.join("in_accel_scale");
        let scale = if scale_path.exists() { read_number(&scale_path)? } else { 1.0 };

        let mut sensor = IioAccelerometer { x_raw, y_raw, scale };
        // a first read surfaces permission problems now instead of mid-game
        sensor.read()?;
        Ok(sensor)
    }
}

impl Accelerometer for IioAccelerometer {
    fn read(&mut self) -> Result<Sample, SensorError> {
        Ok(Sample {
            x: read_number(&self.x_raw)? * self.scale,
            y: read_number(&self.y_raw)? * self.scale,
        })
    }
}

fn find_device(root: &Path) -> Result<PathBuf, SensorError> {
    let entries = fs::read_dir(root).map_err(|_| SensorError::NotFound(root.to_path_buf()))?;

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|dir| dir.join("in_accel_x_raw").exists())
        .ok_or_else(|| SensorError::NotFound(root.to_path_buf()))
}

fn read_number(path: &Path) -> Result<f64, SensorError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::PermissionDenied => SensorError::Denied(path.to_path_buf()),
        _ => SensorError::Io { path: path.to_path_buf(), source },
    })?;

    let value = text.trim();
    value.parse().map_err(|_| SensorError::Malformed {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}
