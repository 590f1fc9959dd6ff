//! IBM Q remote device connector.
//!
//! Exposes an IBM Q cloud backend as a device that runs batches of
//! circuits remotely:
//!
//! - [`AccountSession`] manages the active account (explicit token,
//!   `IBMQX_TOKEN`, or the stored `~/.qiskit/qiskitrc` account)
//! - [`Provider`] selects the hub/group/project instance
//! - [`IbmqBackend`] implements the HAL [`Backend`](qbridge_hal::Backend)
//!   contract over the REST API
//! - [`IbmqDevice`] submits batches and records job timing on its tracker
//!
//! # Example
//!
//! ```ignore
//! use qbridge_adapter_ibmq::{AccountSession, DeviceConfig, IbmqDevice, WireSpec};
//! use qbridge_ir::Circuit;
//!
//! let session = AccountSession::new().shared();
//! let config = DeviceConfig::resolve(None)?.with_wires(WireSpec::Count(2));
//! let mut device = IbmqDevice::new(config, None, &session).await?;
//! device.tracker_mut().start();
//!
//! let results = device.batch_execute(&[Circuit::bell()?]).await?;
//! println!("{}", results[0].counts);
//! println!("{:?}", device.tracker().latest());
//! ```

pub mod account;
pub mod api;
pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod provider;

pub use account::{
    Account, AccountSession, ConnectOutcome, DEFAULT_API_URL, DEFAULT_URL, SharedSession,
};
pub use api::IbmqClient;
pub use backend::IbmqBackend;
pub use config::{DeviceConfig, WireSpec};
pub use device::{IbmqDevice, job_time};
pub use error::{IbmqError, IbmqResult};
pub use provider::Provider;
