//! Browser connection management and the driver abstraction
//!
//! - [`BrowserDriver`] / [`Connector`]: the control-channel interface the engine runs on
//! - [`ChromeConnector`] / [`ChromeDriver`]: implementation over `headless_chrome`
//! - [`ConnectionManager`]: single live handle with serialized, bounded reconnects
//! - [`BrowserSession`]: caller-facing facade

pub mod chrome;
pub mod config;
pub mod connection;
pub mod driver;
pub mod session;

pub use chrome::{ChromeConnector, ChromeDriver};
pub use config::{ConnectionOptions, LaunchOptions, ReconnectPolicy, Timings};
pub use connection::{ConnectionManager, ConnectionState};
pub use driver::{
    BrowserDriver, Connector, DisconnectCallback, ElementHandle, KeyEventKind, ListenerId, MouseButton,
    NetworkCallback, NetworkEvent, PointerEventKind,
};
pub use session::BrowserSession;
