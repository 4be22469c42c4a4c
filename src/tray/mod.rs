//! Status-bar icon: controller, host contract, and native backend

pub mod controller;
pub mod host;
pub mod icon;
pub mod menu;
#[cfg(any(windows, target_os = "macos"))]
pub mod native;
pub mod queue;

pub use controller::{ClickEvent, ClickKind, ClickSink, ControllerState, StatusIconController};
pub use host::{HostEvent, StatusBarHost, StatusItemId};
pub use icon::{IconImage, IconSet, IconState};
pub use menu::{ContextMenu, MenuEntry, MenuItemId};
#[cfg(any(windows, target_os = "macos"))]
pub use native::NativeTrayHost;
pub use queue::{IconUpdater, UpdateTicket};
