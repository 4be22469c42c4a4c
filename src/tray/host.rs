//! Contract between the controller and the host UI toolkit
//! The trait lets the controller run against a mock host in tests

use crate::error::Result;
use crate::tray::controller::ClickKind;
use crate::tray::menu::{ContextMenu, MenuItemId};
use std::fmt;
use std::path::Path;

/// Opaque reference to a status item owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusItemId(u64);

impl StatusItemId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StatusItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status-item-{}", self.0)
    }
}

/// Everything the host can deliver for a status item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Click(ClickKind),
    MenuItem(MenuItemId),
}

/// Native status-bar primitives supplied by the host toolkit.
///
/// All methods are called on the UI thread only.
pub trait StatusBarHost {
    /// Allocate a status-bar entry showing `icon_path`
    fn create_status_item(&mut self, icon_path: &Path) -> Result<StatusItemId>;

    /// Replace the glyph; on error the previous glyph must stay visible
    fn set_icon(&mut self, item: StatusItemId, icon_path: &Path) -> Result<()>;

    /// Attach (or replace) the context menu of an item
    fn set_menu(&mut self, item: StatusItemId, menu: &ContextMenu) -> Result<()>;

    /// Release the entry. Unknown items are ignored.
    fn destroy_status_item(&mut self, item: StatusItemId);

    /// Next pending event for `item`, if any (non-blocking)
    fn poll_event(&mut self, item: StatusItemId) -> Option<HostEvent>;
}

/// Mock implementations for testing
/// Available in tests and with the "test-mocks" feature
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};

    /// Native call log entry
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostCall {
        Create(PathBuf),
        SetIcon(StatusItemId, PathBuf),
        SetMenu(StatusItemId, usize),
        Destroy(StatusItemId),
    }

    #[derive(Default)]
    pub struct MockHostState {
        pub loadable_icons: HashSet<PathBuf>,
        pub deny_allocation: bool,
        pub reject_menus: bool,
        pub live_items: HashSet<StatusItemId>,
        pub visible_icons: HashMap<StatusItemId, PathBuf>,
        pub menus: HashMap<StatusItemId, ContextMenu>,
        pub events: VecDeque<(StatusItemId, HostEvent)>,
        pub calls: Vec<HostCall>,
        pub applied: Vec<PathBuf>,
        next_id: u64,
    }

    /// In-memory host. Clones share state so a test can keep a handle
    /// after moving one into the controller.
    #[derive(Clone, Default)]
    pub struct MockStatusBarHost {
        state: Arc<Mutex<MockHostState>>,
    }

    impl MockStatusBarHost {
        /// Host that can load exactly the given icon paths
        pub fn with_icons<I, P>(icons: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            let host = Self::default();
            host.state().loadable_icons = icons.into_iter().map(Into::into).collect();
            host
        }

        /// Host that refuses every allocation, like a platform without tray access
        pub fn denying_allocation() -> Self {
            let host = Self::default();
            host.state().deny_allocation = true;
            host
        }

        /// Make every later `set_menu` fail
        pub fn reject_menus(&self) {
            self.state().reject_menus = true;
        }

        pub fn state(&self) -> MutexGuard<'_, MockHostState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn add_icon(&self, path: impl Into<PathBuf>) {
            self.state().loadable_icons.insert(path.into());
        }

        /// Queue an event as if the toolkit had delivered it
        pub fn push_event(&self, item: StatusItemId, event: HostEvent) {
            self.state().events.push_back((item, event));
        }

        pub fn click(&self, item: StatusItemId, kind: ClickKind) {
            self.push_event(item, HostEvent::Click(kind));
        }

        pub fn live_item_count(&self) -> usize {
            self.state().live_items.len()
        }

        pub fn visible_icon(&self, item: StatusItemId) -> Option<PathBuf> {
            self.state().visible_icons.get(&item).cloned()
        }

        pub fn calls(&self) -> Vec<HostCall> {
            self.state().calls.clone()
        }

        /// Paths passed to successful `set_icon` calls, in order
        pub fn applied_icons(&self) -> Vec<PathBuf> {
            self.state().applied.clone()
        }

        pub fn only_item(&self) -> Option<StatusItemId> {
            let state = self.state();
            if state.live_items.len() == 1 {
                state.live_items.iter().next().copied()
            } else {
                None
            }
        }
    }

    impl StatusBarHost for MockStatusBarHost {
        fn create_status_item(&mut self, icon_path: &Path) -> Result<StatusItemId> {
            let mut state = self.state();
            state.calls.push(HostCall::Create(icon_path.to_path_buf()));
            if state.deny_allocation {
                return Err(AppError::InitFailure("tray access denied".to_string()));
            }
            if !state.loadable_icons.contains(icon_path) {
                return Err(AppError::IconLoadFailure(format!(
                    "{} is not a loadable icon",
                    icon_path.display()
                )));
            }
            state.next_id += 1;
            let item = StatusItemId::new(state.next_id);
            state.live_items.insert(item);
            state.visible_icons.insert(item, icon_path.to_path_buf());
            Ok(item)
        }

        fn set_icon(&mut self, item: StatusItemId, icon_path: &Path) -> Result<()> {
            let mut state = self.state();
            state.calls.push(HostCall::SetIcon(item, icon_path.to_path_buf()));
            if !state.live_items.contains(&item) {
                return Err(AppError::IconLoadFailure(format!("unknown item {}", item)));
            }
            if !state.loadable_icons.contains(icon_path) {
                return Err(AppError::IconLoadFailure(format!(
                    "{} is not a loadable icon",
                    icon_path.display()
                )));
            }
            state.visible_icons.insert(item, icon_path.to_path_buf());
            state.applied.push(icon_path.to_path_buf());
            Ok(())
        }

        fn set_menu(&mut self, item: StatusItemId, menu: &ContextMenu) -> Result<()> {
            let mut state = self.state();
            state.calls.push(HostCall::SetMenu(item, menu.len()));
            if state.reject_menus {
                return Err(AppError::MenuError("menu rejected by host".to_string()));
            }
            state.menus.insert(item, menu.clone());
            Ok(())
        }

        fn destroy_status_item(&mut self, item: StatusItemId) {
            let mut state = self.state();
            state.calls.push(HostCall::Destroy(item));
            state.live_items.remove(&item);
            state.visible_icons.remove(&item);
            state.menus.remove(&item);
        }

        fn poll_event(&mut self, item: StatusItemId) -> Option<HostEvent> {
            let mut state = self.state();
            let pos = state.events.iter().position(|(owner, _)| *owner == item)?;
            state.events.remove(pos).map(|(_, event)| event)
        }
    }
}
