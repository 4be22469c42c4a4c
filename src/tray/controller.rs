//! Status icon controller: owns one status item and routes its events

use crate::error::{AppError, Result};
use crate::tray::host::{HostEvent, StatusBarHost, StatusItemId};
use crate::tray::menu::{ContextMenu, MenuItemId};
use crate::tray::queue::{self, IconCommand, IconUpdater};
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// Handlers longer than this are reported; long work belongs on another thread
pub const DEFAULT_HANDLER_BUDGET: Duration = Duration::from_millis(100);

/// Platform click classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Left click: direct action
    Primary,
    /// Right click: context menu
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub kind: ClickKind,
}

impl ClickEvent {
    pub fn primary() -> Self {
        Self {
            kind: ClickKind::Primary,
        }
    }

    pub fn secondary() -> Self {
        Self {
            kind: ClickKind::Secondary,
        }
    }
}

/// Receiver of click events coming from the host toolkit
pub trait ClickSink {
    fn on_click(&mut self, event: ClickEvent) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Active,
    Disposed,
}

type Handler = Box<dyn FnMut()>;
type MenuItemHandler = Box<dyn FnMut(MenuItemId)>;

/// Owns one status-bar entry.
///
/// Lives on the UI thread. Other threads change the icon through an
/// [`IconUpdater`] obtained from [`icon_updater`](Self::icon_updater).
pub struct StatusIconController<H: StatusBarHost> {
    host: H,
    /// `None` once disposed
    item: Option<StatusItemId>,
    icon_path: PathBuf,
    is_menu_open: bool,
    action_handler: Handler,
    menu_request_handler: Handler,
    menu_item_handler: Option<MenuItemHandler>,
    context_menu: Option<ContextMenu>,
    handler_budget: Duration,
    updater: IconUpdater,
    commands: Option<Receiver<IconCommand>>,
}

impl<H: StatusBarHost> StatusIconController<H> {
    /// Allocate the status item and register this controller as its only event sink
    pub fn initialize<A, M>(
        mut host: H,
        icon_path: impl Into<PathBuf>,
        action_handler: A,
        menu_request_handler: M,
    ) -> Result<Self>
    where
        A: FnMut() + 'static,
        M: FnMut() + 'static,
    {
        let icon_path = icon_path.into();
        if icon_path.as_os_str().is_empty() {
            return Err(AppError::InitFailure("empty icon path".to_string()));
        }

        let item = host.create_status_item(&icon_path).map_err(|e| match e {
            AppError::InitFailure(msg) => AppError::InitFailure(msg),
            other => AppError::InitFailure(format!(
                "initial icon {}: {}",
                icon_path.display(),
                other
            )),
        })?;

        let (updater, commands) = queue::channel();
        info!("Status item {} created with icon {:?}", item, icon_path);

        Ok(Self {
            host,
            item: Some(item),
            icon_path,
            is_menu_open: false,
            action_handler: Box::new(action_handler),
            menu_request_handler: Box::new(menu_request_handler),
            menu_item_handler: None,
            context_menu: None,
            handler_budget: DEFAULT_HANDLER_BUDGET,
            updater,
            commands: Some(commands),
        })
    }

    /// Forward context menu selections to `handler`
    pub fn with_menu_item_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(MenuItemId) + 'static,
    {
        self.menu_item_handler = Some(Box::new(handler));
        self
    }

    pub fn with_handler_budget(mut self, budget: Duration) -> Self {
        self.handler_budget = budget;
        self
    }

    pub fn state(&self) -> ControllerState {
        if self.item.is_some() {
            ControllerState::Active
        } else {
            ControllerState::Disposed
        }
    }

    /// Last successfully applied icon
    pub fn icon_path(&self) -> &Path {
        &self.icon_path
    }

    /// True after a context menu request until the next UI-loop tick or event for the item
    pub fn is_menu_open(&self) -> bool {
        self.is_menu_open
    }

    /// Handle for changing the icon from other threads
    pub fn icon_updater(&self) -> Result<IconUpdater> {
        self.active_item()?;
        Ok(self.updater.clone())
    }

    /// Change the icon on the UI thread.
    ///
    /// Updates already queued by other threads are applied first.
    pub fn update_icon(&mut self, new_path: impl AsRef<Path>) -> Result<()> {
        let item = self.active_item()?;
        self.apply_queued(item);
        self.apply_icon(item, new_path.as_ref())
    }

    /// Attach a context menu; selections reach the menu item handler
    pub fn set_context_menu(&mut self, menu: ContextMenu) -> Result<()> {
        let item = self.active_item()?;
        self.host.set_menu(item, &menu).map_err(|e| match e {
            AppError::MenuError(msg) => AppError::MenuError(msg),
            other => AppError::MenuError(other.to_string()),
        })?;
        debug!("Context menu with {} entries attached to {}", menu.len(), item);
        self.context_menu = Some(menu);
        Ok(())
    }

    /// Apply every queued icon update now. Returns how many were taken off the queue.
    pub fn flush_pending(&mut self) -> Result<usize> {
        let item = self.active_item()?;
        Ok(self.apply_queued(item))
    }

    /// One UI-loop tick: close a menu left open by the last tick, apply queued
    /// updates, then dispatch host events.
    ///
    /// Queued updates are re-checked before every event, so an update issued
    /// before an event is visible by the time that event's handler runs.
    /// Returns the number of dispatched events.
    pub fn process_events(&mut self) -> Result<usize> {
        let item = self.active_item()?;
        // Native menus track modally, so one opened last tick is closed by now
        self.is_menu_open = false;
        self.apply_queued(item);

        let mut dispatched = 0;
        while let Some(event) = self.host.poll_event(item) {
            self.apply_queued(item);
            match event {
                HostEvent::Click(kind) => self.on_click(ClickEvent { kind })?,
                HostEvent::MenuItem(id) => self.on_menu_item(id)?,
            }
            dispatched += 1;
        }
        Ok(dispatched)
    }

    /// Forward a context menu selection
    pub fn on_menu_item(&mut self, id: MenuItemId) -> Result<()> {
        self.active_item()?;
        self.is_menu_open = false;

        if let Some(menu) = &self.context_menu {
            if !menu.accepts(id) {
                debug!("Ignoring selection of unknown or disabled menu item {:?}", id);
                return Ok(());
            }
        }

        match self.menu_item_handler.as_mut() {
            Some(handler) => {
                let started = Instant::now();
                run_handler("menu item", || handler(id));
                self.check_budget("menu item", started);
            }
            None => debug!("Menu item {:?} selected, no handler registered", id),
        }
        Ok(())
    }

    /// Release the status item. Queued updates are discarded.
    ///
    /// Safe to call any number of times.
    pub fn teardown(&mut self) {
        let Some(item) = self.item.take() else {
            return;
        };

        // Dropping the receiver fails later sends and resolves waiting tickets
        let discarded = self
            .commands
            .take()
            .map(|rx| rx.try_iter().count())
            .unwrap_or(0);
        if discarded > 0 {
            info!("Discarded {} pending icon update(s) on teardown", discarded);
        }

        self.host.destroy_status_item(item);
        self.is_menu_open = false;
        self.context_menu = None;
        info!("Status item {} destroyed", item);
    }

    fn active_item(&self) -> Result<StatusItemId> {
        self.item.ok_or(AppError::Disposed)
    }

    fn apply_icon(&mut self, item: StatusItemId, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            warn!("Rejected icon update with empty path");
            return Err(AppError::IconLoadFailure("empty icon path".to_string()));
        }

        match self.host.set_icon(item, path) {
            Ok(()) => {
                self.icon_path = path.to_path_buf();
                debug!("Icon of {} set to {:?}", item, path);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Keeping icon {:?}, could not load {:?}: {}",
                    self.icon_path, path, e
                );
                Err(match e {
                    AppError::IconLoadFailure(msg) => AppError::IconLoadFailure(msg),
                    other => AppError::IconLoadFailure(other.to_string()),
                })
            }
        }
    }

    fn apply_queued(&mut self, item: StatusItemId) -> usize {
        let pending: Vec<IconCommand> = match &self.commands {
            Some(rx) => rx.try_iter().collect(),
            None => return 0,
        };

        let count = pending.len();
        for command in pending {
            let outcome = self.apply_icon(item, &command.path);
            command.complete(outcome);
        }
        count
    }

    fn check_budget(&self, handler: &str, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > self.handler_budget {
            warn!(
                "{} handler took {:?} (budget {:?}); move long work off the UI thread",
                handler, elapsed, self.handler_budget
            );
        }
    }
}

impl<H: StatusBarHost> ClickSink for StatusIconController<H> {
    fn on_click(&mut self, event: ClickEvent) -> Result<()> {
        let item = self.active_item()?;
        debug!("{:?} click on {}", event.kind, item);

        let started = Instant::now();
        match event.kind {
            ClickKind::Primary => {
                self.is_menu_open = false;
                let handler = &mut self.action_handler;
                run_handler("action", || handler());
                self.check_budget("action", started);
            }
            ClickKind::Secondary => {
                let handler = &mut self.menu_request_handler;
                run_handler("menu request", || handler());
                self.is_menu_open = true;
                self.check_budget("menu request", started);
            }
        }
        Ok(())
    }
}

/// Run an application handler; a panic is logged and stops at this frame
fn run_handler(name: &str, handler: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(handler)) {
        error!("{} handler panicked: {}", name, panic_message(payload.as_ref()));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

impl<H: StatusBarHost> Drop for StatusIconController<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
