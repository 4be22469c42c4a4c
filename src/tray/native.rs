//! Status items backed by the platform tray through `tray-icon`

use crate::error::{AppError, Result};
use crate::tray::controller::ClickKind;
use crate::tray::host::{HostEvent, StatusBarHost, StatusItemId};
use crate::tray::icon::IconImage;
use crate::tray::menu::{self, ContextMenu};
use log::{debug, info, trace};
use muda::MenuEvent;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use tray_icon::{
    Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent, TrayIconId,
};

/// Native host. Must be created and used on the thread running the platform event loop.
pub struct NativeTrayHost {
    tooltip: Option<String>,
    menu_on_left_click: bool,
    items: HashMap<StatusItemId, TrayIcon>,
    pending: VecDeque<(StatusItemId, HostEvent)>,
    next_id: u64,
}

impl NativeTrayHost {
    pub fn new(tooltip: Option<String>, menu_on_left_click: bool) -> Self {
        Self {
            tooltip,
            menu_on_left_click,
            items: HashMap::new(),
            pending: VecDeque::new(),
            next_id: 0,
        }
    }

    fn load_icon(path: &Path) -> Result<Icon> {
        let image = IconImage::load(path)?;
        Icon::from_rgba(image.rgba, image.width, image.height)
            .map_err(|e| AppError::IconLoadFailure(format!("{}: {}", path.display(), e)))
    }

    fn item_for(&self, native_id: &str) -> Option<StatusItemId> {
        self.items
            .iter()
            .find(|(_, tray)| tray.id().0 == native_id)
            .map(|(item, _)| *item)
    }

    /// Move everything the global tray/menu channels hold into the per-item queue
    fn collect_native_events(&mut self) {
        while let Ok(event) = TrayIconEvent::receiver().try_recv() {
            let (id, button) = match event {
                TrayIconEvent::Click {
                    id,
                    button,
                    button_state: MouseButtonState::Up,
                    ..
                } => (id, button),
                other => {
                    trace!("Ignoring tray event {:?}", other);
                    continue;
                }
            };

            let kind = match button {
                MouseButton::Left => ClickKind::Primary,
                MouseButton::Right => ClickKind::Secondary,
                _ => continue,
            };

            match self.item_for(id.0.as_str()) {
                Some(item) => self.pending.push_back((item, HostEvent::Click(kind))),
                None => debug!("Click for unknown tray icon {:?}", id),
            }
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            match menu::parse_native_menu_id(event.id().0.as_str()) {
                Some((owner, id)) if self.items.contains_key(&StatusItemId::new(owner)) => {
                    self.pending
                        .push_back((StatusItemId::new(owner), HostEvent::MenuItem(id)));
                }
                _ => debug!("Menu event for unknown item '{}'", event.id().0),
            }
        }
    }
}

impl StatusBarHost for NativeTrayHost {
    fn create_status_item(&mut self, icon_path: &Path) -> Result<StatusItemId> {
        let icon = Self::load_icon(icon_path)?;

        self.next_id += 1;
        let item = StatusItemId::new(self.next_id);

        let mut builder = TrayIconBuilder::new()
            .with_id(TrayIconId::new(item.to_string()))
            .with_icon(icon)
            .with_menu_on_left_click(self.menu_on_left_click);
        if let Some(tooltip) = &self.tooltip {
            builder = builder.with_tooltip(tooltip);
        }

        let tray = builder
            .build()
            .map_err(|e| AppError::InitFailure(e.to_string()))?;
        self.items.insert(item, tray);

        info!("Tray icon {} created", item);
        Ok(item)
    }

    fn set_icon(&mut self, item: StatusItemId, icon_path: &Path) -> Result<()> {
        // Decode before touching the native item so a bad file leaves the glyph alone
        let icon = Self::load_icon(icon_path)?;
        let tray = self
            .items
            .get(&item)
            .ok_or_else(|| AppError::IconLoadFailure(format!("unknown item {}", item)))?;
        tray.set_icon(Some(icon))
            .map_err(|e| AppError::IconLoadFailure(e.to_string()))
    }

    fn set_menu(&mut self, item: StatusItemId, menu: &ContextMenu) -> Result<()> {
        let native = menu::native::build(item.raw(), menu)?;
        if let Some(tray) = self.items.get(&item) {
            tray.set_menu(Some(Box::new(native)));
        }
        Ok(())
    }

    fn destroy_status_item(&mut self, item: StatusItemId) {
        // Dropping the TrayIcon removes it from the status bar
        if self.items.remove(&item).is_some() {
            self.pending.retain(|(owner, _)| *owner != item);
            debug!("Tray icon {} released", item);
        }
    }

    fn poll_event(&mut self, item: StatusItemId) -> Option<HostEvent> {
        self.collect_native_events();
        let pos = self.pending.iter().position(|(owner, _)| *owner == item)?;
        self.pending.remove(pos).map(|(_, event)| event)
    }
}

impl Drop for NativeTrayHost {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            debug!("Releasing {} remaining tray icon(s)", self.items.len());
        }
    }
}
