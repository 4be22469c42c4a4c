//! Context menu model and its translation to native menus

/// Application-defined identifier of a context menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuItemId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        id: MenuItemId,
        label: String,
        enabled: bool,
    },
    Separator,
}

/// Flat context menu attached to a status item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextMenu {
    entries: Vec<MenuEntry>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, id: u32, label: impl Into<String>) -> Self {
        self.entries.push(MenuEntry::Item {
            id: MenuItemId(id),
            label: label.into(),
            enabled: true,
        });
        self
    }

    /// Greyed-out entry, used for status lines
    pub fn disabled_item(mut self, id: u32, label: impl Into<String>) -> Self {
        self.entries.push(MenuEntry::Item {
            id: MenuItemId(id),
            label: label.into(),
            enabled: false,
        });
        self
    }

    pub fn separator(mut self) -> Self {
        self.entries.push(MenuEntry::Separator);
        self
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` names an enabled item of this menu
    pub fn accepts(&self, id: MenuItemId) -> bool {
        self.entries.iter().any(|entry| {
            matches!(entry, MenuEntry::Item { id: item_id, enabled: true, .. } if *item_id == id)
        })
    }
}

/// Native menu id for an item, unique per status item
pub fn native_menu_id(owner: u64, id: MenuItemId) -> String {
    format!("status_{}_item_{}", owner, id.0)
}

/// Inverse of [`native_menu_id`]
pub fn parse_native_menu_id(native: &str) -> Option<(u64, MenuItemId)> {
    let rest = native.strip_prefix("status_")?;
    let (owner, item) = rest.split_once("_item_")?;
    Some((owner.parse().ok()?, MenuItemId(item.parse().ok()?)))
}

#[cfg(any(windows, target_os = "macos"))]
pub(crate) mod native {
    use super::*;
    use crate::error::Result;
    use muda::{Menu, MenuItem, PredefinedMenuItem};

    /// Build a muda menu for the status item `owner`
    pub fn build(owner: u64, menu: &ContextMenu) -> Result<Menu> {
        let native = Menu::new();
        for entry in menu.entries() {
            match entry {
                MenuEntry::Item { id, label, enabled } => {
                    let item = MenuItem::with_id(native_menu_id(owner, *id), label, *enabled, None);
                    native.append(&item)?;
                }
                MenuEntry::Separator => native.append(&PredefinedMenuItem::separator())?,
            }
        }
        Ok(native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_builder_chain() {
        let menu = ContextMenu::new()
            .disabled_item(1, "Status: idle")
            .separator()
            .item(2, "Exit");
        assert_eq!(menu.len(), 3);
        assert!(menu.accepts(MenuItemId(2)));
        assert!(!menu.accepts(MenuItemId(1)));
        assert!(!menu.accepts(MenuItemId(9)));
    }

    #[test]
    fn test_native_id_parse() {
        let native = native_menu_id(7, MenuItemId(42));
        assert_eq!(native, "status_7_item_42");
        assert_eq!(parse_native_menu_id(&native), Some((7, MenuItemId(42))));
        assert_eq!(parse_native_menu_id("exit"), None);
        assert_eq!(parse_native_menu_id("status_x_item_1"), None);
    }
}
