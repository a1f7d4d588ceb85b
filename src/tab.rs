//! Tab screens.
//!
//! The active tab lives in the native runtime: selecting writes `selectedTab`, querying reads
//! `currentTab` back. Neither direction is bounds-checked here; what an out-of-range index does is
//! up to the runtime.

use crate::error::UiResult;
use crate::native::NativeRuntime;
use crate::property::PropertyKey;
use crate::tree::WidgetTree;
use crate::widget::{AsWidget, HasTabSemantics, IsScreen};

impl<R: NativeRuntime> WidgetTree<R> {
    /// Adds a screen as the last tab.
    pub fn add_tab<T, S>(&mut self, tab_screen: T, screen: S) -> UiResult<()>
    where
        T: HasTabSemantics,
        S: IsScreen,
    {
        self.add_child(tab_screen, screen)
    }

    /// Shows the tab at `index` (zero-based).
    pub fn set_active_tab<T: HasTabSemantics>(&mut self, tab_screen: T, index: i32) -> UiResult<()> {
        self.set_property(tab_screen, PropertyKey::SelectedTab, index)
    }

    /// The index of the tab the native runtime is showing.
    pub fn active_tab<T: HasTabSemantics>(&self, tab_screen: T) -> UiResult<i32> {
        self.get_property_int(tab_screen, PropertyKey::CurrentTab)
    }

    pub fn tab_count<T: HasTabSemantics>(&self, tab_screen: T) -> UiResult<usize> {
        self.node(tab_screen.id())?;
        Ok(self.children(tab_screen).len())
    }
}
