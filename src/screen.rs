use crate::error::{native, UiResult};
use crate::native::NativeRuntime;
use crate::property::PropertyKey;
use crate::tree::WidgetTree;
use crate::widget::{AsWidget, IsScreen};
use tracing::debug;

impl<R: NativeRuntime> WidgetTree<R> {
    pub fn set_title<S: IsScreen>(&mut self, screen: S, title: &str) -> UiResult<()> {
        self.set_property(screen, PropertyKey::Title, title)
    }

    /// Makes `screen` the screen the application shows.
    pub fn show<S: IsScreen>(&mut self, screen: S) -> UiResult<()> {
        let id = screen.id();
        self.node(id)?;
        self.runtime_mut()
            .show_screen(id)
            .map_err(native(id, "show_screen"))?;
        debug!(%id, "showing screen");
        Ok(())
    }
}

#[test]
fn test_show_and_title() {
    use crate::headless::HeadlessRuntime;
    use crate::widget::{Screen, StackScreen};

    let mut tree = WidgetTree::new(HeadlessRuntime::new());
    let screen: Screen = tree.create().unwrap();
    let stack: StackScreen = tree.create().unwrap();

    tree.set_title(screen, "Settings").unwrap();
    tree.show(screen).unwrap();
    assert_eq!(tree.runtime().shown(), Some(screen.id()));
    assert_eq!(
        tree.get_property_string(screen, PropertyKey::Title).unwrap(),
        "Settings"
    );

    tree.show(stack).unwrap();
    assert_eq!(tree.runtime().shown(), Some(stack.id()));
}
