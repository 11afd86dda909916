//! Binding views to platform instances.
//!
//! A view with an instance is drawn and invalidated by the platform instead
//! of by its parent. Attaching a view can cascade: views that create child
//! instances attach each child according to the child's [`AttachMode`].
//!
//! Attachment posts itself to the UI thread when requested from elsewhere.

use std::sync::Arc;

use horizon_trellis_core::logging::targets;
use tracing::{debug, trace};

use super::instance::ViewInstance;
use super::node::{AttachMode, ViewId};
use super::tree::ViewTree;

impl ViewTree {
    pub fn instance(&self, id: ViewId) -> Option<Arc<dyn ViewInstance>> {
        self.nodes.get(id).and_then(|node| node.instance.clone())
    }

    pub fn is_instance(&self, id: ViewId) -> bool {
        self.has_instance(id)
    }

    /// Whether `id` is backed by a native widget.
    pub fn is_native_widget(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.is_native_widget())
    }

    pub fn is_creating_instance(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.creating_instance)
    }

    /// Whether the view gets an instance when its parent attaches children.
    pub fn set_creating_instance(&mut self, id: ViewId, creating: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.creating_instance = creating;
        }
    }

    pub fn is_creating_child_instances(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.creating_child_instances)
    }

    /// Attach children to instances of their own once this view attaches.
    /// Turning it on also makes the view itself create an instance.
    pub fn set_creating_child_instances(&mut self, id: ViewId, creating: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.creating_child_instances = creating;
            if creating {
                node.creating_instance = true;
            }
        }
    }

    pub fn is_creating_native_widget(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.creating_native_widget)
    }

    /// Prefer [`ViewHandler::create_native_widget`](super::hooks::ViewHandler::create_native_widget)
    /// over a generic instance.
    pub fn set_creating_native_widget(&mut self, id: ViewId, creating: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.creating_native_widget = creating;
            if creating {
                node.creating_instance = true;
            }
        }
    }

    pub fn attach_mode(&self, id: ViewId) -> AttachMode {
        self.nodes.get(id).map(|node| node.attach_mode).unwrap_or_default()
    }

    pub fn set_attach_mode(&mut self, id: ViewId, mode: AttachMode) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attach_mode = mode;
        }
    }

    /// Bind `id` to `instance`, replacing any previous instance.
    ///
    /// The instance receives the view's current frame, visibility, enabled
    /// state, opacity, alpha and transform. The attach cascade (root layout,
    /// child instances and the `on_attach` hook) runs immediately on the UI
    /// thread, or is posted there otherwise.
    pub fn attach(&mut self, id: ViewId, instance: Arc<dyn ViewInstance>) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.detach(id);
        instance.set_view(Some(id));
        if let Some(node) = self.nodes.get_mut(id) {
            node.instance = Some(Arc::clone(&instance));
        }
        self.sync_instance(id, instance.as_ref());
        debug!(target: targets::ATTACH, ?id, native = instance.is_native_widget(), "attached instance");

        if self.is_ui_thread() {
            self.process_attach(id);
        } else {
            self.post_to_ui_thread("process_attach", move |tree| tree.process_attach(id));
        }
    }

    fn sync_instance(&self, id: ViewId, instance: &dyn ViewInstance) {
        instance.set_frame(self.frame(id));
        instance.set_visible(self.is_visible(id));
        instance.set_enabled(self.is_enabled(id));
        instance.set_opaque(self.is_opaque(id));
        instance.set_alpha(self.final_alpha(id));
        if let Some(transform) = self.final_transform(id) {
            instance.set_transform(&transform);
        }
    }

    fn process_attach(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.instance.is_none() {
            return;
        }
        let creating_children = node.creating_child_instances;
        let children = node.children.clone();
        if self.is_root_view(id) {
            self.make_layout(id);
        }
        if creating_children {
            for child in children {
                if self.is_creating_instance(child) {
                    self.attach_child_by_mode(id, child);
                }
            }
        }
        self.call_handler(id, |handler, tree| handler.on_attach(tree, id));
    }

    /// Attach `child` under `parent` if the child's attach mode allows it
    /// for the parent's kind of instance.
    pub(crate) fn attach_child_by_mode(&mut self, parent: ViewId, child: ViewId) {
        let parent_native = self.is_native_widget(parent);
        let allowed = match self.attach_mode(child) {
            AttachMode::NotAttach => false,
            AttachMode::AttachAlways => true,
            AttachMode::NotAttachInNativeWidget => !parent_native,
            AttachMode::AttachInNativeWidget => parent_native,
        };
        if allowed {
            self.attach_child(parent, child);
        } else {
            trace!(target: targets::ATTACH, ?parent, ?child, parent_native, "attach mode skips child");
        }
    }

    /// Create and attach an instance for `child` under `parent`'s instance.
    pub fn attach_child(&mut self, parent: ViewId, child: ViewId) {
        if !self.is_creating_child_instances(parent) || !self.is_creating_instance(child) {
            return;
        }
        let Some(parent_instance) = self.instance(parent) else {
            return;
        };
        if !self.is_ui_thread() {
            self.post_to_ui_thread("attach_child", move |tree| tree.attach_child(parent, child));
            return;
        }
        self.attach_to_new_instance(child, Some(&parent_instance));
    }

    /// Ask the view's handler for an instance under `parent` and attach it.
    pub fn attach_to_new_instance(
        &mut self,
        id: ViewId,
        parent: Option<&Arc<dyn ViewInstance>>,
    ) -> Option<Arc<dyn ViewInstance>> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        let instance = self.call_handler(id, |handler, tree| handler.create_instance(tree, id, parent))?;
        self.attach(id, Arc::clone(&instance));
        Some(instance)
    }

    /// What [`ViewHandler::create_instance`](super::hooks::ViewHandler::create_instance)
    /// does unless overridden: a native widget when the view asks for one
    /// and its handler provides one, otherwise a generic instance from the
    /// platform factory.
    pub fn create_default_instance(
        &mut self,
        id: ViewId,
        parent: Option<&Arc<dyn ViewInstance>>,
    ) -> Option<Arc<dyn ViewInstance>> {
        let node = self.nodes.get(id)?;
        if !node.creating_instance {
            return None;
        }
        if node.creating_native_widget {
            let native = self.call_handler(id, |handler, tree| handler.create_native_widget(tree, id, parent));
            if let Some(native) = native {
                native.set_native_widget(true);
                return Some(native);
            }
        }
        match self.platform() {
            Some(platform) => platform.create_generic_instance(id, parent),
            None => {
                debug!(target: targets::ATTACH, ?id, "no platform factory, instance not created");
                None
            }
        }
    }

    /// Unbind the view from its instance.
    pub fn detach(&mut self, id: ViewId) {
        let Some(instance) = self.nodes.get_mut(id).and_then(|node| node.instance.take()) else {
            return;
        };
        instance.set_view(None);
        trace!(target: targets::ATTACH, ?id, "detached instance");
    }
}

#[cfg(test)]
mod tests {
    use horizon_trellis_render::Rect;
    use parking_lot::Mutex;

    use super::*;
    use crate::view::hooks::ViewHandler;
    use crate::view::instance::{HeadlessInstance, HeadlessPlatform};

    fn with_platform() -> (ViewTree, Arc<HeadlessPlatform>) {
        let mut tree = ViewTree::new();
        let platform = Arc::new(HeadlessPlatform::new());
        tree.set_platform(platform.clone());
        (tree, platform)
    }

    #[test]
    fn test_attach_syncs_state() {
        let mut tree = ViewTree::new();
        let id = tree.create_view();
        tree.set_frame(id, Rect::new(0.0, 0.0, 30.0, 20.0), false);
        tree.set_alpha(id, 0.25, false);
        tree.set_visible(id, false, false);
        let instance = HeadlessInstance::shared();
        tree.attach(id, instance.clone());

        assert!(tree.is_instance(id));
        assert_eq!(instance.view(), Some(id));
        assert_eq!(instance.frame(), Rect::new(0.0, 0.0, 30.0, 20.0));
        assert_eq!(instance.alpha(), 0.25);
        assert!(!instance.is_visible());

        tree.detach(id);
        assert!(!tree.is_instance(id));
        assert_eq!(instance.view(), None);
    }

    #[test]
    fn test_group_attaches_children() {
        let (mut tree, platform) = with_platform();
        let group = tree.create_group();
        let child = tree.create_view();
        let skipped = tree.create_view();
        tree.add_child(group, child).unwrap();
        tree.add_child(group, skipped).unwrap();
        tree.set_creating_instance(skipped, false);

        tree.attach(group, HeadlessInstance::shared());
        assert!(tree.is_instance(child));
        assert!(!tree.is_instance(skipped));
        assert_eq!(platform.created_count(), 1);
        assert!(platform.instance_of(child).is_some());
    }

    #[test]
    fn test_child_added_after_attach_gets_instance() {
        let (mut tree, platform) = with_platform();
        let group = tree.create_group();
        tree.attach(group, HeadlessInstance::shared());
        let child = tree.create_view();
        tree.add_child(group, child).unwrap();
        assert!(tree.is_instance(child));

        tree.remove_child(group, child).unwrap();
        assert!(!tree.is_instance(child));
        assert_eq!(platform.instance_of(child).and_then(|i| i.view()), None);
    }

    #[test]
    fn test_attach_modes_respect_native_parent() {
        let (mut tree, _platform) = with_platform();
        let group = tree.create_group();
        let default_mode = tree.create_view();
        let native_only = tree.create_view();
        let always = tree.create_view();
        let never = tree.create_view();
        tree.set_attach_mode(native_only, AttachMode::AttachInNativeWidget);
        tree.set_attach_mode(always, AttachMode::AttachAlways);
        tree.set_attach_mode(never, AttachMode::NotAttach);
        for child in [default_mode, native_only, always, never] {
            tree.add_child(group, child).unwrap();
        }

        tree.attach(group, Arc::new(HeadlessInstance::native_widget()));
        assert!(!tree.is_instance(default_mode));
        assert!(tree.is_instance(native_only));
        assert!(tree.is_instance(always));
        assert!(!tree.is_instance(never));
    }

    struct NativeButton {
        attached: Arc<Mutex<bool>>,
    }

    impl ViewHandler for NativeButton {
        fn create_native_widget(
            &mut self,
            _tree: &mut ViewTree,
            _id: ViewId,
            _parent: Option<&Arc<dyn ViewInstance>>,
        ) -> Option<Arc<dyn ViewInstance>> {
            Some(HeadlessInstance::shared())
        }

        fn on_attach(&mut self, _tree: &mut ViewTree, _id: ViewId) {
            *self.attached.lock() = true;
        }
    }

    #[test]
    fn test_native_widget_preferred_when_requested() {
        let (mut tree, platform) = with_platform();
        let attached = Arc::new(Mutex::new(false));
        let id = tree.create_view_with_handler(Box::new(NativeButton {
            attached: attached.clone(),
        }));
        tree.set_creating_native_widget(id, true);

        let instance = tree.attach_to_new_instance(id, None);
        assert!(instance.is_some_and(|i| i.is_native_widget()));
        assert!(tree.is_native_widget(id));
        assert!(*attached.lock());
        assert_eq!(platform.created_count(), 0);
    }

    #[test]
    fn test_no_platform_means_no_instance() {
        let mut tree = ViewTree::new();
        let id = tree.create_view();
        assert!(tree.attach_to_new_instance(id, None).is_none());
        assert!(!tree.is_instance(id));
    }

    #[test]
    fn test_destroy_detaches() {
        let mut tree = ViewTree::new();
        let id = tree.create_view();
        let instance = HeadlessInstance::shared();
        tree.attach(id, instance.clone());
        tree.destroy_view(id);
        assert_eq!(instance.view(), None);
    }
}
