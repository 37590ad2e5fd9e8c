//! Shared document holding every mount point of the dashboard.
//!
//! The document is the only mutable resource components share. Writers do
//! not coordinate with each other: whichever write lands last is what the
//! page shows.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::node::{
    find_element, find_element_mut, is_marked, is_value_slot, marked_text, render_html, Element, Node,
};

/// Identity of one mount point. Mounting the same selector again produces
/// a new id, so components bound to the old id see their container as gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

/// Result of a targeted patch. The two miss variants leave the document
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    NodeMissing,
    ContainerMissing,
}

struct MountPoint {
    selector: String,
    id: ContainerId,
    children: Vec<Node>,
}

#[derive(Default)]
struct Tree {
    next_id: u64,
    revision: u64,
    mounts: Vec<MountPoint>,
}

impl Tree {
    fn by_id(&mut self, id: ContainerId) -> Option<&mut MountPoint> {
        self.mounts.iter_mut().find(|m| m.id == id)
    }

    fn by_selector(&self, selector: &str) -> Option<&MountPoint> {
        self.mounts.iter().find(|m| m.selector == selector)
    }
}

fn has_id(element_id: &str) -> impl Fn(&Element) -> bool + '_ {
    move |el: &Element| el.get_attr("id") == Some(element_id)
}

/// Cloneable handle to the document.
#[derive(Clone, Default)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or re-create, emptied) the mount point for `selector`.
    pub async fn mount(&self, selector: &str) -> ContainerId {
        let mut tree = self.tree.write().await;
        tree.next_id += 1;
        let id = ContainerId(tree.next_id);
        match tree.mounts.iter_mut().find(|m| m.selector == selector) {
            Some(mount) => {
                mount.id = id;
                mount.children.clear();
            }
            None => tree.mounts.push(MountPoint {
                selector: selector.to_string(),
                id,
                children: Vec::new(),
            }),
        }
        tree.revision += 1;
        id
    }

    /// Remove a mount point. Returns false when nothing was mounted there.
    pub async fn unmount(&self, selector: &str) -> bool {
        let mut tree = self.tree.write().await;
        let before = tree.mounts.len();
        tree.mounts.retain(|m| m.selector != selector);
        let removed = tree.mounts.len() != before;
        if removed {
            tree.revision += 1;
        }
        removed
    }

    pub async fn resolve(&self, selector: &str) -> Option<ContainerId> {
        self.tree.read().await.by_selector(selector).map(|m| m.id)
    }

    pub async fn contains(&self, id: ContainerId) -> bool {
        self.tree.read().await.mounts.iter().any(|m| m.id == id)
    }

    /// Swap the container's whole content. Returns false when the container
    /// is no longer mounted.
    pub async fn replace_children(&self, id: ContainerId, nodes: Vec<Node>) -> bool {
        let mut tree = self.tree.write().await;
        let Some(mount) = tree.by_id(id) else {
            return false;
        };
        mount.children = nodes;
        tree.revision += 1;
        true
    }

    /// Overwrite the text of the element marked with `key`, or of its value
    /// slot when it has one. Siblings are left as they are.
    pub async fn patch_text(&self, id: ContainerId, key: &str, text: &str) -> PatchOutcome {
        let mut tree = self.tree.write().await;
        let Some(mount) = tree.by_id(id) else {
            return PatchOutcome::ContainerMissing;
        };
        let Some(marked) = find_element_mut(&mut mount.children, &is_marked(key)) else {
            return PatchOutcome::NodeMissing;
        };

        let replacement = vec![Node::text(text)];
        if find_element(&marked.children, &is_value_slot).is_some() {
            if let Some(slot) = find_element_mut(&mut marked.children, &is_value_slot) {
                slot.children = replacement;
            }
        } else {
            marked.children = replacement;
        }
        tree.revision += 1;
        PatchOutcome::Applied
    }

    /// Append text to the element with the given `id` attribute.
    pub async fn append_text(&self, id: ContainerId, element_id: &str, text: &str) -> bool {
        let mut tree = self.tree.write().await;
        let Some(mount) = tree.by_id(id) else {
            return false;
        };
        let Some(el) = find_element_mut(&mut mount.children, &has_id(element_id)) else {
            return false;
        };
        el.children.push(Node::text(text));
        tree.revision += 1;
        true
    }

    pub async fn set_attribute(
        &self,
        id: ContainerId,
        element_id: &str,
        name: &str,
        value: &str,
    ) -> bool {
        let mut tree = self.tree.write().await;
        let Some(mount) = tree.by_id(id) else {
            return false;
        };
        let Some(el) = find_element_mut(&mut mount.children, &has_id(element_id)) else {
            return false;
        };
        el.set_attr(name, value);
        tree.revision += 1;
        true
    }

    pub async fn inner_html(&self, selector: &str) -> Option<String> {
        let tree = self.tree.read().await;
        tree.by_selector(selector).map(|m| render_html(&m.children))
    }

    /// Text currently shown for a data marker inside a mount point.
    pub async fn marked_text(&self, selector: &str, key: &str) -> Option<String> {
        let tree = self.tree.read().await;
        tree.by_selector(selector).and_then(|m| marked_text(&m.children, key))
    }

    pub async fn attribute(&self, selector: &str, element_id: &str, name: &str) -> Option<String> {
        let tree = self.tree.read().await;
        let mount = tree.by_selector(selector)?;
        find_element(&mount.children, &has_id(element_id))
            .and_then(|el| el.get_attr(name))
            .map(str::to_string)
    }

    /// Markup of every mount point, in mount order.
    pub async fn to_html(&self) -> String {
        let tree = self.tree.read().await;
        let mut out = String::new();
        for mount in &tree.mounts {
            out.push_str(&format!(
                "<section data-mount=\"{}\">{}</section>\n",
                mount.selector.replace('"', "&quot;"),
                render_html(&mount.children)
            ));
        }
        out
    }

    /// Counter bumped by every successful mutation.
    pub async fn revision(&self) -> u64 {
        self.tree.read().await.revision
    }
}
