//! Container capability shared by the nestable entity kinds.

/// Capability of an entity to hold (and show or hide) children.
///
/// Implemented by every container-capable kind and dispatched through
/// [`Entity::as_containable`](super::Entity::as_containable), so callers never
/// probe concrete kinds to find out whether something can be expanded.
pub trait Containable {
    /// Whether children currently render expanded.
    fn open(&self) -> bool;

    fn set_open(&mut self, open: bool);

    fn toggle_open(&mut self) {
        self.set_open(!self.open());
    }
}
