use super::*;

/// The document operations the [`Initializer`] needs.
///
/// [`Harness`] implements this against its in-memory document. Tests can
/// supply their own implementation to observe registrations without a
/// document.
pub trait DomBinding {
    /// First connected element matching `selector`, in document order.
    fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.find_all(selector).into_iter().next()
    }

    /// Every connected element matching `selector`, in document order.
    fn find_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// Sets the element's display to hidden. Hiding an element that is
    /// already hidden, or a node that is not an element, does nothing.
    fn hide(&mut self, node: NodeId);

    /// Registers `handler` on `node` for every event in `events`.
    fn on_any(&mut self, node: NodeId, events: &EventSet, handler: Handler);
}
