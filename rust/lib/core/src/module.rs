/// One document-lifecycle registration: the host calls the module's
/// dispatcher whenever `event` fires on a document of type `doctype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookBinding {
    /// Host document type name, e.g. `"Delivery Note"`.
    pub doctype: &'static str,
    /// Host lifecycle event name, e.g. `"before_submit"`.
    pub event: &'static str,
    /// Name of the handler, used for logging.
    pub handler: &'static str,
}

/// A business module that reacts to document lifecycle events.
///
/// Each module publishes its registration table; the host collects all
/// modules and routes matching events to them.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's event registrations.
    fn hooks(&self) -> Vec<HookBinding>;
}
