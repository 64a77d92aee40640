//! Named-signal event bus.
//!
//! Widgets are stored in an arena owned by the bus and addressed through
//! [`WidgetId`] handles. A `(widget, attribute)` pair can be registered under
//! a signal name; writing that attribute through [`Observer::set`] emits the
//! signal with the new value. Callbacks run in connection order and receive
//! the root state mutably, so a callback may itself write widgets and emit
//! further signals.
//!
//! Returning [`Propagation::Stop`] from a callback prevents the callbacks
//! connected after it from running for that emission.

use crate::widget::{Attr, Value, Widget};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Handle to a widget in the bus arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

/// Whether the remaining callbacks of an emission should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Run the next callback.
    Continue,
    /// Skip the remaining callbacks.
    Stop,
}

impl From<()> for Propagation {
    fn from(_: ()) -> Self {
        Propagation::Continue
    }
}

impl From<bool> for Propagation {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Propagation::Continue
        } else {
            Propagation::Stop
        }
    }
}

/// A connected callback.
pub type Slot<S> = Rc<dyn Fn(&mut S, &Value) -> Propagation>;

struct Signal<S> {
    source: Option<(WidgetId, Attr)>,
    slots: Vec<Slot<S>>,
}

/// Registry of signals, their sources and callbacks, plus the widget arena.
pub struct SigSlot<S> {
    signals: HashMap<String, Signal<S>>,
    order: Vec<String>,
    map: HashMap<(WidgetId, Attr), String>,
    widgets: BTreeMap<WidgetId, Widget>,
    next_id: u64,
    muted: usize,
    emitting: Vec<String>,
}

impl<S> fmt::Debug for SigSlot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigSlot")
            .field("signals", &self.order)
            .field("widgets", &self.widgets.len())
            .field("muted", &self.muted)
            .finish()
    }
}

impl<S> Default for SigSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}

static NONE: Value = Value::None;

impl<S> SigSlot<S> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            signals: HashMap::new(),
            order: Vec::new(),
            map: HashMap::new(),
            widgets: BTreeMap::new(),
            next_id: 0,
            muted: 0,
            emitting: Vec::new(),
        }
    }

    /// Put a widget in the arena.
    pub fn add_widget(&mut self, widget: Widget) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.widgets.insert(id, widget);
        id
    }

    /// Take a widget out of the arena, forgetting its signal sources.
    pub fn remove_widget(&mut self, id: WidgetId) -> Option<Widget> {
        let names: Vec<String> = self
            .map
            .iter()
            .filter(|((wid, _), _)| *wid == id)
            .map(|(_, name)| name.clone())
            .collect();
        for name in names {
            self.unregister(&name);
        }
        self.widgets.remove(&id)
    }

    /// Borrow a widget.
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub(crate) fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    /// Current value of a widget, [`Value::None`] for unknown handles.
    pub fn value(&self, id: WidgetId) -> &Value {
        self.widgets.get(&id).map(Widget::value).unwrap_or(&NONE)
    }

    /// Whether the widget is disabled. Unknown handles count as disabled.
    pub fn is_disabled(&self, id: WidgetId) -> bool {
        self.widgets.get(&id).map_or(true, Widget::is_disabled)
    }

    /// Register a signal name, optionally bound to a widget attribute.
    ///
    /// Registering an existing name replaces its source and drops its
    /// callbacks.
    pub fn register(&mut self, source: Option<WidgetId>, name: impl Into<String>, attr: Attr) {
        let name = name.into();
        let source = source.map(|id| (id, attr));
        if let Some((id, attr)) = source {
            self.map.insert((id, attr), name.clone());
        }
        if self.signals.contains_key(&name) {
            debug!(signal = %name, "re-registering signal");
        } else {
            self.order.push(name.clone());
        }
        self.signals.insert(
            name,
            Signal {
                source,
                slots: Vec::new(),
            },
        );
    }

    /// Forget a signal and every mapping that points at it.
    pub fn unregister(&mut self, name: &str) {
        if let Some(signal) = self.signals.remove(name) {
            if let Some(key) = signal.source {
                if self.map.get(&key).map(String::as_str) == Some(name) {
                    self.map.remove(&key);
                }
            }
        }
        self.map.retain(|_, n| n != name);
        self.order.retain(|n| n != name);
    }

    /// Connect a callback to a registered signal.
    ///
    /// Returns `false`, leaving the bus untouched, when the signal is unknown.
    pub fn connect<F, P>(&mut self, name: &str, callback: F) -> bool
    where
        S: 'static,
        F: Fn(&mut S, &Value) -> P + 'static,
        P: Into<Propagation> + 'static,
    {
        match self.signals.get_mut(name) {
            Some(signal) => {
                signal
                    .slots
                    .push(Rc::new(move |state: &mut S, value: &Value| {
                        callback(state, value).into()
                    }));
                true
            },
            None => {
                warn!(signal = %name, "cannot connect to unregistered signal");
                false
            },
        }
    }

    /// Registered signal names, in registration order.
    pub fn signals(&self) -> &[String] {
        &self.order
    }

    /// Check whether a signal name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    /// Number of callbacks connected to a signal.
    pub fn connections(&self, name: &str) -> usize {
        self.signals.get(name).map_or(0, |s| s.slots.len())
    }

    /// Whether attribute-triggered emission is currently suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted > 0
    }

    fn signal_for(&self, id: WidgetId, attr: Attr) -> Option<&String> {
        self.map.get(&(id, attr))
    }
}

/// Root state that owns a [`SigSlot`] over itself.
///
/// The provided methods implement emission, change-detecting widget writes
/// and scoped muting on top of the two accessors.
pub trait Observer: Sized + 'static {
    /// Borrow the bus.
    fn sigslot(&self) -> &SigSlot<Self>;

    /// Borrow the bus mutably.
    fn sigslot_mut(&mut self) -> &mut SigSlot<Self>;

    /// Run the callbacks of `name` with `value`.
    ///
    /// Explicit emission is not affected by [`Observer::ignore_events`].
    /// A signal that is already being emitted further up the stack is
    /// dropped, which keeps feedback loops finite.
    fn emit(&mut self, name: &str, value: &Value) {
        let slots = match self.sigslot().signals.get(name) {
            Some(signal) => signal.slots.clone(),
            None => {
                debug!(signal = %name, "emit on unregistered signal");
                return;
            },
        };
        if self.sigslot().emitting.iter().any(|n| n == name) {
            debug!(signal = %name, "dropping re-entrant emission");
            return;
        }

        debug!(signal = %name, value = %value, callbacks = slots.len(), "emit");
        self.sigslot_mut().emitting.push(name.to_string());
        for slot in slots {
            if slot(self, value) == Propagation::Stop {
                debug!(signal = %name, "propagation stopped");
                break;
            }
        }
        self.sigslot_mut().emitting.pop();
    }

    /// Write a widget attribute, emitting the mapped signal on change.
    ///
    /// Returns `true` if the attribute changed. Rejected values are logged
    /// and leave the widget as it was.
    fn set(&mut self, id: WidgetId, attr: Attr, value: impl Into<Value>) -> bool {
        let value = value.into();
        let bus = self.sigslot_mut();
        let Some(widget) = bus.widgets.get_mut(&id) else {
            warn!(?id, "write to unknown widget");
            return false;
        };
        let changed = match widget.apply(attr, value.clone()) {
            Ok(changed) => changed,
            Err(()) => {
                warn!(
                    widget = %widget.name(),
                    attr = attr.name(),
                    value = %value,
                    "value rejected"
                );
                return false;
            },
        };
        if changed.is_empty() {
            return false;
        }
        if bus.is_muted() {
            return true;
        }

        let pending: Vec<(String, Value)> = changed
            .into_iter()
            .filter_map(|attr| {
                let name = bus.signal_for(id, attr)?.clone();
                let value = bus.widgets.get(&id)?.get(attr);
                Some((name, value))
            })
            .collect();
        for (name, value) in pending {
            self.emit(&name, &value);
        }
        true
    }

    /// Write a widget value.
    fn set_value(&mut self, id: WidgetId, value: impl Into<Value>) -> bool {
        self.set(id, Attr::Value, value)
    }

    /// Click a button, unless it is disabled.
    fn click(&mut self, id: WidgetId) -> bool {
        let Some(widget) = self.sigslot().widget(id) else {
            return false;
        };
        if widget.is_disabled() {
            debug!(widget = %widget.name(), "click on disabled button");
            return false;
        }
        let clicks = widget.clicks() + 1;
        self.set(id, Attr::Clicks, clicks)
    }

    /// Run `f` with attribute-triggered emission suppressed. Nests.
    fn ignore_events<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.sigslot_mut().muted += 1;
        let out = f(self);
        self.sigslot_mut().muted -= 1;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::options_from;

    #[derive(Default)]
    struct Root {
        bus: SigSlot<Root>,
        log: Vec<String>,
    }

    impl Observer for Root {
        fn sigslot(&self) -> &SigSlot<Self> {
            &self.bus
        }

        fn sigslot_mut(&mut self) -> &mut SigSlot<Self> {
            &mut self.bus
        }
    }

    fn root_with_select() -> (Root, WidgetId) {
        let mut root = Root::default();
        let id = root
            .bus
            .add_widget(Widget::select("x", options_from(["a", "b", "c"])));
        root.bus.register(Some(id), "x", Attr::Value);
        (root, id)
    }

    #[test]
    fn callbacks_run_in_connection_order() {
        let (mut root, id) = root_with_select();
        root.bus
            .connect("x", |r: &mut Root, v: &Value| r.log.push(format!("first {}", v)));
        root.bus
            .connect("x", |r: &mut Root, v: &Value| r.log.push(format!("second {}", v)));

        assert!(root.set_value(id, "b"));
        assert_eq!(root.log, ["first b", "second b"]);
    }

    #[test]
    fn false_return_stops_propagation() {
        let (mut root, id) = root_with_select();
        root.bus.connect("x", |r: &mut Root, _: &Value| {
            r.log.push("one".into());
            true
        });
        root.bus.connect("x", |r: &mut Root, _: &Value| {
            r.log.push("two".into());
            false
        });
        root.bus
            .connect("x", |r: &mut Root, _: &Value| r.log.push("three".into()));

        root.set_value(id, "a");
        assert_eq!(root.log, ["one", "two"]);
    }

    #[test]
    fn unchanged_write_does_not_emit() {
        let (mut root, id) = root_with_select();
        root.bus
            .connect("x", |r: &mut Root, _: &Value| r.log.push("fired".into()));
        root.set_value(id, "a");
        assert!(!root.set_value(id, "a"));
        assert_eq!(root.log.len(), 1);
    }

    #[test]
    fn ignore_events_mutes_writes_but_not_explicit_emits() {
        let (mut root, id) = root_with_select();
        root.bus
            .connect("x", |r: &mut Root, v: &Value| r.log.push(v.to_string()));

        root.ignore_events(|r| {
            assert!(r.set_value(id, "c"));
            r.ignore_events(|r| r.set_value(id, "b"));
            assert!(r.sigslot().is_muted());
            r.emit("x", &Value::from("manual"));
        });
        assert!(!root.bus.is_muted());
        assert_eq!(root.log, ["manual"]);
        assert_eq!(root.bus.value(id), &Value::from("b"));
    }

    #[test]
    fn reregistering_drops_callbacks() {
        let (mut root, id) = root_with_select();
        root.bus
            .connect("x", |r: &mut Root, _: &Value| r.log.push("old".into()));
        root.bus.register(Some(id), "x", Attr::Value);
        assert_eq!(root.bus.connections("x"), 0);
        root.set_value(id, "b");
        assert!(root.log.is_empty());
    }

    #[test]
    fn anonymous_signals_and_unknown_names() {
        let mut root = Root::default();
        root.bus.register(None, "remaining_dims", Attr::Value);
        assert!(!root.bus.connect("nope", |_: &mut Root, _: &Value| ()));
        root.bus.connect("remaining_dims", |r: &mut Root, v: &Value| {
            r.log.push(v.to_string())
        });
        root.emit("remaining_dims", &Value::List(vec!["time".into()]));
        root.emit("nope", &Value::None);
        assert_eq!(root.log, ["[time]"]);
    }

    #[test]
    fn callbacks_may_emit_other_signals_but_not_themselves() {
        let (mut root, id) = root_with_select();
        root.bus.register(None, "after", Attr::Value);
        root.bus.connect("x", move |r: &mut Root, _: &Value| {
            r.log.push("x".into());
            r.set_value(id, "c");
            r.emit("after", &Value::None);
        });
        root.bus
            .connect("after", |r: &mut Root, _: &Value| r.log.push("after".into()));

        root.set_value(id, "b");
        assert_eq!(root.log, ["x", "after"]);
        assert_eq!(root.bus.value(id), &Value::from("c"));
    }

    #[test]
    fn removing_a_widget_unregisters_its_signals() {
        let (mut root, id) = root_with_select();
        assert!(root.bus.remove_widget(id).is_some());
        assert!(!root.bus.is_registered("x"));
        assert!(!root.set_value(id, "a"));
    }

    #[test]
    fn disabled_buttons_ignore_clicks() {
        let mut root = Root::default();
        let id = root.bus.add_widget(Widget::button("Plot").disabled(true));
        root.bus.register(Some(id), "plot_clicked", Attr::Clicks);
        root.bus
            .connect("plot_clicked", |r: &mut Root, _: &Value| r.log.push("plot".into()));
        assert!(!root.click(id));
        root.set(id, Attr::Disabled, false);
        assert!(root.click(id));
        assert_eq!(root.log, ["plot"]);
    }
}
