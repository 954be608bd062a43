//! Publish/subscribe event bus for the dashboard core.
//!
//! The dispatcher, layout manager and comparison engine publish
//! [`DashboardEvent`]s; render targets and external code subscribe with an
//! [`EventFilter`] and receive matching events on an `mpsc` channel.
//! Each event carries a set of [`EventKind`] flags so a single occurrence can
//! match several categories (a restored layout is also a layout change).

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::data::grid::GridCell;
use crate::sink::SensorId;

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Data ────────────────────────────────────────────────────────────
    /// New points were appended to one or more sensor buffers.
    pub const SENSOR_UPDATED: Self = Self(1 << 0);
    /// Buffers were discarded (deselection or rebuild).
    pub const BUFFERS_CLEARED: Self = Self(1 << 1);

    // ── Selection ───────────────────────────────────────────────────────
    /// The set of displayed sensors changed.
    pub const SELECTION_CHANGED: Self = Self(1 << 2);

    // ── Layout ──────────────────────────────────────────────────────────
    /// The grid was rebuilt from the selection.
    pub const LAYOUT_REBUILT: Self = Self(1 << 3);
    /// Two plots exchanged cells.
    pub const LAYOUT_SWAPPED: Self = Self(1 << 4);
    /// Cells were placed manually.
    pub const LAYOUT_PLACED: Self = Self(1 << 5);
    /// A persisted layout was applied.
    pub const LAYOUT_RESTORED: Self = Self(1 << 6);
    /// A layout operation was rejected; the previous assignment is kept.
    pub const LAYOUT_REJECTED: Self = Self(1 << 7);

    // ── Comparison ──────────────────────────────────────────────────────
    /// A comparison produced a new set of curves.
    pub const COMPARISON_READY: Self = Self(1 << 8);
    /// A curve colour was overridden.
    pub const CURVE_COLOR_CHANGED: Self = Self(1 << 9);

    /// Any layout change.
    pub const LAYOUT_CHANGED: Self = Self(
        Self::LAYOUT_REBUILT.0 | Self::LAYOUT_SWAPPED.0 | Self::LAYOUT_PLACED.0 | Self::LAYOUT_RESTORED.0,
    );

    /// Wildcard: matches every event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` intersects with `other` (at least one bit in common).
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::SENSOR_UPDATED, "SENSOR_UPDATED"),
            (EventKind::BUFFERS_CLEARED, "BUFFERS_CLEARED"),
            (EventKind::SELECTION_CHANGED, "SELECTION_CHANGED"),
            (EventKind::LAYOUT_REBUILT, "LAYOUT_REBUILT"),
            (EventKind::LAYOUT_SWAPPED, "LAYOUT_SWAPPED"),
            (EventKind::LAYOUT_PLACED, "LAYOUT_PLACED"),
            (EventKind::LAYOUT_RESTORED, "LAYOUT_RESTORED"),
            (EventKind::LAYOUT_REJECTED, "LAYOUT_REJECTED"),
            (EventKind::COMPARISON_READY, "COMPARISON_READY"),
            (EventKind::CURVE_COLOR_CHANGED, "CURVE_COLOR_CHANGED"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }
        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Points appended to one sensor's buffer during a single ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorUpdateMeta {
    pub sensor: SensorId,
    pub timestamp: f64,
    pub value: f64,
}

/// Cells touched by a layout operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMeta {
    pub sensors: Vec<SensorId>,
    pub cells: Vec<GridCell>,
    /// Reason text for rejected operations.
    pub reason: Option<String>,
}

/// A rich event emitted by the dashboard core.
#[derive(Debug, Clone)]
pub struct DashboardEvent {
    pub kinds: EventKind,
    /// Seconds since the bus was created; set on publish.
    pub timestamp: f64,
    pub sensor_update: Option<SensorUpdateMeta>,
    pub layout: Option<LayoutMeta>,
    pub selection: Option<Vec<SensorId>>,
    pub curve_count: Option<usize>,
}

impl DashboardEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0,
            sensor_update: None,
            layout: None,
            selection: None,
            curve_count: None,
        }
    }

    pub fn sensor_updated(sensor: SensorId, timestamp: f64, value: f64) -> Self {
        let mut evt = Self::new(EventKind::SENSOR_UPDATED);
        evt.sensor_update = Some(SensorUpdateMeta {
            sensor,
            timestamp,
            value,
        });
        evt
    }

    pub fn layout(kinds: EventKind, sensors: Vec<SensorId>, cells: Vec<GridCell>) -> Self {
        let mut evt = Self::new(kinds);
        evt.layout = Some(LayoutMeta {
            sensors,
            cells,
            reason: None,
        });
        evt
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        let mut evt = Self::new(EventKind::LAYOUT_REJECTED);
        evt.layout = Some(LayoutMeta {
            sensors: Vec::new(),
            cells: Vec::new(),
            reason: Some(reason.into()),
        });
        evt
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter / EventBus
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask filter: an event is delivered when `event.kinds.intersects(mask)`.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &DashboardEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

struct Subscriber {
    filter: EventFilter,
    sender: Sender<DashboardEvent>,
}

/// Cloneable handle that distributes events to subscribers.
///
/// Publishing happens on the UI thread; subscribing may happen from any
/// thread, hence the shared inner state.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<EventBusInner>>,
}

struct EventBusInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventBusInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching `filter`.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<DashboardEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = lock(&self.inner);
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<DashboardEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Deliver `event` to matching subscribers. Subscribers whose receiver
    /// was dropped are pruned when an event is sent to them.
    pub fn publish(&self, mut event: DashboardEvent) {
        let mut inner = lock(&self.inner);
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// A panicking subscriber thread must not take the bus down with it.
fn lock(inner: &Mutex<EventBusInner>) -> std::sync::MutexGuard<'_, EventBusInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_union_and_intersection() {
        let combined = EventKind::LAYOUT_SWAPPED | EventKind::LAYOUT_PLACED;
        assert!(combined.contains(EventKind::LAYOUT_SWAPPED));
        assert!(combined.intersects(EventKind::LAYOUT_CHANGED));
        assert!(!EventKind::SENSOR_UPDATED.intersects(combined));
    }

    #[test]
    fn filter_delivers_only_matching_kinds() {
        let bus = EventBus::new();
        let rx_all = bus.subscribe_all();
        let rx_layout = bus.subscribe(EventFilter::only(EventKind::LAYOUT_CHANGED));
        let rx_data = bus.subscribe(EventFilter::only(EventKind::SENSOR_UPDATED));

        bus.publish(DashboardEvent::layout(
            EventKind::LAYOUT_SWAPPED,
            vec!["a".into(), "b".into()],
            vec![GridCell::at(0, 0), GridCell::at(0, 1)],
        ));

        assert!(rx_all.try_recv().is_ok());
        let evt = rx_layout.try_recv().unwrap();
        assert_eq!(evt.layout.unwrap().sensors, vec!["a", "b"]);
        assert!(rx_data.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe_all();
        let rx2 = bus.subscribe_all();
        drop(rx1);
        bus.publish(DashboardEvent::sensor_updated("speed".into(), 1.0, 2.0));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn display_joins_names() {
        assert_eq!(format!("{}", EventKind::SENSOR_UPDATED), "SENSOR_UPDATED");
        assert_eq!(
            format!("{}", EventKind::LAYOUT_REBUILT | EventKind::SELECTION_CHANGED),
            "SELECTION_CHANGED|LAYOUT_REBUILT"
        );
        assert_eq!(format!("{}", EventKind::ALL), "ALL");
        assert!(format!("{}", EventKind(1 << 63)).starts_with("0x"));
    }
}
