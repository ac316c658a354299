// ── Reactive singleton slot ──

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::model::SingletonContent;

/// Holder for one singleton configuration object.
///
/// The value is `None` until first load or first local edit. The row id
/// of the backing `site_content` row is cached separately once known --
/// it exists only after the first persisted write.
pub(crate) struct SingletonSlot<T: SingletonContent> {
    value: watch::Sender<Option<Arc<T>>>,
    row_id: Mutex<Option<i64>>,
}

impl<T: SingletonContent> SingletonSlot<T> {
    pub(crate) fn new() -> Self {
        let (value, _) = watch::channel(None);
        Self {
            value,
            row_id: Mutex::new(None),
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.value.borrow().clone()
    }

    pub(crate) fn set(&self, value: T) {
        self.value.send_modify(|v| *v = Some(Arc::new(value)));
    }

    /// Reset to the never-loaded state (used when reverting a failed
    /// first write).
    pub(crate) fn clear(&self) {
        self.value.send_modify(|v| *v = None);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.value.subscribe()
    }

    pub(crate) fn row_id(&self) -> Option<i64> {
        match self.row_id.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub(crate) fn set_row_id(&self, id: i64) {
        match self.row_id.lock() {
            Ok(mut guard) => *guard = Some(id),
            Err(poisoned) => *poisoned.into_inner() = Some(id),
        }
    }
}
