//! Señal de abort externo para una ejecución.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct AbortInner {
    aborted: AtomicBool,
    notify: Notify,
}

/// Handle clonable; el engine lo consulta entre estados y durante las esperas
/// de backoff. Una invocación remota en curso no se interrumpe.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    inner: Arc<AbortInner>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    /// Espera `delay` sin bloquear el hilo. Devuelve `false` si se abortó
    /// antes de completar la espera.
    pub async fn sleep(&self, delay: Duration) -> bool {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_aborted() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.is_aborted(),
            _ = &mut notified => false,
        }
    }
}
