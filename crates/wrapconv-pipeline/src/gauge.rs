use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counts the decoded images alive in a pipeline run and remembers the peak.
#[derive(Debug, Default)]
pub(crate) struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register one more image. The image is released when the ticket drops.
    pub(crate) fn acquire(self: &Arc<Self>) -> InFlightTicket {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightTicket(self.clone())
    }

    pub(crate) fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub(crate) struct InFlightTicket(Arc<InFlightGauge>);

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}
