use crate::error::Result;
use crate::executor::FilterPlanExecutor;
use project_filter_protocol::{FilterOptions, FilterReport};
use std::sync::atomic::{AtomicBool, Ordering};

/// Entry point bound to the host's "filter projects" command.
///
/// At most one filter application runs at a time; a request arriving while
/// another is in flight is dropped, not queued.
pub struct FilterCommand {
    executor: FilterPlanExecutor,
    in_progress: AtomicBool,
}

struct InProgressGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InProgressGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl FilterCommand {
    pub fn new(executor: FilterPlanExecutor) -> Self {
        Self {
            executor,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub async fn run(&self, options: &FilterOptions) -> Result<FilterReport> {
        let Some(_guard) = InProgressGuard::try_acquire(&self.in_progress) else {
            log::debug!("Project filter already running; request dropped");
            return Ok(FilterReport::skipped());
        };

        self.executor.apply(options).await.map_err(|err| {
            log::error!("Project filter failed: {err}");
            err
        })
    }
}
