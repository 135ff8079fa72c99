use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static JOBS_CREATED: AtomicU64 = AtomicU64::new(0);
static JOBS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static JOBS_FAILED: AtomicU64 = AtomicU64::new(0);
static JOBS_SWEPT: AtomicU64 = AtomicU64::new(0);

static ADVANCE_COUNT: AtomicU64 = AtomicU64::new(0);
static ADVANCE_TOTAL_MS: AtomicU64 = AtomicU64::new(0);

static LAST_ERROR_TS: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub jobs_created: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub jobs_swept: u64,
    pub advance_count: u64,
    pub advance_avg_ms: u64,
    pub last_error_ts: i64,
}

pub fn inc_jobs_created() {
    JOBS_CREATED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_jobs_completed() {
    JOBS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_jobs_failed() {
    JOBS_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_jobs_swept(count: u64) {
    JOBS_SWEPT.fetch_add(count, Ordering::Relaxed);
}

pub fn record_advance_duration_ms(duration_ms: u64) {
    ADVANCE_COUNT.fetch_add(1, Ordering::Relaxed);
    ADVANCE_TOTAL_MS.fetch_add(duration_ms, Ordering::Relaxed);
}

pub fn set_last_error_ts(ts: i64) {
    LAST_ERROR_TS.store(ts, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    let advance_count = ADVANCE_COUNT.load(Ordering::Relaxed);

    MetricsSnapshot {
        jobs_created: JOBS_CREATED.load(Ordering::Relaxed),
        jobs_completed: JOBS_COMPLETED.load(Ordering::Relaxed),
        jobs_failed: JOBS_FAILED.load(Ordering::Relaxed),
        jobs_swept: JOBS_SWEPT.load(Ordering::Relaxed),
        advance_count,
        advance_avg_ms: if advance_count > 0 {
            ADVANCE_TOTAL_MS.load(Ordering::Relaxed) / advance_count
        } else {
            0
        },
        last_error_ts: LAST_ERROR_TS.load(Ordering::Relaxed),
    }
}
