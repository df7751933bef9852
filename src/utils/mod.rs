use std::cmp::Ordering;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Filter directive used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "miser=info";

/// Initializes the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Turns `(name, amount)` pairs into a list sorted ascending by amount.
pub fn sorted_by_amount<K, I>(entries: I) -> Vec<(K, f64)>
where
    I: IntoIterator<Item = (K, f64)>,
{
    let mut list: Vec<(K, f64)> = entries.into_iter().collect();
    list.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    list
}
