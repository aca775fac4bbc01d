use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "memento=info";

/// Installs the global tracing subscriber.
///
/// Cache events are logged under the `memento` target. With `json` set the
/// fmt layer writes one JSON object per event.
pub fn init_tracing(json: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_only_once() {
        let _ = init_tracing(false);

        assert!(init_tracing(true).is_err());
    }
}
