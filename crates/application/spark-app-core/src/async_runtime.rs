use std::sync::OnceLock;
use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

/// Shared runtime for background transport work, built on first use.
pub(crate) fn runtime() -> anyhow::Result<&'static Runtime> {
    let built = RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("spark-runtime")
            .build()
            .map_err(|e| e.to_string())
    });
    built
        .as_ref()
        .map_err(|message| anyhow::anyhow!("Failed to build async runtime: {message}"))
}
