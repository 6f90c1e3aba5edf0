use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One recorder per process; later `init()` calls share it.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once) and describe the pipeline series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_all();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format, ready to merge into the app.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        let render = move || std::future::ready(handle.render());
        Router::new().route("/metrics", get(render))
    }
}

fn describe_all() {
    describe_counter!("sentiment_batches_total", "Analysis batches started, by engine.");
    describe_counter!(
        "sentiment_records_scored_total",
        "Records scored by successful batches, by engine."
    );
    describe_counter!(
        "sentiment_batch_failures_total",
        "Batches aborted by an engine failure, by engine."
    );
    describe_counter!("ingest_rows_total", "Rows read by the CSV ingestion adapter.");
    describe_counter!(
        "ingest_timestamp_fallbacks_total",
        "Rows whose timestamp defaulted to ingestion time."
    );
    describe_histogram!("classifier_train_ms", "Classifier training time in milliseconds.");
    describe_gauge!(
        "classifier_vocabulary_size",
        "Vocabulary size of the current classifier model."
    );
}
