use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and return the `/metrics` route
/// serving its rendered output.
pub fn setup_metrics() -> anyhow::Result<Router> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(Router::new().route("/metrics", get(move || async move { handle.render() })))
}
