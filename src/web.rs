//! HTTP bootstrap. The registry is loaded before the listener binds and is
//! never written again, so handlers share it through a plain `Arc`.
use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::authz::Registry;
use crate::errors::WarrantError;
use crate::settings::Settings;

pub async fn serve(settings: &Settings, registry: Registry) -> Result<(), WarrantError> {
    let addr: SocketAddr = settings
        .listen_addr()
        .parse()
        .map_err(|_| WarrantError::BadAddress(settings.listen_addr()))?;

    let router = crate::authz::web::router(Arc::new(registry)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Authorization policy API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
