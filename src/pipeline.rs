//! One invocation: build the request, run the traced round trip, render.

use crate::base::error::Error;
use crate::config::DiagConfig;
use crate::http::{RequestSpec, Transport};
use crate::render::{self, Event, OutputSink};
use crate::socket::observer::ConnectionEvent;

/// Visit `config.url` once and render the result into `sink`.
///
/// `Connected` is emitted from inside the transport as soon as TCP is up,
/// `ConnectedVia` once the round trip returns, and only then headers and
/// body. On [`Error::Connect`] nothing past the failed connect is emitted;
/// the caller must stop.
pub async fn visit(
    config: &DiagConfig,
    transport: &Transport,
    sink: &mut dyn OutputSink,
) -> Result<(), Error> {
    let mut builder =
        RequestSpec::builder(config.method.as_str(), config.url.clone()).body(config.body.as_str());
    for (name, value) in &config.headers {
        builder = builder.header(name, value);
    }
    let spec = builder.build()?;

    let mut on_connect = |event: &ConnectionEvent| {
        if event.is_ok() {
            sink.emit(Event::Connected {
                peer: event.peer_address.clone(),
            });
        }
    };
    let resp = transport.execute(spec, &mut on_connect).await?;

    sink.emit(Event::ConnectedVia(resp.tls_version().clone()));
    render::render(resp, config.render_options(), sink).await;
    Ok(())
}
