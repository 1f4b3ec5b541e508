//! Demo server: prerenders a table, serves the page, and answers the signed
//! script request from the same listener.

use std::convert::Infallible;
use std::fs::File;
use std::net::SocketAddr;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use livetable_lib::model::{RenderPreferences, TableData};
use livetable_lib::prerender::Prerenderer;
use livetable_lib::server::{ScriptAssets, ScriptEndpoint};
use livetable_lib::sign::Secret;
use livetable_lib::{ScriptEmbed, ScriptRequest};
use tabledom::{serialize, Element, Node};

const WIDGET_ID: &str = "livetable-demo";

const LIBRARY_SOURCE: &str = "\
var liveTable = {
  attach: function (table, options) {
    console.log('liveTable attached to #' + table.id, options);
  }
};";

const BOOTSTRAP_SOURCE: &str = "\
function liveTableBoot(widgetId, options) {
  var table = document.getElementById(widgetId);
  if (table) {
    liveTable.attach(table, options);
  }
}";

fn peaks() -> TableData {
    TableData::new(
        ["Mountain", "Height (m)", "Range"],
        [
            ["Everest", "8849", "Mahalangur Himal"],
            ["K2", "8611", "Baltoro Karakoram"],
            ["Kangchenjunga", "8586", "Kangchenjunga Himal"],
            ["Lhotse", "8516", "Mahalangur Himal"],
            ["Makalu", "8485", "Mahalangur Himal"],
            ["Cho Oyu", "8188", "Mahalangur Himal"],
            ["Dhaulagiri I", "8167", "Dhaulagiri Himal"],
            ["Manaslu", "8163", "Manaslu Himal"],
            ["Nanga Parbat", "8126", "Nanga Parbat Himal"],
            ["Annapurna I", "8091", "Annapurna Himal"],
            ["Gasherbrum I", "8080", "Baltoro Karakoram"],
            ["Broad Peak", "8051", "Baltoro Karakoram"],
        ],
    )
}

fn demo_page(widget: Vec<Node>) -> String {
    let mut body = Element::new("body");
    body.push(Node::Element(
        Element::new("h1").text("Highest mountains"),
    ));
    for node in widget {
        body.push(node);
    }
    let html = Element::new("html")
        .attr("lang", "en")
        .child(Element::new("head").child(Element::new("title").text("Live table demo")))
        .child(body);
    format!("<!DOCTYPE html>\n{}", serialize(&html))
}

fn html_response(page: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(page.to_string())))
        .unwrap()
}

#[tokio::main]
async fn main() {
    let log_file = File::create("livetable-server.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let secret = Secret::generate();
    let endpoint = ScriptEndpoint::new(
        secret.clone(),
        ScriptAssets::new(LIBRARY_SOURCE, BOOTSTRAP_SOURCE, "liveTableBoot"),
    );

    // Prerender the demo table and sign its script URL.
    let prerenderer = Prerenderer::new(RenderPreferences::default());
    let rendered = prerenderer
        .render(peaks().to_element(WIDGET_ID))
        .expect("Failed to prerender demo table");
    let script = ScriptRequest::new(WIDGET_ID, prerenderer.options().clone());
    let url = script
        .signed_url("/live-table", &secret)
        .expect("Failed to sign script URL");
    let page = demo_page(ScriptEmbed::Async.embed(rendered.into_element(), &url));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    println!("Serving demo table at http://{addr}/ (Ctrl+C to stop)");

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("[server] accept failed: {}", e);
                    continue;
                }
            },
        };
        log::debug!("[server] connection from {}", peer);

        let io = TokioIo::new(stream);
        let endpoint = endpoint.clone();
        let page = page.clone();
        let service = service_fn(move |req: Request<Incoming>| {
            let endpoint = endpoint.clone();
            let page = page.clone();
            async move {
                // Script requests go to the endpoint; everything else gets
                // the demo page.
                let response = endpoint
                    .try_handle(&req)
                    .unwrap_or_else(|| html_response(&page));
                Ok::<_, Infallible>(response)
            }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        // Connection errors are not critical (client may close early)
        let _ = conn.await;
    }

    println!("Shutting down");
}
