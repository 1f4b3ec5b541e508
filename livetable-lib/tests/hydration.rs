//! End-to-end widget flow: prerender static markup, serve the signed script
//! request, hydrate on first interaction.

use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, StatusCode};
use tabledom::{Element, Node};

use livetable_lib::hydrate::{
    HydrationOutcome, HydrationPhase, Hydrator, Interaction, WidgetLibrary,
};
use livetable_lib::model::{RenderOptions, RenderPreferences, TableData};
use livetable_lib::prerender::Prerenderer;
use livetable_lib::server::{ScriptAssets, ScriptEndpoint};
use livetable_lib::sign::Secret;
use livetable_lib::{ScriptEmbed, ScriptRequest};

/// Stand-in for the real widget library: fresh chrome, table carried over.
struct StubWidget;

#[async_trait]
impl WidgetLibrary for StubWidget {
    async fn attach(&self, table: Element, options: &RenderOptions) -> Element {
        let mut wrapper = Element::new("div").class("dataTable-wrapper");
        if options.searchable {
            let search = Element::new("div").class("dataTable-search").child(
                Element::new("input")
                    .class("dataTable-input")
                    .attr("type", "text"),
            );
            wrapper = wrapper.child(Element::new("div").class("dataTable-top").child(search));
        }
        wrapper.child(Element::new("div").class("dataTable-container").child(table))
    }
}

fn people(rows: usize) -> TableData {
    let data: Vec<Vec<String>> = (0..rows)
        .map(|i| vec![format!("Person {i}"), format!("{}", 20 + i)])
        .collect();
    TableData::new(vec!["Name".to_string(), "Age".to_string()], data)
}

fn page_with(nodes: Vec<Node>) -> Element {
    let mut page = Element::new("main");
    page.children = nodes;
    page
}

fn hidden_row_count(root: &Element) -> usize {
    let mut count = 0;
    tabledom::for_each_element(root, &mut |element| {
        if element.tag() == "tr" && element.has_attribute("hidden") {
            count += 1;
        }
    });
    count
}

#[tokio::test]
async fn test_prerender_serve_hydrate_round_trip() {
    let secret = Secret::new("integration secret");
    let endpoint = ScriptEndpoint::new(
        secret.clone(),
        ScriptAssets::new("var lib = {};", "function boot(id, options) {}", "boot"),
    );

    // Server side: prerender and embed.
    let prerenderer = Prerenderer::new(RenderPreferences::default());
    let rendered = prerenderer
        .render(people(12).to_element("livetable-1"))
        .unwrap();
    assert!(rendered.is_widget());

    let script = ScriptRequest::new("livetable-1", prerenderer.options().clone());
    let url = script.signed_url("/live-table", &secret).unwrap();
    let mut page = page_with(ScriptEmbed::Async.embed(rendered.into_element(), &url));

    let markup = tabledom::serialize(&page);
    assert!(markup.contains("Showing 1 to 10 of 12 entries"));
    assert!(markup.contains(&format!(r#"<script async src="{}""#, url.replace('&', "&amp;"))));
    assert_eq!(hidden_row_count(&page), 2);

    // The browser fetches the script.
    let request = Request::builder().uri(url.as_str()).body(()).unwrap();
    let response = endpoint.try_handle(&request).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("boot(\"livetable-1\","));

    // Client side: options arrive through the bundle payload.
    let decoded = ScriptRequest::decode(&script.canonical_payload().unwrap()).unwrap();
    let mut hydrator =
        Hydrator::bind(&page, "livetable-1", decoded.options, StubWidget).unwrap();
    assert!(hydrator.arm());

    let table = tabledom::find_by_html_id(&page, "livetable-1").unwrap();
    let target = table
        .child_elements()
        .find(|child| child.tag() == "tbody")
        .and_then(|tbody| tbody.child_elements().next())
        .map(Element::node_id)
        .unwrap();

    let outcome = hydrator
        .handle_interaction(&mut page, Interaction::Click { target: Some(target) })
        .await;
    assert_eq!(outcome, HydrationOutcome::Live { focused: Some(target) });
    assert_eq!(hydrator.phase(), HydrationPhase::Live);

    // The live widget owns the markup now: no sliced rows, no static chrome.
    assert_eq!(hidden_row_count(&page), 0);
    let markup = tabledom::serialize(&page);
    assert!(!markup.contains("dataTable-info"));
    assert!(tabledom::contains(&page, target));
}

#[tokio::test]
async fn test_tampered_options_never_serve_the_widget() {
    let secret = Secret::new("integration secret");
    let endpoint = ScriptEndpoint::new(
        secret.clone(),
        ScriptAssets::new("var lib = {};", "function boot(id, options) {}", "boot"),
    );

    let honest = ScriptRequest::new("t1", {
        let mut options = RenderOptions::default();
        options.per_page = 10;
        options
    });
    let forged = ScriptRequest::new("t1", {
        let mut options = RenderOptions::default();
        options.per_page = 999;
        options
    });

    let signature = secret.sign(&honest.canonical_payload().unwrap());
    let url = format!(
        "/live-table?livetable-script={}&livetable-script-hmac={}",
        urlencoding::encode(&forged.canonical_payload().unwrap()),
        signature
    );

    let request = Request::builder().uri(url).body(()).unwrap();
    let response = endpoint.try_handle(&request).unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/javascript; charset=utf-8"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(body, r#"console.error("HMAC verification failed");"#);
    assert!(!body.contains("var lib"));
}

#[tokio::test]
async fn test_header_only_table_stays_static() {
    let prerenderer = Prerenderer::new(RenderPreferences::default());
    let rendered = prerenderer.render(people(0).to_element("t1")).unwrap();
    assert!(!rendered.is_widget());

    let markup = tabledom::serialize(&rendered.into_element());
    assert!(!markup.contains("width:"));
    assert!(!markup.contains("dataTable-wrapper"));
}

#[tokio::test]
async fn test_hydration_without_target_restores_nothing() {
    let prerenderer = Prerenderer::new(RenderPreferences::default());
    let rendered = prerenderer.render(people(5).to_element("t1")).unwrap();
    let mut page = page_with(vec![Node::Element(rendered.into_element())]);

    let mut hydrator = Hydrator::bind(
        &page,
        "t1",
        prerenderer.options().clone(),
        StubWidget,
    )
    .unwrap();
    hydrator.arm();

    let outcome = hydrator
        .handle_interaction(&mut page, Interaction::KeyUp { target: None })
        .await;
    assert_eq!(outcome, HydrationOutcome::Live { focused: None });
    assert_eq!(hydrator.focused(), None);

    let table = tabledom::find_by_html_id(&page, "t1").unwrap();
    assert!(!table.has_class("dataTable-table"));
}

#[tokio::test]
async fn test_sandboxed_embed_hosts_the_wrapper() {
    let secret = Secret::new("integration secret");
    let prerenderer = Prerenderer::new(RenderPreferences::default());
    let rendered = prerenderer.render(people(3).to_element("t1")).unwrap();

    let script = ScriptRequest::new("t1", prerenderer.options().clone());
    let url = script.signed_url("/live-table", &secret).unwrap();
    let page = page_with(ScriptEmbed::Sandboxed.embed(rendered.into_element(), &url));

    let markup = tabledom::serialize(&page);
    assert!(markup.starts_with(&format!(
        r#"<main><amp-script src="{}" sandbox="allow-forms">"#,
        url.replace('&', "&amp;")
    )));
    assert!(markup.contains("dataTable-wrapper"));
}
