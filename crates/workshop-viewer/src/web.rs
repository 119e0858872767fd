//! Browser host for the viewer.
//!
//! Binds [`Viewer`] to the shell page: the location hash drives it, `fetch`
//! answers its requests, and its effects are applied to the two panes.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlElement, Response, Window};

use crate::manifest::MANIFEST_FILE;
use crate::page::{PageContent, ScrollTarget};
use crate::shell::{Effect, Event, FetchError, Viewer};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = hljs, js_name = highlightBlock)]
    fn highlight_block(block: &Element) -> Result<(), JsValue>;
}

/// Element ids the shell page provides.
const ROOT_ID: &str = "workshop";
const MENU_ID: &str = "workshop-menu";
const PAGE_ID: &str = "workshop-page";

struct Host {
    viewer: RefCell<Viewer>,
    window: Window,
    document: Document,
    menu: Element,
    page: HtmlElement,
}

/// Entry point run when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let title = document
        .get_element_by_id(ROOT_ID)
        .and_then(|root| root.get_attribute("data-title"))
        .unwrap_or_default();
    let menu = find(&document, MENU_ID)?;
    let page = find(&document, PAGE_ID)?.dyn_into::<HtmlElement>()?;

    let host = Rc::new(Host {
        viewer: RefCell::new(Viewer::new(title)),
        window,
        document,
        menu,
        page,
    });

    let listener = Rc::clone(&host);
    let on_hash_change = Closure::<dyn FnMut()>::new(move || {
        let hash = listener.window.location().hash().unwrap_or_default();
        dispatch(&listener, Event::HashChanged { hash });
    });
    host.window
        .add_event_listener_with_callback("hashchange", on_hash_change.as_ref().unchecked_ref())?;
    // The listener lives as long as the page.
    on_hash_change.forget();

    let hash = host.window.location().hash().unwrap_or_default();
    dispatch(&host, Event::Mounted { hash });

    Ok(())
}

fn find(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{} element", id)))
}

fn dispatch(host: &Rc<Host>, event: Event) {
    let effects = host.viewer.borrow_mut().handle(event);
    for effect in effects {
        apply(host, effect);
    }
}

fn apply(host: &Rc<Host>, effect: Effect) {
    match effect {
        Effect::FetchManifest => {
            let host = Rc::clone(host);
            spawn_local(async move {
                let result = fetch_text(&host.window, MANIFEST_FILE).await;
                dispatch(&host, Event::ManifestFetched(result));
            });
        }
        Effect::FetchPage(ticket) => {
            let host = Rc::clone(host);
            spawn_local(async move {
                let result = fetch_text(&host.window, &ticket.url()).await;
                dispatch(&host, Event::PageFetched { ticket, result });
            });
        }
        Effect::Navigate(hash) => {
            if let Err(e) = host.window.location().set_hash(&hash) {
                tracing::error!("Failed to navigate to {}: {:?}", hash, e);
            }
        }
        Effect::Alert(message) => {
            if let Err(e) = host.window.alert_with_message(&message) {
                tracing::warn!("Failed to show alert {:?}: {:?}", message, e);
            }
        }
        Effect::RenderMenu(html) => host.menu.set_inner_html(&html),
        Effect::RenderPage(content) => render_page(host, &content),
        Effect::Scroll(target) => scroll(host, &target),
    }
}

fn render_page(host: &Host, content: &PageContent) {
    host.page.set_inner_html("");
    host.page.set_inner_html(&content.html);

    if content.code_blocks == 0 {
        return;
    }

    let Ok(blocks) = host.page.query_selector_all("pre code") else {
        return;
    };
    for i in 0..blocks.length() {
        let Some(block) = blocks.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if let Err(e) = highlight_block(&block) {
            tracing::warn!("Highlighter unavailable: {:?}", e);
            break;
        }
    }
}

fn scroll(host: &Host, target: &ScrollTarget) {
    match target {
        ScrollTarget::Anchor(id) => {
            if let Some(element) = host.document.get_element_by_id(id) {
                element.scroll_into_view();
            }
        }
        ScrollTarget::Top => host.page.set_scroll_top(0),
    }
}

async fn fetch_text(window: &Window, url: &str) -> Result<String, FetchError> {
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_error)?;
    let response: Response = response.dyn_into().map_err(js_error)?;

    if !response.ok() {
        return Err(FetchError::Status {
            status: response.status(),
            status_text: response.status_text(),
        });
    }

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;

    text.as_string()
        .ok_or_else(|| FetchError::Network(format!("{} did not return text", url)))
}

fn js_error(value: JsValue) -> FetchError {
    FetchError::Network(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}
