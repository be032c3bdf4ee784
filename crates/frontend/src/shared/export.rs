//! Browser side of exports: turning generated content into a download or a
//! print dialog. The content itself is built in `contracts`.
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlDocument, Url};

/// Offers `content` as a file download
pub fn download_text(content: &str, mime_type: &str, filename: &str) -> Result<(), String> {
    if content.is_empty() {
        return Err("Nothing to export".to_string());
    }
    let blob = create_text_blob(content, mime_type)?;
    download_blob(&blob, filename)
}

/// Creates a Blob object from text
fn create_text_blob(content: &str, mime_type: &str) -> Result<Blob, String> {
    let array = js_sys::Array::new();
    array.push(&wasm_bindgen::JsValue::from_str(content));

    let properties = BlobPropertyBag::new();
    properties.set_type(mime_type);

    Blob::new_with_str_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))
}

/// Starts a browser download of a Blob (exports and evidence files alike)
pub fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    // Temporary hidden link
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    let body = document.body().ok_or("No body element")?;
    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}

/// Opens `html` in a new window and shows the print dialog
/// (which also covers "save as PDF").
pub fn print_html(html: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let print_window = window
        .open_with_url_and_target("", "_blank")
        .map_err(|e| format!("Failed to open print window: {:?}", e))?
        .ok_or("Print window was blocked")?;
    let document = print_window
        .document()
        .ok_or("Print window has no document")?
        .dyn_into::<HtmlDocument>()
        .map_err(|_| "Print window has no HTML document")?;
    // Written as a whole document so the root keeps its lang and dir
    document
        .open()
        .map_err(|e| format!("Failed to open print document: {:?}", e))?;
    document
        .write_1(html)
        .map_err(|e| format!("Failed to write print document: {:?}", e))?;
    document
        .close()
        .map_err(|e| format!("Failed to close print document: {:?}", e))?;
    print_window
        .print()
        .map_err(|e| format!("Failed to print: {:?}", e))?;
    Ok(())
}
