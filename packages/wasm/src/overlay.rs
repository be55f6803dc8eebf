//! Editor chrome: exit button, save indicator, formatting toolbar, image
//! overlay, link popup and SEO modal
//!
//! Every root element carries one of the ids in
//! [`frontecs_editor::EDITOR_ROOT_IDS`] so clicks inside it never become
//! edits. The overlay holds no editing state of its own; [`Overlay::render`]
//! mirrors the session after every event.

use frontecs_editor::{ActiveState, EditorSession, FormatCommand, PanelSize, Placement, SaveStatus, SeoMetadata};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::dom::DomPage;

const FONT_SIZES: &[u32] = &[10, 12, 14, 16, 18, 20, 24, 28, 32, 36, 42, 48, 60, 72];

const STYLE: &str = r#"
#__fe_btn__{position:fixed;right:16px;bottom:16px;z-index:2147483000;padding:8px 14px;border-radius:20px;background:#111;color:#fff;font:600 13px/1.2 system-ui,sans-serif;cursor:pointer;box-shadow:0 4px 14px rgba(0,0,0,.25)}
#__fe_save__{position:fixed;right:16px;bottom:60px;z-index:2147483000;display:none;padding:6px 12px;border-radius:6px;font:13px system-ui,sans-serif;color:#fff;background:#555}
#__fe_save__.saved{background:#1f8b4c}
#__fe_save__.error{background:#c0392b}
#__fe_toolbar__,#__fe_img_overlay__,#__fe_link_popup__{position:absolute;z-index:2147483001;align-items:center;gap:4px;padding:6px;border-radius:8px;background:#fff;box-shadow:0 4px 18px rgba(0,0,0,.2);font:13px system-ui,sans-serif}
#__fe_toolbar__ button,#__fe_img_overlay__ button,#__fe_link_popup__ button{min-width:30px;height:30px;border:0;border-radius:5px;background:#f1f1f1;cursor:pointer}
.__fe_sep__{width:1px;height:22px;background:#ddd;margin:0 2px}
#__fe_link_input__{width:240px;height:28px;padding:0 6px;border:1px solid #ccc;border-radius:5px}
#__fe_seo_backdrop__{position:fixed;inset:0;z-index:2147483002;background:rgba(0,0,0,.4)}
#__fe_seo_modal__{position:fixed;top:50%;left:50%;transform:translate(-50%,-50%);z-index:2147483003;width:min(480px,92vw);flex-direction:column;border-radius:10px;background:#fff;font:14px system-ui,sans-serif;box-shadow:0 10px 40px rgba(0,0,0,.3)}
.__fe_seo_header__,.__fe_seo_footer__{display:flex;justify-content:space-between;gap:8px;padding:12px 16px}
.__fe_seo_body__{display:flex;flex-direction:column;gap:10px;padding:0 16px}
.__fe_seo_label__{display:flex;flex-direction:column;gap:4px;font-weight:600}
.__fe_seo_label__ input,.__fe_seo_label__ textarea{font:14px system-ui,sans-serif;padding:6px;border:1px solid #ccc;border-radius:5px}
[data-fe-active]{outline:2px dashed #3b82f6;outline-offset:2px}
"#;

/// The four SEO inputs
pub struct SeoFields {
    title: HtmlInputElement,
    description: HtmlTextAreaElement,
    og_title: HtmlInputElement,
    og_description: HtmlTextAreaElement,
}

impl SeoFields {
    pub fn fill(&self, seo: &SeoMetadata) {
        self.title.set_value(&seo.title);
        self.description.set_value(&seo.description);
        self.og_title.set_value(&seo.og_title);
        self.og_description.set_value(&seo.og_description);
        let _ = self.title.focus();
    }

    pub fn read(&self) -> SeoMetadata {
        SeoMetadata {
            title: self.title.value(),
            description: self.description.value(),
            og_title: self.og_title.value(),
            og_description: self.og_description.value(),
        }
    }
}

pub struct Overlay {
    pub exit_button: HtmlElement,
    pub save_indicator: HtmlElement,
    pub toolbar: HtmlElement,
    pub format_buttons: Vec<(HtmlElement, FormatCommand)>,
    pub color_input: HtmlInputElement,
    pub size_select: HtmlSelectElement,
    pub seo_button: HtmlElement,
    pub image_overlay: HtmlElement,
    pub image_replace: HtmlElement,
    pub image_close: HtmlElement,
    pub image_input: HtmlInputElement,
    pub link_popup: HtmlElement,
    pub link_input: HtmlInputElement,
    pub link_save: HtmlElement,
    pub link_close: HtmlElement,
    pub seo_backdrop: HtmlElement,
    pub seo_modal: HtmlElement,
    pub seo_close: HtmlElement,
    pub seo_cancel: HtmlElement,
    pub seo_save: HtmlElement,
    pub seo_fields: SeoFields,
    /// Anchor the link popup was last opened for
    link_anchor: Option<Element>,
}

impl Overlay {
    /// Create every overlay element and append it to `body`
    pub fn build(document: &Document) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let style = document.create_element("style")?;
        style.set_id("__fe_style__");
        style.set_text_content(Some(STYLE));
        body.append_child(&style)?;

        let exit_button = create(document, "div", "__fe_btn__")?;
        exit_button.set_inner_html("<span>&#9998;</span> Editing");
        exit_button.set_title("Click to exit edit mode");
        body.append_child(&exit_button)?;

        let save_indicator = create(document, "div", "__fe_save__")?;
        body.append_child(&save_indicator)?;

        let toolbar = create(document, "div", "__fe_toolbar__")?;
        toolbar.set_inner_html(&toolbar_markup());
        hide(&toolbar);
        body.append_child(&toolbar)?;

        let image_overlay = create(document, "div", "__fe_img_overlay__")?;
        image_overlay.set_inner_html(concat!(
            r#"<button id="__fe_img_replace__">&#128247; Replace Image</button>"#,
            r#"<button id="__fe_img_close__">&times;</button>"#,
            r#"<input type="file" id="__fe_img_input__" accept="image/*" style="display:none">"#,
        ));
        hide(&image_overlay);
        body.append_child(&image_overlay)?;

        let link_popup = create(document, "div", "__fe_link_popup__")?;
        link_popup.set_inner_html(concat!(
            r#"<span>&#128279; URL</span>"#,
            r#"<input type="url" id="__fe_link_input__" placeholder="https://">"#,
            r#"<button id="__fe_link_save__">Save</button>"#,
            r#"<button id="__fe_link_close__">&times;</button>"#,
        ));
        hide(&link_popup);
        body.append_child(&link_popup)?;

        let seo_backdrop = create(document, "div", "__fe_seo_backdrop__")?;
        hide(&seo_backdrop);
        body.append_child(&seo_backdrop)?;

        let seo_modal = create(document, "div", "__fe_seo_modal__")?;
        seo_modal.set_inner_html(concat!(
            r#"<div class="__fe_seo_header__"><span>&#128270; SEO Settings</span><button id="__fe_seo_close__">&times;</button></div>"#,
            r#"<div class="__fe_seo_body__">"#,
            r#"<label class="__fe_seo_label__">Page Title<input id="__fe_seo_title__" type="text"></label>"#,
            r#"<label class="__fe_seo_label__">Meta Description<textarea id="__fe_seo_desc__" rows="2"></textarea></label>"#,
            r#"<label class="__fe_seo_label__">OG Title<input id="__fe_seo_og_title__" type="text" placeholder="Same as page title if left blank"></label>"#,
            r#"<label class="__fe_seo_label__">OG Description<textarea id="__fe_seo_og_desc__" rows="2" placeholder="Same as meta description if left blank"></textarea></label>"#,
            r#"</div>"#,
            r#"<div class="__fe_seo_footer__"><button id="__fe_seo_save__">Save SEO</button><button id="__fe_seo_cancel__">Cancel</button></div>"#,
        ));
        hide(&seo_modal);
        body.append_child(&seo_modal)?;

        let mut format_buttons = Vec::new();
        let buttons = toolbar.query_selector_all("[data-cmd]")?;
        for i in 0..buttons.length() {
            let Some(button) = buttons.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let command = match button.get_attribute("data-cmd").as_deref() {
                Some("bold") => FormatCommand::Bold,
                Some("italic") => FormatCommand::Italic,
                Some("underline") => FormatCommand::Underline,
                _ => continue,
            };
            format_buttons.push((button, command));
        }

        Ok(Self {
            color_input: by_id(document, "__fe_color__")?,
            size_select: by_id(document, "__fe_size__")?,
            seo_button: by_id(document, "__fe_seo_btn__")?,
            image_replace: by_id(document, "__fe_img_replace__")?,
            image_close: by_id(document, "__fe_img_close__")?,
            image_input: by_id(document, "__fe_img_input__")?,
            link_input: by_id(document, "__fe_link_input__")?,
            link_save: by_id(document, "__fe_link_save__")?,
            link_close: by_id(document, "__fe_link_close__")?,
            seo_close: by_id(document, "__fe_seo_close__")?,
            seo_cancel: by_id(document, "__fe_seo_cancel__")?,
            seo_save: by_id(document, "__fe_seo_save__")?,
            seo_fields: SeoFields {
                title: by_id(document, "__fe_seo_title__")?,
                description: by_id(document, "__fe_seo_desc__")?,
                og_title: by_id(document, "__fe_seo_og_title__")?,
                og_description: by_id(document, "__fe_seo_og_desc__")?,
            },
            exit_button,
            save_indicator,
            toolbar,
            format_buttons,
            image_overlay,
            link_popup,
            seo_backdrop,
            seo_modal,
            link_anchor: None,
        })
    }

    /// Bring every panel in line with the session
    pub fn render(&mut self, session: &mut EditorSession<DomPage>) {
        self.render_save_status(session.save_status());

        if session.state().active_text().is_some() {
            show(&self.toolbar, "flex");
            session.set_toolbar_size(PanelSize {
                width: self.toolbar.offset_width() as f64,
                height: self.toolbar.offset_height() as f64,
            });
        } else {
            hide(&self.toolbar);
        }
        if let Some(placement) = session.toolbar_placement() {
            place(&self.toolbar, placement);
        }

        match session.image_overlay_placement() {
            Some(placement) => {
                show(&self.image_overlay, "flex");
                place(&self.image_overlay, placement);
            }
            None => hide(&self.image_overlay),
        }

        let link_placement = session.link_popup_placement();
        match (session.state(), link_placement) {
            (ActiveState::LinkPopupOpen { anchor, input }, Some(placement)) => {
                if self.link_anchor.as_ref() != Some(anchor) {
                    self.link_anchor = Some(anchor.clone());
                    self.link_input.set_value(input);
                    show(&self.link_popup, "flex");
                    let _ = self.link_input.focus();
                }
                place(&self.link_popup, placement);
            }
            _ => {
                self.link_anchor = None;
                hide(&self.link_popup);
            }
        }

        if session.seo_modal_open() {
            show(&self.seo_backdrop, "block");
            show(&self.seo_modal, "flex");
        } else {
            hide(&self.seo_backdrop);
            hide(&self.seo_modal);
        }
    }

    fn render_save_status(&self, status: SaveStatus) {
        match status.label() {
            Some(label) => {
                self.save_indicator.set_text_content(Some(label));
                self.save_indicator.set_class_name(status.class_name());
                show(&self.save_indicator, "block");
            }
            None => hide(&self.save_indicator),
        }
    }
}

fn toolbar_markup() -> String {
    let sizes: String = FONT_SIZES
        .iter()
        .map(|size| format!(r#"<option value="{0}px">{0}</option>"#, size))
        .collect();
    [
        r#"<button data-cmd="bold" title="Bold (Ctrl+B)"><b>B</b></button>"#,
        r#"<button data-cmd="italic" title="Italic (Ctrl+I)"><i>I</i></button>"#,
        r#"<button data-cmd="underline" title="Underline (Ctrl+U)"><u>U</u></button>"#,
        r#"<span class="__fe_sep__"></span>"#,
        r##"<label title="Text color"><input type="color" id="__fe_color__" value="#000000"></label>"##,
        r#"<select id="__fe_size__" title="Font size"><option value="">px</option>"#,
        &sizes,
        r#"</select>"#,
        r#"<span class="__fe_sep__"></span>"#,
        r#"<button id="__fe_seo_btn__" title="Edit SEO (title, description, og tags)">SEO</button>"#,
    ]
    .concat()
}

fn create(document: &Document, tag: &str, id: &str) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document.create_element(tag)?.dyn_into()?;
    element.set_id(id);
    Ok(element)
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing overlay element #{}", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("overlay element #{} has an unexpected type", id)))
}

fn show(element: &HtmlElement, display: &str) {
    let _ = element.style().set_property("display", display);
}

fn hide(element: &HtmlElement) {
    show(element, "none");
}

fn place(element: &HtmlElement, placement: Placement) {
    let style = element.style();
    let _ = style.set_property("top", &format!("{}px", placement.top));
    let _ = style.set_property("left", &format!("{}px", placement.left));
}
