use dioxus::prelude::*;

use grafoman_common::avatar::{
    clamp_scale, cover_fit, AvatarEdit, AvatarImage, AvatarOffset, AvatarTransform, DragSession,
    EDITOR_SIZE_PX, MAX_SCALE, MIN_SCALE,
};

const PHOTO_INPUT_ID: &str = "avatar-photo-input";

/// A photo ready for framing.
#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub data_url: String,
    pub width: f64,
    pub height: f64,
}

/// Upload a photo, then pan and zoom it inside the round frame.
#[component]
pub fn AvatarEditor(on_save: EventHandler<AvatarEdit>, on_cancel: EventHandler<()>) -> Element {
    let mut photo = use_signal(|| None::<Photo>);
    let mut scale = use_signal(|| 1.0_f64);
    let mut offset = use_signal(AvatarOffset::default);
    let mut drag = use_signal(|| None::<DragSession>);
    let mut error = use_signal(|| None::<String>);
    let mut loading = use_signal(|| false);

    let on_file = move |_: Event<FormData>| {
        loading.set(true);
        error.set(None);
        spawn(async move {
            match read_selected_photo(PHOTO_INPUT_ID).await {
                Ok(loaded) => {
                    if let Some((fit, centred)) = cover_fit(loaded.width, loaded.height) {
                        scale.set(fit);
                        offset.set(centred);
                        photo.set(Some(loaded));
                    } else {
                        error.set(Some("Пустое изображение".into()));
                    }
                }
                Err(e) => {
                    tracing::warn!("photo upload failed: {e}");
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    };

    let current = photo.read().clone();
    let transform = AvatarTransform::for_thumbnail(scale(), offset(), EDITOR_SIZE_PX).css();
    let scale_value = scale();

    rsx! {
        div { class: "avatar-editor",
            label { class: "upload-button",
                if loading() { "Загрузка..." } else { "Выбрать фото" }
                input {
                    id: PHOTO_INPUT_ID,
                    r#type: "file",
                    accept: "image/*",
                    style: "display: none;",
                    onchange: on_file,
                }
            }
            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
            if let Some(current) = current {
                div {
                    class: "avatar-viewport",
                    style: "width: {EDITOR_SIZE_PX}px; height: {EDITOR_SIZE_PX}px;",
                    onmousedown: move |evt| {
                        let p = evt.client_coordinates();
                        drag.set(Some(DragSession::begin(p.x, p.y, offset())));
                    },
                    onmousemove: move |evt| {
                        if let Some(session) = drag() {
                            let p = evt.client_coordinates();
                            offset.set(session.offset_at(p.x, p.y));
                        }
                    },
                    onmouseup: move |_| drag.set(None),
                    onmouseleave: move |_| drag.set(None),
                    img {
                        src: "{current.data_url}",
                        draggable: false,
                        style: "max-width: none; transform-origin: 0 0; transform: {transform};",
                    }
                }
                input {
                    class: "scale-slider",
                    r#type: "range",
                    min: "{MIN_SCALE}",
                    max: "{MAX_SCALE}",
                    step: "0.01",
                    value: "{scale_value}",
                    oninput: move |evt| {
                        if let Ok(value) = evt.value().parse::<f64>() {
                            scale.set(clamp_scale(value));
                        }
                    },
                }
            }
            div { class: "editor-actions",
                button { onclick: move |_| on_cancel.call(()), "Отмена" }
                button {
                    class: "primary",
                    disabled: photo.read().is_none(),
                    onclick: move |_| {
                        if let Some(current) = photo.read().as_ref() {
                            on_save.call(AvatarEdit {
                                image: AvatarImage(current.data_url.clone()),
                                scale: scale(),
                                offset: offset(),
                            });
                        }
                    },
                    "Сохранить"
                }
            }
        }
    }
}

#[cfg(target_family = "wasm")]
use wasm::read_selected_photo;

#[cfg(not(target_family = "wasm"))]
async fn read_selected_photo(_input_id: &str) -> Result<Photo, String> {
    Err("photo upload needs a browser".into())
}

#[cfg(target_family = "wasm")]
mod wasm {
    use grafoman_common::avatar::{fit_within, MAX_UPLOAD_DIM_PX, UPLOAD_JPEG_QUALITY};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use super::Photo;

    fn js_err(e: JsValue) -> String {
        e.as_string().unwrap_or_else(|| format!("{:?}", e))
    }

    /// Promise settled by whichever handler the element fires first.
    fn load_promise(register: impl FnOnce(&js_sys::Function, &js_sys::Function)) -> js_sys::Promise {
        let mut register = Some(register);
        js_sys::Promise::new(&mut |resolve, reject| {
            if let Some(register) = register.take() {
                register(&resolve, &reject);
            }
        })
    }

    /// Read the file picked in `input_id`, downscale it and re-encode it as JPEG.
    pub async fn read_selected_photo(input_id: &str) -> Result<Photo, String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document")?;
        let input = document
            .get_element_by_id(input_id)
            .ok_or("No file input")?
            .dyn_into::<web_sys::HtmlInputElement>()
            .map_err(|_| "Not a file input")?;
        let file = input
            .files()
            .and_then(|files| files.get(0))
            .ok_or("No file selected")?;
        // Allow picking the same file again.
        input.set_value("");

        let reader = web_sys::FileReader::new().map_err(js_err)?;
        let read = load_promise(|resolve, reject| {
            reader.set_onload(Some(resolve));
            reader.set_onerror(Some(reject));
        });
        reader.read_as_data_url(&file).map_err(js_err)?;
        JsFuture::from(read).await.map_err(|_| "Could not read the file")?;
        let original = reader
            .result()
            .map_err(js_err)?
            .as_string()
            .ok_or("File is not text-encodable")?;

        let image = web_sys::HtmlImageElement::new().map_err(js_err)?;
        let decoded = load_promise(|resolve, reject| {
            image.set_onload(Some(resolve));
            image.set_onerror(Some(reject));
        });
        image.set_src(&original);
        JsFuture::from(decoded).await.map_err(|_| "Not an image")?;

        let (width, height) = fit_within(
            image.natural_width() as f64,
            image.natural_height() as f64,
            MAX_UPLOAD_DIM_PX,
        );

        let canvas = document
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| "Canvas unavailable")?;
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        let context = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or("No 2d context")?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .map_err(|_| "No 2d context")?;
        context
            .draw_image_with_html_image_element_and_dw_and_dh(&image, 0.0, 0.0, width, height)
            .map_err(js_err)?;
        let data_url = canvas
            .to_data_url_with_type_and_encoder_options(
                "image/jpeg",
                &JsValue::from_f64(UPLOAD_JPEG_QUALITY),
            )
            .map_err(js_err)?;

        Ok(Photo {
            data_url,
            width,
            height,
        })
    }
}
