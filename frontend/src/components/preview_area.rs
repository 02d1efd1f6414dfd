use super::super::{Model, Msg};
use super::utils::debounce;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(file_data) = &model.file else {
        return html! {};
    };

    let link = ctx.link().clone();
    let file_name = file_data.file.name();

    html! {
        <div id="preview-container">
            <h3>{"Image Preview"}</h3>
            <img id="actual-image-preview"
                src={file_data.preview_url.to_string()}
                alt="Uploaded Image" />
            <p class="caption">{ format!("Uploaded Image: {}", display_name(&file_name)) }</p>
            <div class="button-container">
                <button
                    id="clear-btn"
                    class="secondary-btn"
                    disabled={model.loading}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::ClearFile)
                    })}
                >
                    {"Remove"}
                </button>
            </div>
        </div>
    }
}

pub fn display_name(file_name: &str) -> String {
    if file_name.chars().count() > 28 {
        let truncated: String = file_name.chars().take(25).collect();
        format!("{}...", truncated)
    } else {
        file_name.to_string()
    }
}
