use shared::ModelInfo;
use yew::prelude::*;

/// Renders the application header
pub fn render_header(info: Option<&ModelInfo>) -> Html {
    let (title, tagline) = info
        .map(|i| (i.name.clone(), i.tagline.clone()))
        .unwrap_or_else(|| ("WildVision Pro".to_string(), "Animal Recognition".to_string()));

    html! {
        <header class="app-header">
            <h1 class="title-gradient">{ format!("🐯 {}", title) }</h1>
            <p class="subtitle">{ tagline }</p>
        </header>
    }
}
