use shared::ModelInfo;
use yew::prelude::*;

pub fn render_sidebar(info: Option<&ModelInfo>) -> Html {
    let Some(info) = info else {
        return html! {
            <aside class="sidebar">
                <h2>{"🚀 Model Architecture"}</h2>
                <p class="muted">{"Loading model details..."}</p>
            </aside>
        };
    };

    let [_, height, width, channels] = info.input_shape;

    html! {
        <aside class="sidebar">
            <h2>{"🚀 Model Architecture"}</h2>
            <div class="model-badge">{ &info.architecture }</div>
            <p><strong>{"Key Features:"}</strong></p>
            <ul>
                { for info.features.iter().map(|feature| html! { <li>{ feature }</li> }) }
            </ul>
            <p>
                <strong>{"Test Accuracy: "}</strong>
                { format!("{:.0}%", info.test_accuracy * 100.0) }
            </p>
            <p class="muted">
                { format!("Input {}×{}×{} · {} classes · {}", height, width, channels, info.labels.len(), info.backend) }
            </p>
        </aside>
    }
}
