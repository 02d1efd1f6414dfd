use super::super::{Model, Msg};
use super::utils::debounce;
use shared::Prediction;
use yew::prelude::*;

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    if model.file.is_none() {
        return html! {};
    }

    let link = ctx.link().clone();

    html! {
        <div class="results-container">
            <h3>{"🔍 Advanced Analysis"}</h3>
            <button
                class="analyze-btn"
                disabled={model.loading}
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.send_message(Msg::Analyze)
                })}
            >
                { if model.loading { "Processing with AI..." } else { "Analyze Image 🚀" } }
            </button>
            {
                match &model.result {
                    Some(result) if !model.loading => html! {
                        <div class="predictions">
                            { for result.predictions.iter().map(render_prediction_card) }
                            <p class="muted">{ format!("Analyzed in {:.0} ms", result.elapsed_ms) }</p>
                        </div>
                    },
                    _ => html! {},
                }
            }
        </div>
    }
}

fn render_prediction_card(prediction: &Prediction) -> Html {
    html! {
        <div class="prediction-card" key={prediction.index.to_string()}>
            <h4>{ format!("{}. {}", prediction.rank, prediction.label) }</h4>
            <div class="confidence-track">
                <div class="confidence-bar" style={format!("width: {:.1}%", prediction.bar_width())}></div>
            </div>
            <p>{ format!("Confidence: {}", prediction.confidence_label()) }</p>
        </div>
    }
}
