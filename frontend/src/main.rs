mod api;
mod components;

use components::handlers;
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::results::render_results;
use components::sidebar::render_sidebar;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{InferenceResponse, ModelInfo};
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

// Models
pub struct FileData {
    pub file: GlooFile,
    pub preview_url: ObjectUrl,
}

// Yew msg components
pub enum Msg {
    // File operations
    FileSelected(GlooFile),
    ClearFile,

    // Analysis operations
    Analyze,
    // Responses carry the sequence number of the request that produced them.
    InferenceResult(u64, InferenceResponse),
    InferenceFailed(u64, String),
    ModelInfoLoaded(ModelInfo),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
}

// Main component
pub struct Model {
    pub file: Option<FileData>,
    pub result: Option<InferenceResponse>,
    pub model_info: Option<ModelInfo>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_dragging: bool,
    /// Bumped on every analysis request and file change, so late responses
    /// for an earlier image are dropped.
    pub request_seq: u64,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();
        spawn_local(async move {
            match api::fetch_model_info().await {
                Ok(info) => link.send_message(Msg::ModelInfoLoaded(info)),
                Err(e) => log::warn!("Model info unavailable: {}", e),
            }
        });

        Self {
            file: None,
            result: None,
            model_info: None,
            loading: false,
            error: None,
            is_dragging: false,
            request_seq: 0,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileSelected(file) => handlers::handle_file_selected(self, file),
            Msg::ClearFile => handlers::handle_clear_file(self),

            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::InferenceResult(seq, response) => {
                handlers::handle_inference_result(self, seq, response)
            }
            Msg::InferenceFailed(seq, message) => {
                handlers::handle_inference_failed(self, seq, message)
            }
            Msg::ModelInfoLoaded(info) => {
                self.model_info = Some(info);
                true
            }

            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="app">
                { render_sidebar(self.model_info.as_ref()) }

                <div class="container">
                    { render_header(self.model_info.as_ref()) }

                    <main class="main-content">
                        <section class="column">
                            { render_upload_section(self, ctx) }
                            { render_preview_area(self, ctx) }
                        </section>
                        <section class="column">
                            { render_error_message(self) }
                            { render_results(self, ctx) }
                        </section>
                    </main>

                    <footer class="app-footer">
                        <p>{"WildVision Pro | Ethical AI for Wildlife Conservation"}</p>
                    </footer>
                </div>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
