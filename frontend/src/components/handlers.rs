use super::super::{FileData, Model, Msg};
use super::utils::first_supported_image;
use crate::api;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::InferenceResponse;
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

pub fn handle_file_selected(model: &mut Model, file: GlooFile) -> bool {
    let preview_url = ObjectUrl::from(file.clone());
    model.file = Some(FileData { file, preview_url });
    reset_analysis(model);
    true
}

pub fn handle_clear_file(model: &mut Model) -> bool {
    model.file = None;
    reset_analysis(model);
    true
}

// Drops the current result and orphans any request still in flight.
fn reset_analysis(model: &mut Model) {
    model.request_seq += 1;
    model.loading = false;
    model.result = None;
    model.error = None;
}

pub fn handle_analyze(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.loading {
        return false;
    }

    let Some(file) = model.file.as_ref().map(|fd| fd.file.clone()) else {
        ctx.link()
            .send_message(Msg::SetError(Some("Upload an image before analyzing.".into())));
        return false;
    };

    model.request_seq += 1;
    model.loading = true;
    model.error = None;
    model.result = None;
    send_analysis_request(ctx, file, model.request_seq);
    true
}

pub fn handle_inference_result(model: &mut Model, seq: u64, response: InferenceResponse) -> bool {
    if seq != model.request_seq {
        log::debug!("Dropping stale inference response #{}", seq);
        return false;
    }
    if let Some(top) = response.top() {
        log::info!("Top prediction: {} ({})", top.label, top.confidence_label());
    }
    model.result = Some(response);
    model.loading = false;
    true
}

pub fn handle_inference_failed(model: &mut Model, seq: u64, message: String) -> bool {
    if seq != model.request_seq {
        log::debug!("Dropping stale inference error #{}: {}", seq, message);
        return false;
    }
    model.error = Some(message);
    model.loading = false;
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    let file_list = event.data_transfer().and_then(|data_transfer| data_transfer.files());
    if let Some(file_list) = file_list {
        match first_supported_image(&file_list) {
            Ok(file) => ctx.link().send_message(Msg::FileSelected(file)),
            Err(message) => {
                log::warn!("{}", message);
                ctx.link().send_message(Msg::SetError(Some(message)));
            }
        }
    }

    true
}

pub fn send_analysis_request(ctx: &Context<Model>, file: GlooFile, seq: u64) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match api::analyze_image(&file).await {
            Ok(response) => link.send_message(Msg::InferenceResult(seq, response)),
            Err(message) => link.send_message(Msg::InferenceFailed(seq, message)),
        }
    });
}
