use super::super::Model;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::FileList;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

// Some platforms report an empty type for valid images, so the extension
// decides when the browser gives no type.
pub fn is_supported_image(mime: &str, file_name: &str) -> bool {
    if !mime.trim().is_empty() {
        return shared::is_accepted_mime(mime);
    }
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Picks the first JPEG or PNG out of a file list.
pub fn first_supported_image(file_list: &FileList) -> Result<GlooFile, String> {
    let files: Vec<web_sys::File> = (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .collect();

    if files.is_empty() {
        return Err("No file selected.".into());
    }

    files
        .iter()
        .find(|file| is_supported_image(&file.type_(), &file.name()))
        .cloned()
        .map(GlooFile::from)
        .ok_or_else(|| format!("Unsupported file: {}. Please upload a JPG or PNG image.", files[0].name()))
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <span class="error-icon">{"⚠️"}</span>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}
