//! Askama template structs for the web interface.

use askama::Template;

/// Entry in a `<select>` on the upload form.
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Upload page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub languages: Vec<SelectOption>,
    pub formats: Vec<SelectOption>,
    /// Value for the file input's `accept` attribute.
    pub accept: String,
    pub max_upload_mb: usize,
}
