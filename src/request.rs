//! Builder for the request strings the dispatcher consumes.

use url::form_urlencoded;

/// Builds `<url>?<urlencoded-body>` request strings for
/// [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).
///
/// With no fields the bare URL is returned and the dispatcher sends an
/// empty POST body.
#[derive(Debug, Clone)]
pub struct FormRequest {
    url: String,
    fields: Vec<(String, String)>,
}

impl FormRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: Vec::new(),
        }
    }

    /// Append one form field. Names and values are encoded on `build`.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Render the request string.
    pub fn build(self) -> String {
        if self.fields.is_empty() {
            return self.url;
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.fields {
            serializer.append_pair(name, value);
        }
        format!("{}?{}", self.url, serializer.finish())
    }
}
