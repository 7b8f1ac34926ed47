//! Product edit screen.
//!
//! ```text
//! Loading -> Ready -> Submitting -> Ready
//!                                -> Error -> (acknowledge) -> Ready
//! Loading -> NotFound
//! ```
//!
//! The editor owns the single [`ProductForm`] of the screen. Edits made
//! before a failed submit survive the error.

use std::fmt;
use std::sync::Arc;

use printables_core::defaults::{build_product, PartialProduct};
use printables_core::form::ProductForm;

use crate::admin::AdminClient;
use crate::error::ClientError;

/// Route segment that opens a blank draft instead of loading a product.
pub const NEW_PRODUCT_ROUTE: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Loading,
    Ready,
    Submitting,
    /// A submit failed; holds the error text shown to the user.
    Error(String),
    /// The product does not exist or could not be loaded.
    NotFound,
}

impl EditorState {
    fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Error(_) => "error",
            Self::NotFound => "not found",
        }
    }
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Editor is {actual}, expected {expected}")]
    InvalidState {
        actual: &'static str,
        expected: &'static str,
    },

    #[error("Nothing to save")]
    Unchanged,

    #[error("The form has {0} validation error(s)")]
    Invalid(usize),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct ProductEditor {
    client: Arc<AdminClient>,
    state: EditorState,
    form: Option<ProductForm>,
}

impl ProductEditor {
    /// A blank draft of the client's product type, ready for editing.
    pub fn new_draft(client: Arc<AdminClient>) -> Self {
        let product = build_product(PartialProduct {
            product_type: Some(client.product_type()),
            ..Default::default()
        });
        Self {
            client,
            state: EditorState::Ready,
            form: Some(ProductForm::new(product)),
        }
    }

    /// Open the screen for `product_id`, or a blank draft for `"new"`.
    pub async fn open(client: Arc<AdminClient>, product_id: &str) -> Self {
        if product_id == NEW_PRODUCT_ROUTE {
            return Self::new_draft(client);
        }

        let mut editor = Self {
            client,
            state: EditorState::Loading,
            form: None,
        };
        match editor.client.get_product(product_id).await {
            Ok(product) => {
                editor.form = Some(ProductForm::new(product));
                editor.state = EditorState::Ready;
            }
            Err(e) => {
                tracing::warn!(%product_id, error = %e, "Product could not be loaded");
                editor.state = EditorState::NotFound;
            }
        }
        editor
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn form(&self) -> Option<&ProductForm> {
        self.form.as_ref()
    }

    /// Mutable access for edits; only while the form is not being submitted.
    pub fn form_mut(&mut self) -> Option<&mut ProductForm> {
        match self.state {
            EditorState::Ready | EditorState::Error(_) => self.form.as_mut(),
            _ => None,
        }
    }

    /// Create or update the draft. On success the form is reset to the
    /// saved product and the product id is returned.
    pub async fn submit(&mut self) -> Result<String, EditorError> {
        if self.state != EditorState::Ready {
            return Err(EditorError::InvalidState {
                actual: self.state.name(),
                expected: "ready",
            });
        }
        let Some(form) = self.form.as_ref() else {
            return Err(EditorError::InvalidState {
                actual: self.state.name(),
                expected: "ready",
            });
        };
        if !form.is_valid() {
            return Err(EditorError::Invalid(form.errors().errors.len()));
        }
        if !form.is_dirty() {
            return Err(EditorError::Unchanged);
        }

        let draft = form.values().clone();
        self.state = EditorState::Submitting;

        let result = if draft.is_new() {
            self.client.create_product(&draft).await
        } else {
            self.client
                .update_product(&draft)
                .await
                .map(|()| draft.id.clone())
        };

        match result {
            Ok(product_id) => {
                let saved = match self.client.get_product(&product_id).await {
                    Ok(product) => product,
                    Err(e) => {
                        tracing::warn!(%product_id, error = %e, "Saved product could not be reloaded");
                        let mut product = draft;
                        product.id = product_id.clone();
                        product
                    }
                };
                if let Some(form) = self.form.as_mut() {
                    form.reset(saved);
                }
                self.state = EditorState::Ready;
                Ok(product_id)
            }
            Err(e) => {
                self.state = EditorState::Error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Dismiss a submit error and return to editing.
    pub fn acknowledge_error(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Error(_) => {
                self.state = EditorState::Ready;
                Ok(())
            }
            _ => Err(EditorError::InvalidState {
                actual: self.state.name(),
                expected: "error",
            }),
        }
    }
}
