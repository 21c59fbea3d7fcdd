//! Outbound content model
//!
//! Plain data describing what the host platform should render: text,
//! structured blocks, control rows carrying tokens, and form specs. The
//! router never talks to the platform directly; a host adapter maps these
//! onto its own widget types.

use convene_route::RoutingToken;
use serde::{Deserialize, Serialize};

/// Who may see a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible to the requesting caller only
    #[default]
    Private,
    /// Visible to everyone in the surrounding channel
    Shared,
}

/// Visual weight of a button control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlStyle {
    /// The main path forward
    #[default]
    Primary,
    /// A less prominent alternative
    Secondary,
    /// A confirming/affirmative action
    Success,
    /// A destructive or rejecting action
    Danger,
}

/// A structured block: titled text with optional labelled fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Heading line
    pub title: Option<String>,
    /// Body text
    pub body: Option<String>,
    /// Labelled name/value rows
    pub fields: Vec<(String, String)>,
}

impl Block {
    /// Start a block with a title
    #[inline]
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the body text
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append a labelled field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// A button carrying a routing token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Token the host echoes back on activation
    pub token: RoutingToken,
    /// Visible label
    pub label: String,
    /// Visual weight
    pub style: ControlStyle,
    /// Whether the control is rendered inert
    pub disabled: bool,
}

impl Button {
    /// Create an enabled primary button
    #[inline]
    #[must_use]
    pub fn new(token: RoutingToken, label: impl Into<String>) -> Self {
        Self {
            token,
            label: label.into(),
            style: ControlStyle::Primary,
            disabled: false,
        }
    }

    /// Set the visual style
    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: ControlStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the disabled flag
    #[inline]
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// One entry in a select menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Visible label
    pub label: String,
    /// Value reported back in the list-selection request
    pub value: String,
    /// Optional descriptive line
    pub description: Option<String>,
}

impl SelectOption {
    /// Create an option from label and value
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
        }
    }

    /// Attach a descriptive line
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A select menu carrying a routing token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectMenu {
    /// Token the host echoes back with the chosen values
    pub token: RoutingToken,
    /// Hint shown before a choice is made
    pub placeholder: String,
    /// Choices, at most one page worth
    pub options: Vec<SelectOption>,
}

impl SelectMenu {
    /// Create a menu with a placeholder and options
    #[inline]
    #[must_use]
    pub fn new(
        token: RoutingToken,
        placeholder: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            token,
            placeholder: placeholder.into(),
            options,
        }
    }
}

/// Any renderable control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    /// A button
    Button(Button),
    /// A select menu
    Select(SelectMenu),
}

impl Control {
    /// The token this control would echo back
    #[inline]
    #[must_use]
    pub fn token(&self) -> &RoutingToken {
        match self {
            Control::Button(button) => &button.token,
            Control::Select(menu) => &menu.token,
        }
    }
}

impl From<Button> for Control {
    fn from(button: Button) -> Self {
        Control::Button(button)
    }
}

impl From<SelectMenu> for Control {
    fn from(menu: SelectMenu) -> Self {
        Control::Select(menu)
    }
}

/// One horizontal row of controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRow {
    /// Controls in display order
    pub controls: Vec<Control>,
}

impl ControlRow {
    /// Create an empty row
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a control
    #[inline]
    #[must_use]
    pub fn with(mut self, control: impl Into<Control>) -> Self {
        self.controls.push(control.into());
        self
    }
}

/// One input field in a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field id; becomes the key in the form-submission payload
    pub id: String,
    /// Visible label
    pub label: String,
    /// Whether the field accepts multi-line input
    pub multiline: bool,
    /// Whether the host must require a value
    pub required: bool,
}

impl FormField {
    /// Create a required single-line field
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            multiline: false,
            required: true,
        }
    }

    /// Mark the field as multi-line
    #[inline]
    #[must_use]
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// Mark the field as optional
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// A form the host platform should open
///
/// Submitting the form produces a form-submission request carrying the
/// form's token, so a form is just another navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    /// Token echoed back with the submitted fields
    pub token: RoutingToken,
    /// Form title
    pub title: String,
    /// Input fields in display order
    pub fields: Vec<FormField>,
}

impl FormSpec {
    /// Create a form with a token and title
    #[inline]
    #[must_use]
    pub fn new(token: RoutingToken, title: impl Into<String>) -> Self {
        Self {
            token,
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Append an input field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }
}

/// Everything one reply can carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Plain text line
    pub text: Option<String>,
    /// Structured blocks
    pub blocks: Vec<Block>,
    /// Rows of controls
    pub controls: Vec<ControlRow>,
    /// Form to open, if any
    pub form: Option<FormSpec>,
    /// Who may see the reply
    pub visibility: Visibility,
}

impl Content {
    /// Create empty private content
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create private content holding only a text line
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Set the text line
    #[inline]
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a block
    #[inline]
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Append a control row
    #[inline]
    #[must_use]
    pub fn with_row(mut self, row: ControlRow) -> Self {
        self.controls.push(row);
        self
    }

    /// Attach a form
    #[inline]
    #[must_use]
    pub fn with_form(mut self, form: FormSpec) -> Self {
        self.form = Some(form);
        self
    }

    /// Make the reply visible to the whole channel
    #[inline]
    #[must_use]
    pub fn shared(mut self) -> Self {
        self.visibility = Visibility::Shared;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convene_route::{RoutePath, TokenArgs};

    fn token(op: &str) -> RoutingToken {
        RoutingToken::encode(
            &RoutePath::single("dash").child("screen").child("action"),
            op,
            &TokenArgs::new(),
        )
        .unwrap()
    }

    #[test]
    fn block_builder() {
        let block = Block::titled("Funding Round")
            .with_body("Select a round below.")
            .with_field("Budget", "120000");
        assert_eq!(block.title.as_deref(), Some("Funding Round"));
        assert_eq!(block.fields.len(), 1);
    }

    #[test]
    fn button_defaults() {
        let button = Button::new(token("show"), "Select Funding Round");
        assert_eq!(button.style, ControlStyle::Primary);
        assert!(!button.disabled);
    }

    #[test]
    fn control_row_collects_controls() {
        let row = ControlRow::new()
            .with(Button::new(token("show"), "Approve").with_style(ControlStyle::Success))
            .with(Button::new(token("show"), "Reject").with_style(ControlStyle::Danger));
        assert_eq!(row.controls.len(), 2);
    }

    #[test]
    fn content_defaults_to_private() {
        let content = Content::text("hello");
        assert_eq!(content.visibility, Visibility::Private);
        assert_eq!(content.shared().visibility, Visibility::Shared);
    }

    #[test]
    fn form_spec_builder() {
        let form = FormSpec::new(token("confirm"), "Approve Project")
            .with_field(FormField::new("reason", "Reason for approving").multiline());
        assert_eq!(form.fields.len(), 1);
        assert!(form.fields[0].multiline);
        assert!(form.fields[0].required);
    }
}
