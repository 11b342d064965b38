//! Basic form controls shared by the pages.

use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Ghost,
}

impl ButtonVariant {
    fn class(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "btn btn-primary",
            ButtonVariant::Secondary => "btn btn-secondary",
            ButtonVariant::Ghost => "btn btn-ghost",
        }
    }
}

#[component]
pub fn Button(
    #[props(default)] variant: ButtonVariant,
    #[props(default = "button".to_string())] r#type: String,
    #[props(default)] disabled: bool,
    #[props(default)] class: String,
    onclick: Option<EventHandler<MouseEvent>>,
    children: Element,
) -> Element {
    rsx! {
        button {
            class: "{variant.class()} {class}",
            r#type: "{r#type}",
            disabled,
            onclick: move |evt| {
                if let Some(handler) = onclick {
                    handler.call(evt);
                }
            },
            {children}
        }
    }
}

#[component]
pub fn Label(html_for: String, children: Element) -> Element {
    rsx! {
        label { class: "field-label", r#for: "{html_for}", {children} }
    }
}

#[component]
pub fn Input(
    #[props(default)] id: String,
    #[props(default = "text".to_string())] r#type: String,
    #[props(default)] placeholder: String,
    #[props(default)] class: String,
    #[props(default)] disabled: bool,
    value: String,
    oninput: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        input {
            id: "{id}",
            class: "field-input {class}",
            r#type: "{r#type}",
            placeholder: "{placeholder}",
            disabled,
            value: "{value}",
            oninput: move |evt| oninput.call(evt),
        }
    }
}

#[component]
pub fn Textarea(
    #[props(default)] id: String,
    #[props(default)] placeholder: String,
    #[props(default = 4)] rows: u32,
    #[props(default)] disabled: bool,
    value: String,
    oninput: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        textarea {
            id: "{id}",
            class: "field-input",
            placeholder: "{placeholder}",
            rows: "{rows}",
            disabled,
            value: "{value}",
            oninput: move |evt| oninput.call(evt),
        }
    }
}

/// Validation message under a field; renders nothing without a message.
#[component]
pub fn FieldError(message: Option<&'static str>) -> Element {
    match message {
        Some(message) => rsx! {
            p { class: "field-error", "{message}" }
        },
        None => rsx! {},
    }
}
