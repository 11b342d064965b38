use dioxus::prelude::*;

use crate::icons::{FaCircleCheck, FaCircleExclamation, FaCircleInfo, FaXmark};
use crate::notice::{use_notices, NoticeLevel, Notices};
use crate::Icon;

const NOTICE_CSS: Asset = asset!("/assets/styling/notice.css");

/// Provides the notice list to every descendant.
#[component]
pub fn NoticeProvider(children: Element) -> Element {
    use_context_provider(|| Signal::new(Notices::default()));
    rsx! {
        {children}
    }
}

#[component]
pub fn NoticePanel() -> Element {
    let mut notices = use_notices();

    if notices().is_empty() {
        return rsx! {};
    }

    let entries: Vec<_> = notices().newest_first().cloned().collect();

    rsx! {
        document::Stylesheet { href: NOTICE_CSS }

        div {
            class: "notice-panel",
            role: "status",
            for notice in entries {
                div {
                    key: "{notice.id}",
                    class: match notice.level {
                        NoticeLevel::Error => "notice error",
                        NoticeLevel::Success => "notice success",
                        NoticeLevel::Info => "notice info",
                    },
                    span {
                        class: "notice-icon",
                        {match notice.level {
                            NoticeLevel::Error => rsx! { Icon { icon: FaCircleExclamation, width: 16, height: 16 } },
                            NoticeLevel::Success => rsx! { Icon { icon: FaCircleCheck, width: 16, height: 16 } },
                            NoticeLevel::Info => rsx! { Icon { icon: FaCircleInfo, width: 16, height: 16 } },
                        }}
                    }
                    div {
                        class: "notice-body",
                        div {
                            class: "notice-title",
                            "{notice.title}"
                            span { class: "notice-time", " {notice.timestamp}" }
                        }
                        if !notice.message.is_empty() {
                            div { class: "notice-message", "{notice.message}" }
                        }
                    }
                    button {
                        class: "notice-dismiss",
                        title: "Dismiss",
                        onclick: move |_| notices.write().dismiss(notice.id),
                        Icon { icon: FaXmark, width: 12, height: 12 }
                    }
                }
            }
        }
    }
}
