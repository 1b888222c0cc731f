//! Content type detection for a single post fragment.
//!
//! Rules are checked in order and the first match wins. Only descendants of
//! the fragment are inspected; the container's own attributes never count.

use scraper::ElementRef;

use crate::models::ContentType;

/// Attributes whose value may label a play control.
const PLAY_LABEL_ATTRS: &[&str] = &["aria-label", "title", "alt", "data-testid", "role"];

/// Elements that can act as a play control or overlay.
const PLAY_CONTROL_TAGS: &[&str] = &["button", "a", "div", "span", "svg"];

/// Classify a post fragment as video, image, or text.
#[must_use]
pub fn classify(post: ElementRef<'_>) -> ContentType {
    if has_descendant_tag(post, "video") {
        return ContentType::Video;
    }

    if descendants(post).any(has_video_attribute) {
        return ContentType::Video;
    }

    if descendants(post).any(is_play_control) {
        return ContentType::Video;
    }

    for wrapper in descendants(post).filter(|el| el.value().attr("role") == Some("presentation")) {
        if has_descendant_tag(wrapper, "video") {
            return ContentType::Video;
        }
        if has_descendant_tag(wrapper, "img") {
            if descendants(wrapper).any(is_play_control) {
                return ContentType::Video;
            }
        } else {
            // Presentation wrappers without an image are treated as video
            // placeholders. Over-broad, but kept as the documented fallback.
            return ContentType::Video;
        }
    }

    if has_descendant_tag(post, "img") {
        return ContentType::Image;
    }

    ContentType::Text
}

/// Element descendants, excluding the element itself.
fn descendants<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn has_descendant_tag(element: ElementRef<'_>, tag: &str) -> bool {
    descendants(element).any(|el| el.value().name().eq_ignore_ascii_case(tag))
}

/// Any attribute value mentioning video or playable media.
///
/// Class lists are matched as their raw string: a token containing the needle
/// is exactly a list containing it, since the needles hold no whitespace.
fn has_video_attribute(element: ElementRef<'_>) -> bool {
    element.value().attrs().any(|(_, value)| {
        let value = value.to_lowercase();
        value.contains("video") || value.contains("playable")
    })
}

/// A button-like element labelled or styled as a play control.
fn is_play_control(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if !PLAY_CONTROL_TAGS
        .iter()
        .any(|tag| el.name().eq_ignore_ascii_case(tag))
    {
        return false;
    }

    let labelled = PLAY_LABEL_ATTRS.iter().any(|attr| {
        el.attr(attr)
            .is_some_and(|value| value.to_lowercase().contains("play"))
    });

    labelled || el.classes().any(|class| class.to_lowercase().contains("play"))
}
